//! Error types for ripieno-synth.
//!
//! There is no error variant for a non-finite render sample: the render
//! path never fails on bad arithmetic, it replaces the sample with `0.0`
//! and counts it in [`crate::synthesizer::RenderStats::failed_samples`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed SMF body or unrecognized header, surfaced from
    /// `Sequencer::load`.
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// A call that's invalid in the current lifecycle state (`start` while
    /// already playing, `stop` while stopped). Reported, not fatal.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The audio device couldn't be opened (external collaborator; surfaced
    /// unchanged to the application).
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A contract/invariant breach detected outside the render path (e.g. a
    /// buffer dimension mismatch). The render path itself never returns
    /// this - see the module doc.
    #[error("precondition violation: {0}")]
    Precondition(String),
}

#[cfg(feature = "toml-instruments")]
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::DecodingError(e.to_string())
    }
}
