//! Error types for ripieno-midi.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed MIDI bytes: {0:?}")]
    Parse(midi_msg::ParseError),

    #[error("not a recognized System Exclusive sequence")]
    UnrecognizedSysEx,
}

impl From<midi_msg::ParseError> for Error {
    fn from(e: midi_msg::ParseError) -> Self {
        Error::Parse(e)
    }
}
