//! # ripieno - polyphonic MIDI software synthesizer
//!
//! Thin umbrella crate wiring [`ripieno_midi`] (event/message decoding, the
//! thread-safe ingestion queue, System Exclusive recognition) to
//! [`ripieno_synth`] (wavetable oscillators, envelopes, voices, channels,
//! and the render loop) into one dependency.
//!
//! ## Data flow
//!
//! ```text
//! live MIDI / SMF bytes
//!     -> ripieno_midi decoders -> ripieno_midi::Message
//!     -> Synthesizer::enqueue_message (any thread)
//!     -> ripieno_midi::MessageQueue (mutex-protected, producer-many/consumer-one)
//!     -> Synthesizer::render (audio thread only, drains the queue, dispatches,
//!        advances every MidiChannel's voices, mixes to a stereo Signal)
//! ```
//!
//! A [`Sequencer`] is one producer: it owns a worker thread that walks a
//! decoded, time-ordered message list and pushes each message into a
//! synthesizer's queue at its scheduled wall-clock offset. A live MIDI input
//! thread is another; both only ever need a cloned `Arc<MessageQueue>`
//! handle, never a borrow of the `Synthesizer` itself.
//!
//! ## Logging
//!
//! Like the synthesis engine it wraps, this crate only emits `tracing`
//! events; it does not install a subscriber. Applications wire one up, e.g.
//! with `tracing-subscriber`:
//!
//! ```no_run
//! tracing_subscriber::fmt::init();
//! let synth = ripieno::Synthesizer::new(ripieno::SynthesizerConfig::default());
//! ```

pub use ripieno_midi;
pub use ripieno_synth;

pub use ripieno_midi::{
    Message, MessageQueue, MetaEvent, MidiEvent, ScheduledMessage, SystemAction,
};
pub use ripieno_synth::{
    Error, Result, SynthesizerConfig, Sequencer, Synthesizer, RenderStats, Signal,
};

/// Common imports for applications driving a [`Synthesizer`] from decoded
/// MIDI, live or sequenced.
pub mod prelude {
    pub use crate::{
        Error, Message, MessageQueue, MetaEvent, MidiEvent, RenderStats, Result,
        ScheduledMessage, Sequencer, Signal, Synthesizer, SynthesizerConfig, SystemAction,
    };
}
