//! MIDI message modeling for the ripieno tone module.
//!
//! Covers the message alphabet a General MIDI/GS/XG instrument receives:
//! channel voice messages, System Exclusive reset/mode sequences, and the
//! Meta events a Standard MIDI File decoder surfaces. Does not read MIDI
//! files or talk to hardware ports — those are external collaborators that
//! produce [`ScheduledMessage`]s for this crate's types to carry.

pub mod error;
pub use error::{Error, Result};

mod event;
pub use event::MidiEvent;

mod message;
pub use message::{Message, MetaEvent, ScheduledMessage};

pub mod sysex;
pub use sysex::SystemAction;

pub mod queue;
pub use queue::MessageQueue;

mod note;
pub use note::Note;

// Re-export the upstream wire types so callers don't need a direct
// midi-msg dependency for the common cases.
pub use midi_msg::{Channel, ChannelVoiceMsg, ControlChange};
