//! The full message alphabet the synthesizer dispatcher accepts: channel
//! voice messages, System Exclusive byte sequences, and the Meta events a
//! Standard MIDI File decoder surfaces.

use crate::event::MidiEvent;

/// One timestamped unit as it arrives at `Synthesizer::enqueue_message`.
///
/// Channel-less messages (`SysEx`, `Meta`) are distinguished from
/// [`MidiEvent`] because they either address the whole instrument (SysEx)
/// or never reach the audio path at all (Meta, consumed by the sequencer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// A channel voice message (note on/off, CC, program change, ...).
    Channel(MidiEvent),
    /// Raw System Exclusive bytes, including the `0xF0`/`0xF7` frame.
    SysEx(Vec<u8>),
    /// A Meta event as produced by an SMF decoder.
    Meta(MetaEvent),
}

impl Message {
    #[inline]
    pub fn channel(event: MidiEvent) -> Self {
        Message::Channel(event)
    }

    #[inline]
    pub fn sysex(bytes: impl Into<Vec<u8>>) -> Self {
        Message::SysEx(bytes.into())
    }
}

impl From<MidiEvent> for Message {
    fn from(event: MidiEvent) -> Self {
        Message::Channel(event)
    }
}

/// Meta events relevant to playback. Everything other than `SetTempo` is
/// accepted and logged, never acted on (spec: "Meta.Other (logged,
/// ignored)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaEvent {
    /// Microseconds per quarter note, from an SMF `FF 51 03` event.
    SetTempo { microseconds_per_quarter_note: u32 },
    /// Any other meta event (track name, end-of-track, ...).
    Other,
}

/// A message paired with the absolute time (in microseconds from the start
/// of playback) at which it should be dispatched.
///
/// This is the contract type an (external) SMF decoder produces and the
/// [`crate::queue::MessageQueue`]/Sequencer consume. Tempo has already been
/// applied by the time a `ScheduledMessage` exists — see spec.md §4.10.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledMessage {
    pub position_micros: u64,
    pub message: Message,
}

impl ScheduledMessage {
    pub fn new(position_micros: u64, message: impl Into<Message>) -> Self {
        Self {
            position_micros,
            message: message.into(),
        }
    }
}
