//! RT-safe channel-voice MIDI event representation.

use midi_msg::{Channel, ChannelVoiceMsg, MidiMsg};

/// A single channel-voice MIDI message, addressed to one of the 16 channels.
///
/// This is the wire-level unit the dispatcher consumes; system-level
/// messages (SysEx, Meta) are represented separately by
/// [`crate::message::Message`] since they don't carry a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// MIDI channel (0-15)
    pub channel: Channel,
    /// The channel voice message
    pub msg: ChannelVoiceMsg,
}

impl MidiEvent {
    #[inline]
    pub fn new(channel: Channel, msg: ChannelVoiceMsg) -> Self {
        Self { channel, msg }
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::NoteOn { note, velocity },
        }
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::NoteOff { note, velocity },
        }
    }

    #[inline]
    pub fn control_change(channel: u8, cc: u8, value: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::ControlChange {
                control: midi_msg::ControlChange::CC { control: cc, value },
            },
        }
    }

    #[inline]
    pub fn pitch_bend(channel: u8, bend: u16) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::PitchBend { bend },
        }
    }

    #[inline]
    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::ChannelPressure { pressure },
        }
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::ProgramChange { program },
        }
    }

    #[inline]
    pub fn poly_aftertouch(channel: u8, note: u8, pressure: u8) -> Self {
        Self {
            channel: Channel::from_u8(channel),
            msg: ChannelVoiceMsg::PolyPressure { note, pressure },
        }
    }

    /// MIDI channel as 0-15.
    #[inline]
    pub fn channel_num(&self) -> u8 {
        self.channel as u8
    }

    /// `true` for a NoteOn with velocity > 0. NoteOn with velocity 0 is a
    /// note-off per the MIDI spec and is reported by [`Self::is_note_off`]
    /// instead.
    #[inline]
    pub fn is_note_on(&self) -> bool {
        matches!(self.msg, ChannelVoiceMsg::NoteOn { velocity, .. } if velocity > 0)
    }

    #[inline]
    pub fn is_note_off(&self) -> bool {
        matches!(
            self.msg,
            ChannelVoiceMsg::NoteOff { .. } | ChannelVoiceMsg::NoteOn { velocity: 0, .. }
        )
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { note, .. }
            | ChannelVoiceMsg::NoteOff { note, .. }
            | ChannelVoiceMsg::PolyPressure { note, .. } => Some(note),
            _ => None,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { velocity, .. }
            | ChannelVoiceMsg::NoteOff { velocity, .. } => Some(velocity),
            _ => None,
        }
    }

    #[inline]
    pub fn to_midi_msg(&self) -> MidiMsg {
        MidiMsg::ChannelVoice {
            channel: self.channel,
            msg: self.msg,
        }
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_midi_msg().to_midi()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, midi_msg::ParseError> {
        let (msg, _len) = MidiMsg::from_midi(bytes)?;
        match msg {
            MidiMsg::ChannelVoice { channel, msg } => Ok(Self { channel, msg }),
            _ => Err(midi_msg::ParseError::Invalid(
                "Expected ChannelVoice message",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on() {
        let event = MidiEvent::note_on(0, 60, 100);
        assert!(event.is_note_on());
        assert!(!event.is_note_off());
        assert_eq!(event.note(), Some(60));
        assert_eq!(event.velocity(), Some(100));
        assert_eq!(event.channel_num(), 0);
    }

    #[test]
    fn note_off() {
        let event = MidiEvent::note_off(3, 64, 0);
        assert!(event.is_note_off());
        assert!(!event.is_note_on());
        assert_eq!(event.note(), Some(64));
        assert_eq!(event.channel_num(), 3);
    }

    #[test]
    fn note_on_zero_velocity_is_note_off() {
        let event = MidiEvent::note_on(0, 60, 0);
        assert!(event.is_note_off());
        assert!(!event.is_note_on());
    }

    #[test]
    fn control_change() {
        let event = MidiEvent::control_change(5, 7, 127);
        assert_eq!(event.channel_num(), 5);
        match event.msg {
            ChannelVoiceMsg::ControlChange { control } => match control {
                midi_msg::ControlChange::CC { control: cc, value } => {
                    assert_eq!(cc, 7);
                    assert_eq!(value, 127);
                }
                _ => panic!("Expected CC"),
            },
            _ => panic!("Expected ControlChange"),
        }
    }

    #[test]
    fn pitch_bend_center() {
        let event = MidiEvent::pitch_bend(0, 8192);
        match event.msg {
            ChannelVoiceMsg::PitchBend { bend } => assert_eq!(bend, 8192),
            _ => panic!("Expected PitchBend"),
        }
    }

    #[test]
    fn serialization_roundtrip() {
        let event = MidiEvent::note_on(5, 60, 100);
        let bytes = event.to_bytes();
        let parsed = MidiEvent::from_bytes(&bytes).unwrap();
        assert_eq!(event.channel, parsed.channel);
        assert_eq!(event.msg, parsed.msg);
    }
}
