//! A single sounding note.

use crate::envelope::{Envelope, EnvelopeParams, EnvelopeState};
use crate::oscillator::WavetableOscillator;

/// A cheap, already-computed snapshot of a voice's state for metering or a
/// visualizer - reading a few already-materialized fields costs nothing on
/// the hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceDigest {
    pub note: u8,
    pub freq_hz: f32,
    pub envelope_level: f32,
    pub envelope_state: EnvelopeState,
}

/// One sounding note: an oscillator gated by an envelope, with pan and
/// pitch-bend resolution.
pub struct Voice {
    oscillator: WavetableOscillator,
    envelope: Envelope,
    note: u8,
    pitch_bend_semitones: f32,
    volume: f32,
    /// Explicit pan override (drum notes); `None` defers to the channel's
    /// pan during mixdown.
    pan_override: Option<f32>,
    sample_rate: f32,
    freq_hz: f32,
    hold: bool,
    pending_note_off: bool,
    created_at: u64,
}

impl Voice {
    pub fn new(
        oscillator: WavetableOscillator,
        envelope_params: EnvelopeParams,
        note: u8,
        velocity: u8,
        sample_rate: f32,
        pan_override: Option<f32>,
    ) -> Self {
        Self::with_created_at(
            oscillator,
            envelope_params,
            note,
            velocity,
            sample_rate,
            pan_override,
            0,
        )
    }

    /// As [`Self::new`], additionally stamping the global sample-clock
    /// value the voice was allocated at - used to order voice stealing by
    /// age.
    pub fn with_created_at(
        oscillator: WavetableOscillator,
        envelope_params: EnvelopeParams,
        note: u8,
        velocity: u8,
        sample_rate: f32,
        pan_override: Option<f32>,
        created_at: u64,
    ) -> Self {
        let mut envelope = Envelope::new(envelope_params, sample_rate);
        envelope.note_on();
        let mut voice = Self {
            oscillator,
            envelope,
            note,
            pitch_bend_semitones: 0.0,
            volume: velocity as f32 / 127.0,
            pan_override,
            sample_rate,
            freq_hz: 0.0,
            hold: false,
            pending_note_off: false,
            created_at,
        };
        voice.recompute_freq();
        voice
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Equal-temperament frequency from note number and pitch bend:
    /// `440 * 2^((note + bend - 69) / 12)`.
    fn recompute_freq(&mut self) {
        self.freq_hz =
            440.0 * 2f32.powf((self.note as f32 + self.pitch_bend_semitones - 69.0) / 12.0);
    }

    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn freq_hz(&self) -> f32 {
        self.freq_hz
    }

    pub fn pan_override(&self) -> Option<f32> {
        self.pan_override
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.envelope.state()
    }

    /// A voice is busy exactly while its envelope hasn't reached Free.
    pub fn is_busy(&self) -> bool {
        !self.envelope.is_free()
    }

    pub fn digest(&self) -> VoiceDigest {
        VoiceDigest {
            note: self.note,
            freq_hz: self.freq_hz,
            envelope_level: self.envelope.level(),
            envelope_state: self.envelope.state(),
        }
    }

    /// Produce one mono sample: oscillator * envelope * volume.
    pub fn update(&mut self) -> f32 {
        let osc = self.oscillator.update(self.sample_rate, self.freq_hz);
        let env = self.envelope.update();
        osc * env * self.volume
    }

    /// If `hold` is set, defer to Release until hold is released; otherwise
    /// release immediately.
    pub fn note_off(&mut self) {
        if self.hold {
            self.pending_note_off = true;
        } else {
            self.envelope.note_off();
        }
    }

    /// Hard stop for voice stealing.
    pub fn note_cut(&mut self) {
        self.envelope.reset();
    }

    /// Release straight to the envelope, bypassing the hold deferral. Used
    /// when a retriggering noteOn displaces this voice - a retrigger
    /// replaces the note outright regardless of sustain pedal state.
    pub fn release_immediately(&mut self) {
        self.envelope.note_off();
    }

    /// On the false-transition with a note-off pending, release now.
    pub fn set_hold(&mut self, hold: bool) {
        let was_held = self.hold;
        self.hold = hold;
        if was_held && !hold && self.pending_note_off {
            self.pending_note_off = false;
            self.envelope.note_off();
        }
    }

    pub fn is_held(&self) -> bool {
        self.hold
    }

    pub fn set_pitch_bend(&mut self, semitones: f32) {
        self.pitch_bend_semitones = semitones;
        self.recompute_freq();
    }

    pub fn pitch_bend_semitones(&self) -> f32 {
        self.pitch_bend_semitones
    }
}
