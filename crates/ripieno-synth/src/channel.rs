//! Per-channel MIDI state and voice ownership.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::envelope::EnvelopeState;
use crate::id::{IdIssuer, VoiceId, VoiceTag};
use crate::instrument::{drum_instrument, melodic_instrument};
use crate::voice::Voice;
use crate::voice_mapper::VoiceMapper;
use crate::wavetable::WavetableSet;

/// Tone-module personality a `Synthesizer` is reset into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemType {
    #[default]
    Gm1,
    Gm2,
    Gs,
    Xg,
}

/// Which RPN/NRPN a subsequent Data Entry (CC6/CC38) targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamSelect {
    None,
    Rpn(u8, u8),
    Nrpn(u8, u8),
}

/// Registered Parameter Number 0: Pitch Bend Sensitivity (spec.md §4.8).
const RPN_PITCH_BEND_SENSITIVITY: (u8, u8) = (0, 0);
/// RPN 1: Fine Tune (cents).
const RPN_FINE_TUNE: (u8, u8) = (0, 1);
/// RPN 2: Coarse Tune (semitones).
const RPN_COARSE_TUNE: (u8, u8) = (0, 2);
/// The MIDI "null" RPN/NRPN selection (0x7F, 0x7F on both MSB/LSB pairs)
/// deselects addressing, per the MIDI spec.
const RPN_NULL: (u8, u8) = (0x7F, 0x7F);

const DEFAULT_VOLUME: u8 = 100;
const DEFAULT_EXPRESSION: u8 = 127;
const DEFAULT_PAN: u8 = 64;
const DEFAULT_PITCH_BEND_SENSITIVITY: f32 = 2.0;

/// Convention: channel index 9 (the 10th channel) is the drum channel on
/// GM/GS, overridable by SysEx GS Drum Part or bank select (spec.md §3).
pub const DEFAULT_DRUM_CHANNEL_INDEX: u8 = 9;

pub struct MidiChannel {
    index: u8,
    sample_rate: f32,

    program: u8,
    bank_msb: u8,
    bank_lsb: u8,
    volume: u8,
    expression: u8,
    pan_cc: u8,
    pitch_bend_raw: i16,
    pitch_bend_sensitivity_semitones: f32,
    fine_tune_cents: f32,
    coarse_tune_semitones: f32,
    sustain: bool,
    mod_wheel: u8,
    param_select: ParamSelect,
    is_drum_channel: bool,

    voices: HashMap<VoiceId, Voice>,
    voice_mapper: VoiceMapper,
}

impl MidiChannel {
    pub fn new(index: u8, sample_rate: f32) -> Self {
        let mut channel = Self {
            index,
            sample_rate,
            program: 0,
            bank_msb: 0,
            bank_lsb: 0,
            volume: DEFAULT_VOLUME,
            expression: DEFAULT_EXPRESSION,
            pan_cc: DEFAULT_PAN,
            pitch_bend_raw: 0,
            pitch_bend_sensitivity_semitones: DEFAULT_PITCH_BEND_SENSITIVITY,
            fine_tune_cents: 0.0,
            coarse_tune_semitones: 0.0,
            sustain: false,
            mod_wheel: 0,
            param_select: ParamSelect::None,
            is_drum_channel: index == DEFAULT_DRUM_CHANNEL_INDEX,
            voices: HashMap::new(),
            voice_mapper: VoiceMapper::new(),
        };
        channel.is_drum_channel = index == DEFAULT_DRUM_CHANNEL_INDEX;
        channel
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn is_drum_channel(&self) -> bool {
        self.is_drum_channel
    }

    pub fn set_drum_channel(&mut self, is_drum: bool) {
        self.is_drum_channel = is_drum;
    }

    pub fn program(&self) -> u8 {
        self.program
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn mapped_note_count(&self) -> usize {
        self.voice_mapper.count()
    }

    pub fn live_voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }

    fn pitch_bend_semitones(&self) -> f32 {
        (self.pitch_bend_raw as f32 / 8192.0) * self.pitch_bend_sensitivity_semitones
            + self.coarse_tune_semitones
            + self.fine_tune_cents / 100.0
    }

    /// `(value/127)^2` channel-volume gain (spec.md §4.8 CC7).
    fn volume_gain(&self) -> f32 {
        let v = self.volume as f32 / 127.0;
        v * v
    }

    /// Expression (CC11) linearly multiplies volume (spec.md §4.8).
    fn expression_gain(&self) -> f32 {
        self.expression as f32 / 127.0
    }

    /// Channel pan in `[-1, 1]`, centered at CC value 64 (spec.md §3).
    pub fn pan(&self) -> f32 {
        ((self.pan_cc as f32 - 64.0) / 63.0).clamp(-1.0, 1.0)
    }

    // -- Voice-affecting dispatch --------------------------------------

    pub fn note_on(
        &mut self,
        note: u8,
        velocity: u8,
        voice_ids: &IdIssuer<VoiceTag>,
        wavetables: &WavetableSet,
        created_at: u64,
    ) {
        if velocity == 0 {
            self.note_off(note, false);
            return;
        }

        let new_id = voice_ids.issue();
        let (_, displaced) = self.voice_mapper.note_on(note, new_id);
        if !displaced.is_empty() {
            if let Some(voice) = self.voices.get_mut(&displaced) {
                voice.release_immediately();
            }
        }

        let (waveform, envelope_params, pan_override) = if self.is_drum_channel {
            let drum = drum_instrument(note);
            (drum.waveform, drum.envelope, Some(drum.pan))
        } else {
            let instrument = melodic_instrument(self.program);
            (instrument.waveform, instrument.envelope, None)
        };

        let oscillator = wavetables.create_generator(waveform, 1.0);
        let mut voice = Voice::with_created_at(
            oscillator,
            envelope_params,
            note,
            velocity,
            self.sample_rate,
            pan_override,
            created_at,
        );
        voice.set_pitch_bend(self.pitch_bend_semitones());
        voice.set_hold(self.sustain);
        self.voices.insert(new_id, voice);
    }

    /// Find the oldest (lowest `created_at`) live voice whose envelope is in
    /// `state`, for polyphony-cap culling (spec.md §3 invariant 6).
    pub fn oldest_voice_in_state(&self, state: EnvelopeState) -> Option<(VoiceId, u64)> {
        self.oldest_voice_in_states(&[state])
    }

    /// As [`Self::oldest_voice_in_state`], but considers any of `states` -
    /// used for the polyphony-cap enforcer's last-resort "Attacking" tier,
    /// which covers Attack/Hold/Decay together (OQ-3 in `DESIGN.md`).
    pub fn oldest_voice_in_states(&self, states: &[EnvelopeState]) -> Option<(VoiceId, u64)> {
        self.voices
            .iter()
            .filter(|(_, voice)| states.contains(&voice.envelope_state()))
            .map(|(&id, voice)| (id, voice.created_at()))
            .min_by_key(|&(_, created_at)| created_at)
    }

    /// Cut a specific voice immediately and drop its note mapping - used by
    /// the polyphony-cap enforcer, which has already chosen which voice to
    /// steal (spec.md §3 invariant 6).
    pub fn cut_voice(&mut self, id: VoiceId) {
        if let Some(mut voice) = self.voices.remove(&id) {
            voice.note_cut();
        }
        self.voice_mapper.remove_by_voice_id(id);
    }

    pub fn note_off(&mut self, note: u8, force: bool) {
        let id = self.voice_mapper.note_off(note, force);
        if !id.is_empty() {
            if let Some(voice) = self.voices.get_mut(&id) {
                if force {
                    voice.release_immediately();
                } else {
                    voice.note_off();
                }
            }
        }
    }

    pub fn program_change(&mut self, program: u8) {
        self.program = program;
    }

    pub fn pitch_bend(&mut self, bend: u16) {
        self.pitch_bend_raw = bend as i32 as i16 - 8192;
        let semis = self.pitch_bend_semitones();
        for voice in self.voices.values_mut() {
            voice.set_pitch_bend(semis);
        }
    }

    pub fn control_change(&mut self, control: u8, value: u8) {
        match control {
            0 => self.bank_msb = value,
            1 => self.mod_wheel = value,
            6 => self.data_entry_msb(value),
            7 => self.volume = value,
            10 => self.pan_cc = value,
            11 => self.expression = value,
            32 => self.bank_lsb = value,
            38 => self.data_entry_lsb(value),
            64 => self.sustain(value),
            98 => self.select_nrpn_lsb(value),
            99 => self.select_nrpn_msb(value),
            100 => self.select_rpn_lsb(value),
            101 => self.select_rpn_msb(value),
            120 => self.all_sound_off(),
            121 => self.reset_all_controllers(),
            123 => self.all_notes_off(),
            _ => tracing::debug!(channel = self.index, cc = control, value, "unhandled CC"),
        }
    }

    fn sustain(&mut self, value: u8) {
        if value >= 64 {
            self.sustain = true;
            self.voice_mapper.hold_on();
            for voice in self.voices.values_mut() {
                voice.set_hold(true);
            }
        } else {
            self.sustain = false;
            for id in self.voice_mapper.hold_off() {
                if let Some(voice) = self.voices.get_mut(&id) {
                    voice.release_immediately();
                }
            }
            for voice in self.voices.values_mut() {
                voice.set_hold(false);
            }
        }
    }

    fn select_rpn_msb(&mut self, msb: u8) {
        self.param_select = match self.param_select {
            ParamSelect::Rpn(_, lsb) => ParamSelect::Rpn(msb, lsb),
            _ => ParamSelect::Rpn(msb, 0x7F),
        };
        self.apply_rpn_null_check();
    }

    fn select_rpn_lsb(&mut self, lsb: u8) {
        self.param_select = match self.param_select {
            ParamSelect::Rpn(msb, _) => ParamSelect::Rpn(msb, lsb),
            _ => ParamSelect::Rpn(0x7F, lsb),
        };
        self.apply_rpn_null_check();
    }

    fn select_nrpn_msb(&mut self, msb: u8) {
        self.param_select = match self.param_select {
            ParamSelect::Nrpn(_, lsb) => ParamSelect::Nrpn(msb, lsb),
            _ => ParamSelect::Nrpn(msb, 0x7F),
        };
    }

    fn select_nrpn_lsb(&mut self, lsb: u8) {
        self.param_select = match self.param_select {
            ParamSelect::Nrpn(msb, _) => ParamSelect::Nrpn(msb, lsb),
            _ => ParamSelect::Nrpn(0x7F, lsb),
        };
    }

    fn apply_rpn_null_check(&mut self) {
        if let ParamSelect::Rpn(msb, lsb) = self.param_select {
            if (msb, lsb) == RPN_NULL {
                self.param_select = ParamSelect::None;
            }
        }
    }

    fn data_entry_msb(&mut self, value: u8) {
        if let ParamSelect::Rpn(msb, lsb) = self.param_select {
            match (msb, lsb) {
                RPN_PITCH_BEND_SENSITIVITY => {
                    self.pitch_bend_sensitivity_semitones = value as f32;
                }
                RPN_COARSE_TUNE => {
                    // centered at 64: +/-63 semitones.
                    self.coarse_tune_semitones = value as f32 - 64.0;
                }
                RPN_FINE_TUNE => {
                    // MSB contributes the coarse half of a 14-bit value
                    // mapped to +/-100 cents.
                    self.fine_tune_cents = (value as f32 - 64.0) / 64.0 * 100.0;
                }
                _ => {}
            }
        }
        self.refresh_pitch_bend_on_voices();
    }

    fn data_entry_lsb(&mut self, value: u8) {
        if let ParamSelect::Rpn(msb, lsb) = self.param_select {
            if (msb, lsb) == RPN_FINE_TUNE {
                // fold the fine half of the 14-bit value into cents too.
                self.fine_tune_cents += (value as f32 / 127.0) * (100.0 / 64.0);
            }
        }
        self.refresh_pitch_bend_on_voices();
    }

    fn refresh_pitch_bend_on_voices(&mut self) {
        let semis = self.pitch_bend_semitones();
        for voice in self.voices.values_mut() {
            voice.set_pitch_bend(semis);
        }
    }

    /// CC120: cut every voice immediately (spec.md §4.8).
    pub fn all_sound_off(&mut self) {
        for voice in self.voices.values_mut() {
            voice.note_cut();
        }
        self.voices.clear();
        self.voice_mapper.reset();
    }

    /// CC121: restore the MIDI-spec default controller state. Per the MIDI
    /// spec this resets pitch bend, modulation, expression, sustain, and
    /// RPN/NRPN addressing - volume, pan, and program are untouched.
    pub fn reset_all_controllers(&mut self) {
        self.pitch_bend_raw = 0;
        self.mod_wheel = 0;
        self.expression = DEFAULT_EXPRESSION;
        self.param_select = ParamSelect::None;
        self.sustain(0);
        self.refresh_pitch_bend_on_voices();
    }

    /// CC123: note-off every mapped note through the normal (hold-aware)
    /// path (spec.md §4.8).
    pub fn all_notes_off(&mut self) {
        for note in self.voice_mapper.notes() {
            self.note_off(note, false);
        }
    }

    /// Full system reset (spec.md §4.9 reset SysEx handling): every control
    /// returns to its power-on default and all voices are cut.
    pub fn reset(&mut self) {
        self.program = 0;
        self.bank_msb = 0;
        self.bank_lsb = 0;
        self.volume = DEFAULT_VOLUME;
        self.expression = DEFAULT_EXPRESSION;
        self.pan_cc = DEFAULT_PAN;
        self.pitch_bend_raw = 0;
        self.pitch_bend_sensitivity_semitones = DEFAULT_PITCH_BEND_SENSITIVITY;
        self.fine_tune_cents = 0.0;
        self.coarse_tune_semitones = 0.0;
        self.sustain = false;
        self.mod_wheel = 0;
        self.param_select = ParamSelect::None;
        self.is_drum_channel = self.index == DEFAULT_DRUM_CHANNEL_INDEX;
        self.voices.clear();
        self.voice_mapper.reset();
    }

    /// Produce this channel's stereo contribution for one sample, panning
    /// each voice individually (a drum-channel voice's explicit pan
    /// overrides the channel pan per spec.md §4.6) before the channel's
    /// volume/expression gain is applied, then prunes voices whose envelope
    /// has gone Free (spec.md §4.9 step 2a).
    pub fn render_frame(&mut self) -> (f32, f32) {
        let mut left = 0.0f32;
        let mut right = 0.0f32;
        let mut finished: SmallVec<[VoiceId; 8]> = SmallVec::new();

        for (&id, voice) in self.voices.iter_mut() {
            let sample = voice.update();
            let pan = voice.pan_override().unwrap_or_else(|| self.pan());
            let theta = (pan.clamp(-1.0, 1.0) + 1.0) * std::f32::consts::FRAC_PI_4;
            left += sample * theta.cos();
            right += sample * theta.sin();
            if !voice.is_busy() {
                finished.push(id);
            }
        }
        for id in finished {
            self.voices.remove(&id);
        }

        let gain = self.volume_gain() * self.expression_gain();
        (left * gain, right * gain)
    }
}
