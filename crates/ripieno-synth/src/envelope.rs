//! Six-state AHDSR+Fade+Release envelope generator.

/// Envelope lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Attack,
    Hold,
    Decay,
    Fade,
    Release,
    Free,
}

/// Construction-time envelope shape. Times are seconds; `fade_slope` is a
/// per-second linear rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub peak_level: f32,
    pub attack_time: f32,
    pub hold_time: f32,
    pub decay_time: f32,
    pub sustain_level: f32,
    pub fade_slope: f32,
    pub release_time: f32,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        Self {
            peak_level: 1.0,
            attack_time: 0.01,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.7,
            fade_slope: 0.05,
            release_time: 0.3,
        }
    }
}

/// Level below which a ramp toward zero is considered to have arrived.
const EPSILON: f32 = 1e-5;

/// AHDSR envelope with a post-sustain linear Fade toward zero while the
/// note is still held, and an explicit Release captured from whatever level
/// the envelope was at when noteOff arrived.
///
/// All times are converted to per-sample increments at construction, so
/// [`Self::update`] is pure arithmetic with no division in the hot path.
pub struct Envelope {
    params: EnvelopeParams,
    sample_rate: f32,
    state: EnvelopeState,
    level: f32,
    /// Level captured at the instant of noteOff; Release ramps from here to
    /// zero over `release_time`.
    release_start_level: f32,
    /// Samples elapsed in the current state.
    samples_in_state: u64,
    attack_increment: f32,
    decay_increment: f32,
    release_increment: f32,
    fade_increment: f32,
    attack_samples: u64,
    hold_samples: u64,
    decay_samples: u64,
    release_samples: u64,
}

impl Envelope {
    pub fn new(params: EnvelopeParams, sample_rate: f32) -> Self {
        let mut envelope = Self {
            params,
            sample_rate,
            state: EnvelopeState::Free,
            level: 0.0,
            release_start_level: 0.0,
            samples_in_state: 0,
            attack_increment: 0.0,
            decay_increment: 0.0,
            release_increment: 0.0,
            fade_increment: 0.0,
            attack_samples: 0,
            hold_samples: 0,
            decay_samples: 0,
            release_samples: 0,
        };
        envelope.recompute_increments();
        envelope
    }

    fn recompute_increments(&mut self) {
        let rate = self.sample_rate.max(1.0);
        self.attack_samples = (self.params.attack_time * rate).round() as u64;
        self.hold_samples = (self.params.hold_time * rate).round() as u64;
        self.decay_samples = (self.params.decay_time * rate).round() as u64;
        self.release_samples = (self.params.release_time * rate).round() as u64;

        self.attack_increment = if self.attack_samples > 0 {
            self.params.peak_level / self.attack_samples as f32
        } else {
            self.params.peak_level
        };
        self.decay_increment = if self.decay_samples > 0 {
            (self.params.peak_level - self.params.sustain_level) / self.decay_samples as f32
        } else {
            self.params.peak_level - self.params.sustain_level
        };
        self.fade_increment = self.params.fade_slope / rate;
        self.release_increment = 0.0; // computed per-noteOff from captured level
    }

    pub fn params(&self) -> &EnvelopeParams {
        &self.params
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recompute_increments();
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_free(&self) -> bool {
        self.state == EnvelopeState::Free
    }

    /// Begin (or re-trigger) the envelope from Attack at level 0.
    pub fn note_on(&mut self) {
        self.state = EnvelopeState::Attack;
        self.level = 0.0;
        self.samples_in_state = 0;
    }

    /// Transition to Release from any non-Free state, capturing the
    /// current level as the ramp's start point.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Free {
            return;
        }
        self.release_start_level = self.level;
        self.release_increment = if self.release_samples > 0 {
            self.release_start_level / self.release_samples as f32
        } else {
            self.release_start_level
        };
        self.state = EnvelopeState::Release;
        self.samples_in_state = 0;
    }

    /// Hard stop: jump straight to Free (used when a voice is stolen or
    /// force-cut).
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Free;
        self.level = 0.0;
        self.samples_in_state = 0;
    }

    /// Produce the next amplitude scalar in `[0,1]` and advance the state
    /// machine one sample.
    pub fn update(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Attack => {
                self.level += self.attack_increment;
                self.samples_in_state += 1;
                if self.samples_in_state >= self.attack_samples {
                    self.level = self.params.peak_level;
                    self.state = EnvelopeState::Hold;
                    self.samples_in_state = 0;
                }
            }
            EnvelopeState::Hold => {
                self.level = self.params.peak_level;
                self.samples_in_state += 1;
                if self.samples_in_state >= self.hold_samples {
                    self.state = EnvelopeState::Decay;
                    self.samples_in_state = 0;
                }
            }
            EnvelopeState::Decay => {
                self.level -= self.decay_increment;
                self.samples_in_state += 1;
                if self.samples_in_state >= self.decay_samples {
                    self.level = self.params.sustain_level;
                    self.state = EnvelopeState::Fade;
                    self.samples_in_state = 0;
                }
            }
            EnvelopeState::Fade => {
                self.level -= self.fade_increment;
                if self.level <= EPSILON {
                    self.level = 0.0;
                    self.state = EnvelopeState::Free;
                }
            }
            EnvelopeState::Release => {
                self.level = self.release_start_level - self.release_increment * self.samples_in_state as f32;
                self.samples_in_state += 1;
                if self.samples_in_state >= self.release_samples || self.level <= EPSILON {
                    self.level = 0.0;
                    self.state = EnvelopeState::Free;
                }
            }
            EnvelopeState::Free => {
                self.level = 0.0;
            }
        }
        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }
}
