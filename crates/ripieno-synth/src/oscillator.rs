//! Wavetable oscillator.

use std::sync::Arc;

use crate::wavetable::WavetableEntry;

/// Reads one wavetable at a phase-driven rate. Phase is held as `f32` in
/// `[0, 1)`; linear interpolation between adjacent table frames is always
/// used here - every preset table in [`crate::wavetable::WavetableSet`] is
/// short enough that unconditional interpolation is both correct and
/// simpler than branching on table length.
pub struct WavetableOscillator {
    table: Arc<WavetableEntry>,
    volume: f32,
    phase: f32,
}

impl WavetableOscillator {
    pub fn new(table: Arc<WavetableEntry>, volume: f32) -> Self {
        Self {
            table,
            volume,
            phase: 0.0,
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    /// Produce the next sample and advance phase.
    ///
    /// `freq_hz` may be negative (reverse playback); the floored modulo
    /// below wraps correctly in that case.
    pub fn update(&mut self, sample_rate: f32, freq_hz: f32) -> f32 {
        let sample = self.peek();

        let cycles = self.table.cycles.max(1) as f32;
        let phase_delta = freq_hz / sample_rate / cycles;
        self.phase = floored_mod(self.phase + phase_delta, 1.0);

        sample * self.table.pre_amp * self.volume
    }

    /// Read the current sample without advancing phase (used for the
    /// Ground-fallback unit test and for visualizer digests).
    pub fn peek(&self) -> f32 {
        let frames = self.table.len();
        if frames == 0 {
            return 0.0;
        }
        let exact = self.phase * frames as f32;
        let i0 = (exact.floor() as usize) % frames;
        let i1 = (i0 + 1) % frames;
        let frac = exact - exact.floor();
        let s0 = self.table.samples[i0];
        let s1 = self.table.samples[i1];
        s0 + (s1 - s0) * frac
    }
}

/// Floored (always non-negative for a positive modulus) modulo, as opposed
/// to Rust's truncating `%` which keeps the sign of the dividend. Needed so
/// a negative `phase_delta` (reverse playback) still wraps into `[0,1)`
/// instead of producing a negative phase.
#[inline]
fn floored_mod(value: f32, modulus: f32) -> f32 {
    let r = value % modulus;
    if r < 0.0 {
        r + modulus
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavetable::{WaveformId, WavetableSet};

    #[test]
    fn phase_advances_and_wraps() {
        let set = WavetableSet::new();
        let mut osc = set.create_generator(WaveformId::SINE, 1.0);
        let sample_rate = 48_000.0;
        let freq = 440.0;
        for _ in 0..10_000 {
            osc.update(sample_rate, freq);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn reverse_playback_wraps_correctly() {
        let set = WavetableSet::new();
        let mut osc = set.create_generator(WaveformId::SINE, 1.0);
        for _ in 0..5_000 {
            osc.update(48_000.0, -440.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }

    #[test]
    fn ground_table_is_silent() {
        let set = WavetableSet::new();
        let mut osc = set.create_generator(WaveformId::GROUND, 1.0);
        for _ in 0..100 {
            assert_eq!(osc.update(48_000.0, 440.0), 0.0);
        }
    }

    #[test]
    fn phase_matches_expected_within_ulp_bound() {
        // After k updates at constant freq f and rate r, phase should equal
        // (k*f/(r*cycles)) mod 1 within a few ULP per update.
        let set = WavetableSet::new();
        let mut osc = set.create_generator(WaveformId::SINE, 1.0);
        let sample_rate = 44_100.0f32;
        let freq = 220.0f32;
        let cycles = 1.0f32;
        let k = 2_000;
        for _ in 0..k {
            osc.update(sample_rate, freq);
        }
        let expected = (k as f32 * freq / (sample_rate * cycles)).rem_euclid(1.0);
        let tolerance = (k as f32) * f32::EPSILON * 64.0;
        assert!(
            (osc.phase() - expected).abs() < tolerance,
            "phase {} vs expected {} (tol {})",
            osc.phase(),
            expected,
            tolerance
        );
    }

    #[test]
    fn volume_scales_output() {
        let set = WavetableSet::new();
        let mut loud = set.create_generator(WaveformId::SINE, 1.0);
        let mut quiet = set.create_generator(WaveformId::SINE, 0.5);
        let a = loud.update(48_000.0, 440.0);
        let b = quiet.update(48_000.0, 440.0);
        assert!((b - a * 0.5).abs() < 1e-6);
    }
}
