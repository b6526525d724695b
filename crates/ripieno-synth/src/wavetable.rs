//! Wavetable registry.
//!
//! Tables are built once, eagerly, at [`WavetableSet::new`] rather than
//! lazily on first use: generating a table involves additive synthesis and
//! must never happen on the audio thread, and a `Synthesizer` is always
//! constructed off the audio thread.

use std::collections::HashMap;
use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::oscillator::WavetableOscillator;

/// Small unsigned integer naming a waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaveformId(pub u32);

impl WaveformId {
    pub const GROUND: WaveformId = WaveformId(0);
    pub const SINE: WaveformId = WaveformId(1);
    pub const SQUARE_50: WaveformId = WaveformId(2);
    pub const SQUARE_33: WaveformId = WaveformId(3);
    pub const SQUARE_25: WaveformId = WaveformId(4);
    /// Next free slot below the reserved `100`/`200` band; see `DESIGN.md`
    /// for why triangle/sawtooth are numbered here.
    pub const TRIANGLE: WaveformId = WaveformId(5);
    pub const SAWTOOTH: WaveformId = WaveformId(6);
    pub const WHITE_NOISE: WaveformId = WaveformId(100);
    pub const DRUM_NOISE: WaveformId = WaveformId(200);
    /// Custom ids begin here.
    pub const CUSTOM_BASE: u32 = 1024;
}

impl From<u32> for WaveformId {
    fn from(value: u32) -> Self {
        WaveformId(value)
    }
}

/// A single-cycle (or, for noise tables, long-running) waveform plus the
/// scalars needed to read it.
///
/// Invariant: `samples.len() > 0`.
pub struct WavetableEntry {
    pub samples: Vec<f32>,
    pub pre_amp: f32,
    pub cycles: u32,
}

impl WavetableEntry {
    fn new(samples: Vec<f32>, pre_amp: f32, cycles: u32) -> Self {
        debug_assert!(!samples.is_empty(), "wavetable entry must not be empty");
        Self {
            samples,
            pre_amp,
            cycles,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Length of the sine table: >= 1024 samples keeps THD under 0.1% at
/// audible frequencies.
const SINE_TABLE_LEN: usize = 2048;
/// Highest odd harmonic summed when bandlimiting square/triangle/sawtooth
/// tables by additive synthesis.
const DEFAULT_OVERTONE_ORDER: u32 = 30;
/// White noise table length: >= 1s at 44.1kHz.
const WHITE_NOISE_LEN: usize = 44_100;
const DRUM_NOISE_LEN: usize = 44_100;

/// Registry mapping [`WaveformId`] to a shared, read-only [`WavetableEntry`].
/// Tables are immutable after construction and may be shared by any number
/// of oscillators.
pub struct WavetableSet {
    tables: HashMap<WaveformId, Arc<WavetableEntry>>,
}

impl WavetableSet {
    /// Build the full preset registry (ground, sine, the three square
    /// duties, triangle, sawtooth, white noise, drum noise).
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(WaveformId::GROUND, Arc::new(ground_table()));
        tables.insert(WaveformId::SINE, Arc::new(sine_table(SINE_TABLE_LEN)));
        tables.insert(
            WaveformId::SQUARE_50,
            Arc::new(square_table(SINE_TABLE_LEN, 0.5, DEFAULT_OVERTONE_ORDER)),
        );
        tables.insert(
            WaveformId::SQUARE_33,
            Arc::new(square_table(SINE_TABLE_LEN, 1.0 / 3.0, DEFAULT_OVERTONE_ORDER)),
        );
        tables.insert(
            WaveformId::SQUARE_25,
            Arc::new(square_table(SINE_TABLE_LEN, 0.25, DEFAULT_OVERTONE_ORDER)),
        );
        tables.insert(
            WaveformId::TRIANGLE,
            Arc::new(triangle_table(SINE_TABLE_LEN, DEFAULT_OVERTONE_ORDER)),
        );
        tables.insert(
            WaveformId::SAWTOOTH,
            Arc::new(sawtooth_table(SINE_TABLE_LEN, DEFAULT_OVERTONE_ORDER)),
        );
        tables.insert(
            WaveformId::WHITE_NOISE,
            Arc::new(white_noise_table(WHITE_NOISE_LEN)),
        );
        tables.insert(
            WaveformId::DRUM_NOISE,
            Arc::new(drum_noise_table(DRUM_NOISE_LEN)),
        );
        Self { tables }
    }

    /// Register (or replace) a custom table. Ids below [`WaveformId::CUSTOM_BASE`]
    /// are reserved presets; callers are expected to only use this for
    /// `id.0 >= WaveformId::CUSTOM_BASE`, but nothing enforces it - replacing
    /// a preset is a caller error, not a panic.
    pub fn register(&mut self, id: WaveformId, entry: WavetableEntry) {
        self.tables.insert(id, Arc::new(entry));
    }

    pub fn get(&self, id: WaveformId) -> Option<&Arc<WavetableEntry>> {
        self.tables.get(&id)
    }

    /// Bind an oscillator to `id`'s table. Falls back to the Ground
    /// (silent) table and logs a warning for an unregistered id - never
    /// panics.
    pub fn create_generator(&self, id: WaveformId, volume: f32) -> WavetableOscillator {
        match self.tables.get(&id) {
            Some(entry) => WavetableOscillator::new(Arc::clone(entry), volume),
            None => {
                tracing::warn!(waveform_id = id.0, "unregistered waveform id, using Ground");
                let ground = self
                    .tables
                    .get(&WaveformId::GROUND)
                    .expect("Ground table always registered");
                WavetableOscillator::new(Arc::clone(ground), volume)
            }
        }
    }
}

impl Default for WavetableSet {
    fn default() -> Self {
        Self::new()
    }
}

fn ground_table() -> WavetableEntry {
    WavetableEntry::new(vec![0.0], 1.0, 1)
}

fn sine_table(len: usize) -> WavetableEntry {
    let samples = (0..len)
        .map(|i| (std::f32::consts::TAU * i as f32 / len as f32).sin())
        .collect();
    WavetableEntry::new(samples, 1.0, 1)
}

/// Bandlimited duty-cycle square wave built by additive synthesis of odd
/// harmonics up to `order`. `duty` in (0, 1) shifts energy
/// between harmonics via a phase-weighted Fourier series of a rectangular
/// pulse train; at `duty = 0.5` this reduces to the classic 1/n odd-harmonic
/// square series.
fn square_table(len: usize, duty: f32, order: u32) -> WavetableEntry {
    let mut samples = vec![0.0f32; len];
    for (i, sample) in samples.iter_mut().enumerate() {
        let phase = i as f32 / len as f32;
        let mut sum = 0.0f32;
        for n in 1..=order {
            // Fourier series of a rectangular pulse of width `duty`:
            // a_n = (2/(n*pi)) * sin(n*pi*duty) * cos-basis term.
            let nf = n as f32;
            let coeff = (2.0 / (nf * std::f32::consts::PI)) * (nf * std::f32::consts::PI * duty).sin();
            sum += coeff * (std::f32::consts::TAU * nf * phase).cos();
        }
        *sample = sum;
    }
    normalize(&mut samples);
    WavetableEntry::new(samples, 1.0, 1)
}

fn triangle_table(len: usize, order: u32) -> WavetableEntry {
    let mut samples = vec![0.0f32; len];
    for (i, sample) in samples.iter_mut().enumerate() {
        let phase = i as f32 / len as f32;
        let mut sum = 0.0f32;
        let mut k = 1u32;
        while k <= order {
            let kf = k as f32;
            let sign = if (k - 1) / 2 % 2 == 0 { 1.0 } else { -1.0 };
            sum += sign * (std::f32::consts::TAU * kf * phase).sin() / (kf * kf);
            k += 2;
        }
        *sample = sum;
    }
    normalize(&mut samples);
    WavetableEntry::new(samples, 1.0, 1)
}

fn sawtooth_table(len: usize, order: u32) -> WavetableEntry {
    let mut samples = vec![0.0f32; len];
    for (i, sample) in samples.iter_mut().enumerate() {
        let phase = i as f32 / len as f32;
        let mut sum = 0.0f32;
        for n in 1..=order {
            let nf = n as f32;
            let sign = if n % 2 == 0 { -1.0 } else { 1.0 };
            sum += sign * (std::f32::consts::TAU * nf * phase).sin() / nf;
        }
        *sample = sum;
    }
    normalize(&mut samples);
    WavetableEntry::new(samples, 1.0, 1)
}

/// Deterministic PRNG seed so test runs and renders are reproducible; tone
/// color is what matters, not cryptographic randomness.
const NOISE_SEED: u64 = 0x5217_3A11_C0FF_EE01;

fn white_noise_table(len: usize) -> WavetableEntry {
    let mut rng = StdRng::seed_from_u64(NOISE_SEED);
    let samples = (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
    WavetableEntry::new(samples, 1.0, 1)
}

/// Filtered noise with a decaying envelope baked into the table itself: a
/// one-pole lowpass over white noise, amplitude-shaped by an exponential
/// decay, so a single playback of the table already sounds like a struck
/// drum without requiring a separate envelope shape.
fn drum_noise_table(len: usize) -> WavetableEntry {
    let mut rng = StdRng::seed_from_u64(NOISE_SEED ^ 0xD12_u64);
    let mut samples = vec![0.0f32; len];
    let mut filtered = 0.0f32;
    const POLE: f32 = 0.2;
    for (i, sample) in samples.iter_mut().enumerate() {
        let white: f32 = rng.gen_range(-1.0f32..=1.0);
        filtered = filtered * (1.0 - POLE) + white * POLE;
        let decay = (-5.0 * i as f32 / len as f32).exp();
        *sample = filtered * decay;
    }
    normalize(&mut samples);
    WavetableEntry::new(samples, 1.0, 1)
}

fn normalize(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak > 1e-6 {
        for s in samples.iter_mut() {
            *s /= peak;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_all_registered() {
        let set = WavetableSet::new();
        for id in [
            WaveformId::GROUND,
            WaveformId::SINE,
            WaveformId::SQUARE_50,
            WaveformId::SQUARE_33,
            WaveformId::SQUARE_25,
            WaveformId::TRIANGLE,
            WaveformId::SAWTOOTH,
            WaveformId::WHITE_NOISE,
            WaveformId::DRUM_NOISE,
        ] {
            let entry = set.get(id).unwrap_or_else(|| panic!("missing {id:?}"));
            assert!(!entry.is_empty());
        }
    }

    #[test]
    fn unregistered_id_falls_back_to_ground() {
        let set = WavetableSet::new();
        assert!(set.get(WaveformId(9999)).is_none());
        let osc = set.create_generator(WaveformId(9999), 1.0);
        // Ground table is a single zero sample: the oscillator is silent.
        assert_eq!(osc.peek(), 0.0);
    }

    #[test]
    fn tables_stay_in_normalized_range() {
        let set = WavetableSet::new();
        for id in [
            WaveformId::SINE,
            WaveformId::SQUARE_50,
            WaveformId::TRIANGLE,
            WaveformId::SAWTOOTH,
            WaveformId::WHITE_NOISE,
            WaveformId::DRUM_NOISE,
        ] {
            let entry = set.get(id).unwrap();
            for &s in &entry.samples {
                assert!((-1.0..=1.0).contains(&s), "{id:?} sample out of range: {s}");
            }
        }
    }

    #[test]
    fn custom_registration_is_visible() {
        let mut set = WavetableSet::new();
        let id = WaveformId(WaveformId::CUSTOM_BASE);
        set.register(id, WavetableEntry::new(vec![1.0, -1.0], 1.0, 1));
        assert_eq!(set.get(id).unwrap().len(), 2);
    }
}
