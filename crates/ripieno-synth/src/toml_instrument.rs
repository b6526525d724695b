//! Optional `.toml` instrument override files (spec.md §6 "Persisted
//! state: optional `.toml` instrument files... describe per-program
//! envelope overrides"). Gated behind the `toml-instruments` feature so the
//! core crate stays free of a `serde`/`toml` dependency by default.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::envelope::EnvelopeParams;
use crate::instrument::Instrument;
use crate::wavetable::WaveformId;
use crate::{Error, Result};

/// One `[[instrument]]` table entry in an override file.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentOverrideEntry {
    pub program: u8,
    pub waveform: u32,
    pub peak_level: f32,
    pub attack_time: f32,
    pub hold_time: f32,
    pub decay_time: f32,
    pub sustain_level: f32,
    pub fade_slope: f32,
    pub release_time: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct InstrumentOverrideFile {
    #[serde(default, rename = "instrument")]
    instruments: Vec<InstrumentOverrideEntry>,
}

/// A parsed set of per-program envelope/waveform overrides, keyed by GM
/// program number. Overrides a [`crate::instrument::melodic_instrument`]
/// lookup; programs absent from the file keep the built-in family default.
#[derive(Debug, Clone, Default)]
pub struct InstrumentOverrides {
    by_program: HashMap<u8, Instrument>,
}

impl InstrumentOverrides {
    pub fn from_str(text: &str) -> Result<Self> {
        let file: InstrumentOverrideFile =
            toml::from_str(text).map_err(|e| Error::DecodingError(e.to_string()))?;
        let by_program = file
            .instruments
            .into_iter()
            .map(|entry| {
                let instrument = Instrument {
                    waveform: WaveformId(entry.waveform),
                    envelope: EnvelopeParams {
                        peak_level: entry.peak_level,
                        attack_time: entry.attack_time,
                        hold_time: entry.hold_time,
                        decay_time: entry.decay_time,
                        sustain_level: entry.sustain_level,
                        fade_slope: entry.fade_slope,
                        release_time: entry.release_time,
                    },
                };
                (entry.program, instrument)
            })
            .collect();
        Ok(Self { by_program })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ResourceUnavailable(e.to_string()))?;
        Self::from_str(&text)
    }

    /// Resolve `program`, falling back to the built-in family table for any
    /// program this override file doesn't mention.
    pub fn resolve(&self, program: u8) -> Instrument {
        self.by_program
            .get(&program)
            .copied()
            .unwrap_or_else(|| crate::instrument::melodic_instrument(program))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_unmentioned_program_falls_back_to_family_table() {
        let overrides = InstrumentOverrides::from_str("").unwrap();
        let fallback = overrides.resolve(0);
        assert_eq!(fallback.waveform, crate::instrument::melodic_instrument(0).waveform);
    }

    #[test]
    fn overrides_mentioned_program() {
        let text = r#"
            [[instrument]]
            program = 0
            waveform = 1
            peak_level = 1.0
            attack_time = 1.5
            hold_time = 0.0
            decay_time = 0.1
            sustain_level = 0.5
            fade_slope = 0.02
            release_time = 0.2
        "#;
        let overrides = InstrumentOverrides::from_str(text).unwrap();
        let resolved = overrides.resolve(0);
        assert_eq!(resolved.waveform, WaveformId::SINE);
        assert!((resolved.envelope.attack_time - 1.5).abs() < 1e-6);
    }

    #[test]
    fn malformed_toml_is_a_decoding_error() {
        let result = InstrumentOverrides::from_str("not valid [[[ toml");
        assert!(result.is_err());
    }
}
