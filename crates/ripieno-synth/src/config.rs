//! Synthesizer configuration.
//!
//! A plain struct constructed via `Default` and mutated with builder-style
//! setters, passed in at construction rather than read from a file - the
//! core tone generator has no file-based configuration of its own.

use crate::channel::SystemType;

/// Default polyphony cap (spec.md §5 "a configured polyphony cap").
pub const DEFAULT_POLYPHONY: usize = 64;
/// Default master gain applied after per-channel volume/expression/pan.
pub const DEFAULT_MASTER_GAIN: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesizerConfig {
    pub sample_rate: f32,
    pub polyphony_cap: usize,
    pub system_type: SystemType,
    pub master_gain: f32,
}

impl SynthesizerConfig {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    pub fn with_polyphony_cap(mut self, cap: usize) -> Self {
        self.polyphony_cap = cap;
        self
    }

    pub fn with_system_type(mut self, system_type: SystemType) -> Self {
        self.system_type = system_type;
        self
    }

    pub fn with_master_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain;
        self
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            polyphony_cap: DEFAULT_POLYPHONY,
            system_type: SystemType::Gm1,
            master_gain: DEFAULT_MASTER_GAIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SynthesizerConfig::new(48_000.0)
            .with_polyphony_cap(32)
            .with_system_type(SystemType::Gs)
            .with_master_gain(0.5);
        assert_eq!(config.sample_rate, 48_000.0);
        assert_eq!(config.polyphony_cap, 32);
        assert_eq!(config.system_type, SystemType::Gs);
        assert_eq!(config.master_gain, 0.5);
    }
}
