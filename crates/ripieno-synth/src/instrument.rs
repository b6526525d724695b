//! Program -> timbre lookup (melodic instruments) and note -> drum-kit
//! lookup (percussion), the tables `MidiChannel::note_on` consults when
//! allocating a voice.
//!
//! GM groups its 128 programs into 16 families of 8 consecutive program
//! numbers (Piano, Chromatic Percussion, Organ, Guitar, Bass, Strings,
//! Ensemble, Brass, Reed, Pipe, Synth Lead, Synth Pad, Synth Effects,
//! Ethnic, Percussive, Sound Effects). Since tone color here comes from
//! analytic wavetables rather than recorded samples, each family is mapped
//! to one representative waveform/envelope shape rather than 128 distinct
//! ones - what matters for a tone module's behavior is envelope/pitch
//! response, not per-program timbre fidelity.

use crate::envelope::EnvelopeParams;
use crate::wavetable::WaveformId;

/// A resolved timbre: which wavetable to oscillate and how its envelope
/// behaves.
#[derive(Debug, Clone, Copy)]
pub struct Instrument {
    pub waveform: WaveformId,
    pub envelope: EnvelopeParams,
}

/// One of the 16 GM program families, in program-number order.
const FAMILY_COUNT: usize = 16;

const FAMILIES: [Instrument; FAMILY_COUNT] = [
    // Piano: fast attack, moderate decay into a middling sustain.
    Instrument {
        waveform: WaveformId::SINE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.002,
            hold_time: 0.0,
            decay_time: 0.3,
            sustain_level: 0.4,
            fade_slope: 0.15,
            release_time: 0.2,
        },
    },
    // Chromatic Percussion: short and percussive.
    Instrument {
        waveform: WaveformId::TRIANGLE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.001,
            hold_time: 0.0,
            decay_time: 0.15,
            sustain_level: 0.1,
            fade_slope: 0.3,
            release_time: 0.1,
        },
    },
    // Organ: near-instant attack, flat full-level sustain (organs don't decay).
    Instrument {
        waveform: WaveformId::SQUARE_50,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.005,
            hold_time: 0.0,
            decay_time: 0.01,
            sustain_level: 1.0,
            fade_slope: 0.02,
            release_time: 0.05,
        },
    },
    // Guitar: plucked.
    Instrument {
        waveform: WaveformId::SAWTOOTH,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.003,
            hold_time: 0.0,
            decay_time: 0.4,
            sustain_level: 0.3,
            fade_slope: 0.1,
            release_time: 0.15,
        },
    },
    // Bass: punchy low end.
    Instrument {
        waveform: WaveformId::SQUARE_33,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.005,
            hold_time: 0.0,
            decay_time: 0.2,
            sustain_level: 0.6,
            fade_slope: 0.08,
            release_time: 0.12,
        },
    },
    // Strings: slow bowed attack, long sustain.
    Instrument {
        waveform: WaveformId::SAWTOOTH,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.08,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.85,
            fade_slope: 0.02,
            release_time: 0.3,
        },
    },
    // Ensemble: similar to strings, wider.
    Instrument {
        waveform: WaveformId::SQUARE_25,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.06,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.8,
            fade_slope: 0.02,
            release_time: 0.3,
        },
    },
    // Brass: moderate attack, bright.
    Instrument {
        waveform: WaveformId::SQUARE_50,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.03,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.75,
            fade_slope: 0.03,
            release_time: 0.15,
        },
    },
    // Reed: breathy attack.
    Instrument {
        waveform: WaveformId::TRIANGLE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.04,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.7,
            fade_slope: 0.03,
            release_time: 0.15,
        },
    },
    // Pipe: pure tone.
    Instrument {
        waveform: WaveformId::SINE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.05,
            hold_time: 0.0,
            decay_time: 0.05,
            sustain_level: 0.8,
            fade_slope: 0.02,
            release_time: 0.2,
        },
    },
    // Synth Lead: snappy, bright.
    Instrument {
        waveform: WaveformId::SAWTOOTH,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.01,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.8,
            fade_slope: 0.03,
            release_time: 0.1,
        },
    },
    // Synth Pad: slow attack, very long sustain.
    Instrument {
        waveform: WaveformId::SINE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.3,
            hold_time: 0.0,
            decay_time: 0.2,
            sustain_level: 0.9,
            fade_slope: 0.01,
            release_time: 0.5,
        },
    },
    // Synth Effects: slow evolving.
    Instrument {
        waveform: WaveformId::SQUARE_33,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.2,
            hold_time: 0.0,
            decay_time: 0.3,
            sustain_level: 0.6,
            fade_slope: 0.02,
            release_time: 0.4,
        },
    },
    // Ethnic: plucked/strummed.
    Instrument {
        waveform: WaveformId::TRIANGLE,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.005,
            hold_time: 0.0,
            decay_time: 0.35,
            sustain_level: 0.25,
            fade_slope: 0.1,
            release_time: 0.15,
        },
    },
    // Percussive: tuned percussion, fast decay.
    Instrument {
        waveform: WaveformId::SQUARE_25,
        envelope: EnvelopeParams {
            peak_level: 1.0,
            attack_time: 0.001,
            hold_time: 0.0,
            decay_time: 0.1,
            sustain_level: 0.0,
            fade_slope: 0.0,
            release_time: 0.05,
        },
    },
    // Sound Effects: noise-based.
    Instrument {
        waveform: WaveformId::WHITE_NOISE,
        envelope: EnvelopeParams {
            peak_level: 0.6,
            attack_time: 0.01,
            hold_time: 0.0,
            decay_time: 0.2,
            sustain_level: 0.2,
            fade_slope: 0.05,
            release_time: 0.2,
        },
    },
];

/// Resolve a GM program number (0-127) to an [`Instrument`]. Out-of-range
/// programs fall back to family 0 (Piano) rather than panicking - a running
/// synthesizer never halts on a malformed program-change byte.
pub fn melodic_instrument(program: u8) -> Instrument {
    let family = (program as usize / 8).min(FAMILY_COUNT - 1);
    FAMILIES[family]
}

/// A single drum kit voice: its waveform and a default pan position,
/// overriding the channel pan during mixdown.
#[derive(Debug, Clone, Copy)]
pub struct DrumNote {
    pub waveform: WaveformId,
    pub pan: f32,
    pub envelope: EnvelopeParams,
}

fn drum_envelope(decay: f32) -> EnvelopeParams {
    EnvelopeParams {
        peak_level: 1.0,
        attack_time: 0.0005,
        hold_time: 0.0,
        decay_time: decay,
        sustain_level: 0.0,
        fade_slope: 0.0,
        release_time: 0.03,
    }
}

/// Look up a percussion voice for a GM standard drum-map note number.
/// Notes outside the recognized set fall back to a centered drum-noise hit
/// rather than panicking.
pub fn drum_instrument(note: u8) -> DrumNote {
    match note {
        35 | 36 => DrumNote {
            waveform: WaveformId::DRUM_NOISE,
            pan: 0.0,
            envelope: drum_envelope(0.25),
        }, // Bass Drum
        38 | 40 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: 0.0,
            envelope: drum_envelope(0.15),
        }, // Snare
        42 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: 0.3,
            envelope: drum_envelope(0.03),
        }, // Closed Hi-Hat
        44 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: 0.3,
            envelope: drum_envelope(0.04),
        }, // Pedal Hi-Hat
        46 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: 0.3,
            envelope: drum_envelope(0.3),
        }, // Open Hi-Hat
        41 | 43 | 45 | 47 | 48 | 50 => DrumNote {
            waveform: WaveformId::TRIANGLE,
            pan: -0.3,
            envelope: drum_envelope(0.2),
        }, // Toms
        49 | 57 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: -0.5,
            envelope: drum_envelope(0.8),
        }, // Crash
        51 | 59 => DrumNote {
            waveform: WaveformId::WHITE_NOISE,
            pan: 0.5,
            envelope: drum_envelope(0.6),
        }, // Ride
        _ => DrumNote {
            waveform: WaveformId::DRUM_NOISE,
            pan: 0.0,
            envelope: drum_envelope(0.2),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_program_resolves() {
        for program in 0..=127u8 {
            let instrument = melodic_instrument(program);
            assert!(instrument.envelope.attack_time >= 0.0);
        }
    }

    #[test]
    fn program_zero_is_piano_family() {
        let piano = melodic_instrument(0);
        let also_piano = melodic_instrument(7);
        assert_eq!(piano.waveform, also_piano.waveform);
    }

    #[test]
    fn kick_and_ride_have_distinct_pans() {
        let kick = drum_instrument(36);
        let ride = drum_instrument(51);
        assert_ne!(kick.pan, ride.pan);
    }

    #[test]
    fn unrecognized_drum_note_falls_back() {
        let note = drum_instrument(127);
        assert_eq!(note.waveform, WaveformId::DRUM_NOISE);
    }
}
