//! Real-time synthesis engine for the ripieno tone module.
//!
//! Implements THE CORE described in spec.md: wavetable oscillators gated by
//! envelope generators, per-channel MIDI state, polyphonic voice allocation
//! with sustain, and the 16-channel [`synthesizer::Synthesizer`] that drains
//! a message queue and renders stereo audio. [`sequencer::Sequencer`] drives
//! a `Synthesizer` from a decoded Standard MIDI File body on its own thread.
//!
//! Data flow: a [`ripieno_midi::ScheduledMessage`] stream (from a
//! [`sequencer::Sequencer`] or a live MIDI source) is dispatched into
//! [`synthesizer::Synthesizer`], which routes channel-voice messages to a
//! [`channel::MidiChannel`]; each channel's [`voice_mapper::VoiceMapper`]
//! tracks which [`voice::Voice`] currently owns each sounding note number.
//! The audio thread calls `Synthesizer::render(frames)` once per host
//! callback; `render` drains whatever producers pushed into the
//! synthesizer's [`ripieno_midi::MessageQueue`] since the previous call and
//! produces a [`signal::Signal`].

pub mod error;
pub use error::{Error, Result};

pub mod id;
pub use id::{IdIssuer, ToneId, VoiceId};

pub mod signal;
pub use signal::Signal;

pub mod wavetable;
pub use wavetable::{WaveformId, WavetableSet};

pub mod oscillator;
pub use oscillator::WavetableOscillator;

pub mod envelope;
pub use envelope::{Envelope, EnvelopeParams, EnvelopeState};

pub mod lfo;
pub use lfo::Lfo;

pub mod voice;
pub use voice::{Voice, VoiceDigest};

pub mod voice_mapper;
pub use voice_mapper::VoiceMapper;

pub mod instrument;
pub use instrument::{drum_instrument, melodic_instrument, DrumNote, Instrument};

pub mod channel;
pub use channel::{MidiChannel, SystemType};

pub mod config;
pub use config::SynthesizerConfig;

pub mod synthesizer;
pub use synthesizer::{RenderStats, Synthesizer};

pub mod sequencer;
pub use sequencer::Sequencer;

#[cfg(feature = "toml-instruments")]
pub mod toml_instrument;
