//! Integration tests for the six scenarios named in spec.md §8.

use ripieno_midi::MidiEvent;
use ripieno_synth::channel::SystemType;
use ripieno_synth::{Synthesizer, SynthesizerConfig};

fn synth(sample_rate: f32) -> Synthesizer {
    Synthesizer::new(SynthesizerConfig::new(sample_rate))
}

/// S1: ProgramChange, NoteOn, render, NoteOff partway through, render more -
/// output is non-zero while sounding and decays toward silence by the end.
#[test]
fn s1_note_decays_to_silence_after_release() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::program_change(0, 0)));
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(0, 69, 100)));

    let sounding = s.render(48_000);
    assert!(
        sounding.left().iter().any(|&x| x.abs() > 1e-3),
        "expected audible signal while the note is held"
    );

    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_off(0, 69, 0)));
    let tail = s.render(24_000);

    let tail_end = &tail.left()[tail.frame_count() - 256..];
    let peak = tail_end.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
    assert!(peak < 1e-3, "expected the tail to have decayed near-silent, peak={peak}");
}

/// S2: retriggering the same note yields a new voice id and releases the
/// previous one through the mapper's `off` return.
#[test]
fn s2_retrigger_produces_distinct_voice_and_releases_old() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(0, 60, 100)));
    assert_eq!(s.voice_count(), 1);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(0, 60, 100)));
    // The old voice is releasing, the new one attacking: briefly two live.
    assert_eq!(s.voice_count(), 2);
    assert_eq!(s.channel(0).mapped_note_count(), 1, "only one note mapping survives a retrigger");
}

/// S3: sustain defers note-off until the pedal comes back up.
#[test]
fn s3_sustain_holds_note_until_pedal_released() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::control_change(0, 64, 127)));
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(0, 60, 100)));
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_off(0, 60, 0)));
    assert_eq!(s.voice_count(), 1, "voice must still be sounding while held");

    s.dispatch(ripieno_midi::Message::channel(MidiEvent::control_change(0, 64, 0)));
    let voice = s.channel(0).live_voices().next().expect("voice still present momentarily");
    assert_eq!(voice.envelope_state(), ripieno_synth::EnvelopeState::Release);
}

/// S4: GM1 On SysEx resets system type and clears every channel's voices.
#[test]
fn s4_gm1_sysex_resets_system_and_clears_voices() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(3, 60, 100)));
    assert_eq!(s.voice_count(), 1);

    s.dispatch(ripieno_midi::Message::sysex(vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]));
    assert_eq!(s.system_type(), SystemType::Gm1);
    assert_eq!(s.voice_count(), 0);
}

/// S5: pitch bend of +8192 at the default sensitivity (2 semitones) raises
/// a sounding A4 to approximately 493.88 Hz within one sample.
#[test]
fn s5_pitch_bend_raises_a4_by_two_semitones() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(0, 69, 100)));
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::pitch_bend(0, 16383)));

    let freq = s.channel(0).live_voices().next().unwrap().freq_hz();
    let expected = 440.0 * 2f32.powf(2.0 / 12.0);
    assert!((freq - expected).abs() < 1.0, "freq={freq} expected~={expected}");
}

/// S6: a drum-channel note-on uses the percussion kit mapping and the
/// drum note's default pan, overriding the channel's pan.
#[test]
fn s6_drum_channel_note_uses_kit_pan_override() {
    let mut s = synth(48_000.0);
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::control_change(9, 10, 0))); // hard pan left
    s.dispatch(ripieno_midi::Message::channel(MidiEvent::note_on(9, 36, 100))); // bass drum
    assert!(s.channel(9).is_drum_channel());

    let voice = s.channel(9).live_voices().next().unwrap();
    // Bass drum in instrument.rs maps to pan 0.0 (centered), not the
    // channel's hard-left pan CC - the override wins.
    assert_eq!(voice.pan_override(), Some(0.0));
}
