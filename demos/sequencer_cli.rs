//! Builds a short hand-written phrase, drives it through a [`Sequencer`]
//! into a [`Synthesizer`], and prints [`RenderStats`] once playback drains.
//!
//! ```bash
//! cargo run --example sequencer_cli
//! ```

use std::thread;
use std::time::Duration;

use ripieno::{MidiEvent, RenderStats, ScheduledMessage, Sequencer, Synthesizer, SynthesizerConfig};

/// A short C major arpeggio, one note every 400ms, each held for 350ms.
fn phrase() -> Vec<ScheduledMessage> {
    let notes = [60u8, 64, 67, 72];
    let mut body = Vec::new();
    for (i, &note) in notes.iter().enumerate() {
        let start = i as u64 * 400_000;
        body.push(ScheduledMessage::new(start, MidiEvent::note_on(0, note, 100)));
        body.push(ScheduledMessage::new(
            start + 350_000,
            MidiEvent::note_off(0, note, 0),
        ));
    }
    body
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut synth = Synthesizer::new(SynthesizerConfig::default());
    let mut sequencer = Sequencer::new(synth.message_queue());

    sequencer.load(phrase()).expect("sequencer is idle");
    sequencer.start().expect("sequencer is idle");

    let frames_per_cycle = 512;
    let sample_rate = synth.config().sample_rate as u64;
    let cycle_duration = Duration::from_micros(frames_per_cycle as u64 * 1_000_000 / sample_rate);

    while sequencer.is_playing() {
        let signal = synth.render(frames_per_cycle);
        let peak = signal
            .left()
            .iter()
            .chain(signal.right())
            .fold(0.0f32, |acc, &s| acc.max(s.abs()));
        println!(
            "rendered {} frames, {} voices sounding, peak {:.3}",
            signal.frame_count(),
            synth.voice_count(),
            peak,
        );
        thread::sleep(cycle_duration);
    }

    // Drain whatever the final batch of note-offs still has ringing out.
    for _ in 0..20 {
        synth.render(frames_per_cycle);
    }

    print_stats(synth.stats());
}

fn print_stats(stats: &RenderStats) {
    println!(
        "total_samples={} failed_samples={} load_average={:.4}",
        stats.total_samples(),
        stats.failed_samples(),
        stats.load_average(),
    );
}
