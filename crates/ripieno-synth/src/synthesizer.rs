//! 16-channel synthesizer: message ingestion, system reset dispatch, and the
//! stereo render loop (spec.md §4.9, C9).

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ripieno_midi::{Message, MetaEvent, MidiEvent, ScheduledMessage, SystemAction};

use crate::channel::{MidiChannel, SystemType};
use crate::config::SynthesizerConfig;
use crate::envelope::EnvelopeState;
use crate::id::{IdIssuer, VoiceTag};
use crate::signal::Signal;
use crate::wavetable::WavetableSet;

const CHANNEL_COUNT: usize = 16;

/// Atomically-updated counters surfaced to UI/visualizer threads (spec.md
/// §4.9 "Statistics tracked atomically").
#[derive(Default)]
pub struct RenderStats {
    total_samples: AtomicU64,
    failed_samples: AtomicU64,
    last_render_nanos: AtomicU64,
    last_cycle_nanos: AtomicU64,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples.load(Ordering::Relaxed)
    }

    pub fn failed_samples(&self) -> u64 {
        self.failed_samples.load(Ordering::Relaxed)
    }

    pub fn last_render_nanos(&self) -> u64 {
        self.last_render_nanos.load(Ordering::Relaxed)
    }

    pub fn last_cycle_nanos(&self) -> u64 {
        self.last_cycle_nanos.load(Ordering::Relaxed)
    }

    /// `render / cycle` - how much of the host's callback period was spent
    /// actually rendering (spec.md §4.9 "derived load average").
    pub fn load_average(&self) -> f32 {
        let cycle = self.last_cycle_nanos() as f32;
        if cycle <= 0.0 {
            return 0.0;
        }
        self.last_render_nanos() as f32 / cycle
    }

    fn record_render(&self, frames: usize, failed: usize, elapsed_nanos: u64) {
        self.total_samples.fetch_add(frames as u64, Ordering::Relaxed);
        self.failed_samples.fetch_add(failed as u64, Ordering::Relaxed);
        self.last_render_nanos.store(elapsed_nanos, Ordering::Relaxed);
    }

    /// Stamps the wall-clock time between the start of this render call and
    /// the start of the previous one - the host's actual callback period.
    fn record_cycle(&self, elapsed_nanos: u64) {
        self.last_cycle_nanos.store(elapsed_nanos, Ordering::Relaxed);
    }
}

/// Tiers considered in order when the polyphony cap is exceeded: oldest
/// Released voice first, then oldest Fading, then oldest still-building
/// (Attack/Hold/Decay) voice (OQ-3 in `DESIGN.md`).
const CULL_TIERS: &[&[EnvelopeState]] = &[
    &[EnvelopeState::Release],
    &[EnvelopeState::Fade],
    &[EnvelopeState::Attack, EnvelopeState::Hold, EnvelopeState::Decay],
];

/// Owns 16 [`MidiChannel`]s, the shared wavetable registry, the voice id
/// issuer, and message ingestion; produces stereo audio on demand (spec.md
/// §3 "Synthesizer state", §4.9).
pub struct Synthesizer {
    config: SynthesizerConfig,
    system_type: SystemType,
    channels: Vec<MidiChannel>,
    wavetables: WavetableSet,
    voice_ids: IdIssuer<VoiceTag>,
    /// Shared with any producer thread (the `Sequencer`, a live MIDI input)
    /// via [`Self::message_queue`]; only `render` drains it, and only the
    /// audio thread calls `render` (spec.md §5 "Shared resources").
    queue: std::sync::Arc<ripieno_midi::MessageQueue>,
    /// Total frames rendered so far; doubles as the age clock voices are
    /// stamped with at allocation (spec.md §3 invariant 6).
    sample_clock: AtomicU64,
    stats: RenderStats,
    last_cycle_start: Option<Instant>,
}

impl Synthesizer {
    pub fn new(config: SynthesizerConfig) -> Self {
        let channels = (0..CHANNEL_COUNT)
            .map(|i| MidiChannel::new(i as u8, config.sample_rate))
            .collect();
        Self {
            system_type: config.system_type,
            channels,
            wavetables: WavetableSet::new(),
            voice_ids: IdIssuer::new(),
            queue: std::sync::Arc::new(ripieno_midi::MessageQueue::new()),
            sample_clock: AtomicU64::new(0),
            stats: RenderStats::new(),
            last_cycle_start: None,
            config,
        }
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    pub fn system_type(&self) -> SystemType {
        self.system_type
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn channel(&self, index: u8) -> &MidiChannel {
        &self.channels[index as usize % CHANNEL_COUNT]
    }

    /// Total live voices across every channel.
    pub fn voice_count(&self) -> usize {
        self.channels.iter().map(MidiChannel::voice_count).sum()
    }

    /// A cloneable handle to the ingestion queue, for a producer thread (the
    /// `Sequencer`, or a live MIDI input callback) to push into without
    /// needing mutable access to the `Synthesizer` itself (spec.md §4.9
    /// "Producer side: any thread").
    pub fn message_queue(&self) -> std::sync::Arc<ripieno_midi::MessageQueue> {
        self.queue.clone()
    }

    /// Push `message`, due at `position_micros`, onto the ingestion queue.
    /// Equivalent to pushing onto a handle from [`Self::message_queue`].
    pub fn enqueue_message(&self, position_micros: u64, message: Message) {
        self.queue.push(ScheduledMessage::new(position_micros, message));
    }

    /// Dispatch a single already-due message directly, bypassing the queue -
    /// used by `render`'s queue drain and by callers (tests, a live input
    /// handler already on the audio thread) that don't need the
    /// cross-thread handoff (spec.md §4.9 "Consumer side").
    pub fn dispatch(&mut self, message: Message) {
        match message {
            Message::Channel(event) => self.dispatch_channel_event(event),
            Message::SysEx(bytes) => self.dispatch_sysex(&bytes),
            Message::Meta(meta) => self.dispatch_meta(meta),
        }
        self.enforce_polyphony_cap();
    }

    /// Dispatch every message in `messages`, in order - the entry point a
    /// `Sequencer` or live MIDI source uses to feed already-due messages
    /// into the synthesizer (spec.md §4.9 step 1).
    pub fn dispatch_all(&mut self, messages: Vec<ScheduledMessage>) {
        for scheduled in messages {
            self.dispatch(scheduled.message);
        }
    }

    fn dispatch_channel_event(&mut self, event: MidiEvent) {
        let index = event.channel_num();
        let created_at = self.sample_clock.load(Ordering::Relaxed);
        let channel = &mut self.channels[index as usize % CHANNEL_COUNT];
        match event.msg {
            ripieno_midi::ChannelVoiceMsg::NoteOn { note, velocity } => {
                channel.note_on(note, velocity, &self.voice_ids, &self.wavetables, created_at);
            }
            ripieno_midi::ChannelVoiceMsg::NoteOff { note, .. } => {
                channel.note_off(note, false);
            }
            ripieno_midi::ChannelVoiceMsg::ControlChange { control } => {
                if let ripieno_midi::ControlChange::CC { control, value } = control {
                    channel.control_change(control, value);
                }
            }
            ripieno_midi::ChannelVoiceMsg::ProgramChange { program } => {
                channel.program_change(program);
            }
            ripieno_midi::ChannelVoiceMsg::PitchBend { bend } => {
                channel.pitch_bend(bend);
            }
            // Aftertouch (channel and poly) is recognized but has no
            // effect on synthesis (spec.md §6 "Aftertouch (ignored)").
            ripieno_midi::ChannelVoiceMsg::ChannelPressure { .. }
            | ripieno_midi::ChannelVoiceMsg::PolyPressure { .. } => {}
            other => {
                tracing::debug!(?other, "unhandled channel voice message");
            }
        }
    }

    fn dispatch_sysex(&mut self, bytes: &[u8]) {
        match ripieno_midi::sysex::recognize(bytes) {
            Some(SystemAction::Gm1Reset) => self.reset_system(SystemType::Gm1),
            Some(SystemAction::Gm2Reset) => self.reset_system(SystemType::Gm2),
            Some(SystemAction::GsReset) => self.reset_system(SystemType::Gs),
            Some(SystemAction::XgReset) => self.reset_system(SystemType::Xg),
            Some(SystemAction::GsDrumPart { channel, is_drum }) => {
                if let Some(ch) = self.channels.get_mut(channel as usize) {
                    ch.set_drum_channel(is_drum);
                }
            }
            None => tracing::debug!(len = bytes.len(), "unrecognized SysEx, ignoring"),
        }
    }

    fn dispatch_meta(&mut self, meta: MetaEvent) {
        match meta {
            // Tempo has already been resolved into absolute microseconds by
            // the decoder by the time a message reaches the synthesizer
            // (spec.md §4.10); nothing to do here.
            MetaEvent::SetTempo { .. } => {}
            MetaEvent::Other => tracing::trace!("ignoring meta event"),
        }
    }

    /// Reset every channel to power-on defaults under the given system
    /// personality (spec.md §4.9 "System reset handling").
    fn reset_system(&mut self, system_type: SystemType) {
        self.system_type = system_type;
        for channel in &mut self.channels {
            channel.reset();
        }
    }

    /// Cull voices until the total live count is within the configured
    /// polyphony cap, oldest-first within the tier order named in
    /// `CULL_TIERS` (spec.md §3 invariant 6).
    fn enforce_polyphony_cap(&mut self) {
        loop {
            let total = self.voice_count();
            if total <= self.config.polyphony_cap {
                return;
            }
            let mut victim: Option<(usize, crate::id::VoiceId, u64)> = None;
            'tiers: for tier in CULL_TIERS {
                for (ch_idx, channel) in self.channels.iter().enumerate() {
                    if let Some((id, created_at)) = channel.oldest_voice_in_states(tier) {
                        victim = match victim {
                            Some((_, _, best)) if best <= created_at => victim,
                            _ => Some((ch_idx, id, created_at)),
                        };
                    }
                }
                if victim.is_some() {
                    break 'tiers;
                }
            }
            match victim {
                Some((ch_idx, id, _)) => self.channels[ch_idx].cut_voice(id),
                // Nothing left to cull (every channel empty) - give up
                // rather than spin.
                None => return,
            }
        }
    }

    /// Render `frames` stereo samples, draining and dispatching every due
    /// message on the ingestion queue first (spec.md §4.9 step 1-3).
    pub fn render(&mut self, frames: usize) -> Signal {
        let cycle_start = Instant::now();
        if let Some(previous) = self.last_cycle_start.replace(cycle_start) {
            self.stats.record_cycle(cycle_start.duration_since(previous).as_nanos() as u64);
        }

        let due = self.queue.drain_until(u64::MAX);
        self.dispatch_all(due);

        let render_start = Instant::now();
        let mut signal = Signal::stereo(frames);
        for frame in 0..frames {
            let (mut left, mut right) = (0.0f32, 0.0f32);
            for channel in &mut self.channels {
                let (l, r) = channel.render_frame();
                left += l;
                right += r;
            }
            left *= self.config.master_gain;
            right *= self.config.master_gain;
            signal.write_stereo(frame, left.clamp(-1.0, 1.0), right.clamp(-1.0, 1.0));
        }
        self.sample_clock.fetch_add(frames as u64, Ordering::Relaxed);

        let failed = signal.sanitize();
        let elapsed = render_start.elapsed().as_nanos() as u64;
        self.stats.record_render(frames, failed, elapsed);
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripieno_midi::MidiEvent;

    fn synth() -> Synthesizer {
        Synthesizer::new(SynthesizerConfig::new(48_000.0))
    }

    #[test]
    fn note_on_then_render_produces_nonzero_signal() {
        let mut s = synth();
        s.dispatch(Message::channel(MidiEvent::note_on(0, 69, 100)));
        let signal = s.render(256);
        assert!(signal.left().iter().any(|&x| x != 0.0));
    }

    #[test]
    fn render_output_is_always_finite_and_in_range() {
        let mut s = synth();
        s.dispatch(Message::channel(MidiEvent::note_on(0, 69, 127)));
        let signal = s.render(4096);
        for &sample in signal.left().iter().chain(signal.right()) {
            assert!(sample.is_finite());
            assert!((-1.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn gm1_reset_sysex_clears_voices_and_sets_system_type() {
        let mut s = synth();
        s.dispatch(Message::channel(MidiEvent::note_on(0, 60, 100)));
        assert_eq!(s.voice_count(), 1);
        s.dispatch(Message::sysex(vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7]));
        assert_eq!(s.system_type(), SystemType::Gm1);
        assert_eq!(s.voice_count(), 0);
    }

    #[test]
    fn gs_drum_part_sysex_flips_channel_drum_flag() {
        let mut s = synth();
        assert!(!s.channel(0).is_drum_channel());
        let bytes = ripieno_midi::sysex::gs_drum_part(0, true);
        s.dispatch(Message::sysex(bytes));
        assert!(s.channel(0).is_drum_channel());
    }

    #[test]
    fn polyphony_cap_culls_oldest_released_voice_first() {
        let mut s = synth();
        s.config.polyphony_cap = 2;
        s.dispatch(Message::channel(MidiEvent::note_on(0, 60, 100)));
        s.dispatch(Message::channel(MidiEvent::note_off(0, 60, 0)));
        s.dispatch(Message::channel(MidiEvent::note_on(0, 61, 100)));
        s.dispatch(Message::channel(MidiEvent::note_on(0, 62, 100)));
        assert!(s.voice_count() <= 2);
    }

    #[test]
    fn retrigger_keeps_voice_count_bounded() {
        let mut s = synth();
        s.dispatch(Message::channel(MidiEvent::note_on(0, 60, 100)));
        s.dispatch(Message::channel(MidiEvent::note_on(0, 60, 100)));
        // The displaced voice is released, not removed, until it renders
        // down to Free - so both ids may be briefly live.
        assert!(s.voice_count() <= 2);
    }

    #[test]
    fn pitch_bend_updates_live_voice_frequency() {
        let mut s = synth();
        s.dispatch(Message::channel(MidiEvent::note_on(0, 69, 100)));
        s.dispatch(Message::channel(MidiEvent::pitch_bend(0, 16383)));
        let freq = s.channel(0).live_voices().next().unwrap().freq_hz();
        let expected = 440.0 * 2f32.powf(2.0 / 12.0);
        assert!((freq - expected).abs() < 1.0);
    }

    #[test]
    fn enqueued_message_is_dispatched_on_next_render() {
        let mut s = synth();
        s.enqueue_message(0, Message::channel(MidiEvent::note_on(0, 60, 100)));
        assert_eq!(s.voice_count(), 0, "not dispatched until render drains the queue");
        s.render(64);
        assert_eq!(s.voice_count(), 1);
    }

    #[test]
    fn message_queue_handle_is_shared_across_threads() {
        let s = synth();
        let queue = s.message_queue();
        let handle = std::thread::spawn(move || {
            queue.push(ScheduledMessage::new(0, MidiEvent::note_on(0, 60, 100)));
        });
        handle.join().unwrap();
        assert_eq!(s.message_queue().len(), 1);
    }
}
