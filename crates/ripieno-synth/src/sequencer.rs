//! Drives a `Synthesizer` from a decoded SMF body on a dedicated thread.
//!
//! A stop channel built from `crossbeam_channel`, a `thread::Builder`-spawned
//! worker, an `AtomicBool` liveness flag, and a best-effort `thread_priority`
//! raise inside the spawned closure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use ripieno_midi::{Message, MessageQueue, ScheduledMessage};
use thread_priority::ThreadPriority;

use crate::error::{Error, Result};

/// Messages scheduled within this many microseconds of each other are
/// delivered to the queue as one batch rather than sleeping between them
/// individually (spec.md §4.10 "the thread may coalesce many messages
/// scheduled within ≤1 ms").
const COALESCE_WINDOW_MICROS: u64 = 1000;

/// Drives a pre-decoded, ascending-by-time message list into a
/// `Synthesizer`'s ingestion queue on its own thread, honoring the
/// original timing between messages.
pub struct Sequencer {
    queue: Arc<MessageQueue>,
    body: Option<Vec<ScheduledMessage>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    playing: Arc<AtomicBool>,
}

impl Sequencer {
    /// `queue` is typically obtained via `Synthesizer::message_queue` - the
    /// sequencer only ever touches the thread-safe ingestion queue, never
    /// the synthesizer's channel/voice state directly (spec.md §5).
    pub fn new(queue: Arc<MessageQueue>) -> Self {
        Self {
            queue,
            body: None,
            stop_tx: None,
            handle: None,
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Accept a decoded message list, sorted ascending by
    /// `position_micros` (spec.md §4.10 "`load(body)`"). Fails with
    /// `InvalidState` while already playing.
    pub fn load(&mut self, body: Vec<ScheduledMessage>) -> Result<()> {
        if self.is_playing() {
            return Err(Error::InvalidState("load while playing".into()));
        }
        self.body = Some(body);
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Spawn the worker thread and begin delivering the loaded body.
    pub fn start(&mut self) -> Result<()> {
        if self.is_playing() {
            return Err(Error::InvalidState("start while already playing".into()));
        }
        let body = self.body.take().unwrap_or_default();
        let (stop_tx, stop_rx) = bounded(1);
        let queue = Arc::clone(&self.queue);
        let playing = Arc::clone(&self.playing);
        playing.store(true, Ordering::Release);

        let handle = thread::Builder::new()
            .name("ripieno-sequencer".into())
            .spawn(move || {
                let _ = thread_priority::set_current_thread_priority(ThreadPriority::Max);
                run(body, &queue, &stop_rx);
                playing.store(false, Ordering::Release);
            })
            .expect("failed to spawn sequencer thread");

        self.stop_tx = Some(stop_tx);
        self.handle = Some(handle);
        Ok(())
    }

    /// Signal the worker to stop and join it. No further messages are
    /// delivered once this returns. `InvalidState` if not currently
    /// playing.
    pub fn stop(&mut self) -> Result<()> {
        let Some(stop_tx) = self.stop_tx.take() else {
            return Err(Error::InvalidState("stop while not playing".into()));
        };
        let _ = stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.playing.store(false, Ordering::Release);
        Ok(())
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Worker-thread body: deliver `body` to `queue` in order, honoring each
/// message's scheduled offset from the epoch (the instant the thread
/// started), waking immediately and exiting if `stop_rx` fires (spec.md
/// §4.10 "Thread loop").
fn run(body: Vec<ScheduledMessage>, queue: &MessageQueue, stop_rx: &Receiver<()>) {
    let epoch = Instant::now();
    let mut index = 0;
    while index < body.len() {
        let batch_start = index;
        let batch_position = body[index].position_micros;
        index += 1;
        // Coalesce any immediately-following messages within the window
        // into the same wait/deliver step.
        while index < body.len() && body[index].position_micros - batch_position <= COALESCE_WINDOW_MICROS {
            index += 1;
        }

        let target = epoch + Duration::from_micros(batch_position);
        let now = Instant::now();
        if target > now {
            match stop_rx.recv_timeout(target - now) {
                Ok(()) => return,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => return,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            }
        } else if stop_rx.try_recv().is_ok() {
            return;
        }

        for scheduled in &body[batch_start..index] {
            queue.push(scheduled.clone());
        }
    }
}

/// Convenience for building a `ScheduledMessage` list in tests/demos without
/// spelling out the struct each time.
pub fn schedule(position_micros: u64, message: impl Into<Message>) -> ScheduledMessage {
    ScheduledMessage::new(position_micros, message)
}
