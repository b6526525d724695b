//! Position-ordered message queue shared between the sequencer thread
//! (producer) and the audio render thread (consumer).

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::message::ScheduledMessage;

/// A sorted-by-position queue of pending messages.
///
/// Insertion keeps the queue ordered by `position_micros`; messages that
/// share a position keep their relative insertion order (the scan in
/// [`Self::push`] stops at the first *strictly greater* position). Depth is
/// expected to stay small (at most a handful of messages per render
/// callback), so a linear scan is preferred over a binary heap: it keeps
/// insertion order stable for equal positions and avoids the complexity of
/// a `BinaryHeap`'s `Ord`-based tie-breaking.
#[derive(Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<ScheduledMessage>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Insert `msg`, keeping the queue ordered by `position_micros`.
    pub fn push(&self, msg: ScheduledMessage) {
        let mut queue = self.inner.lock();
        let index = queue
            .iter()
            .position(|existing| existing.position_micros > msg.position_micros)
            .unwrap_or(queue.len());
        queue.insert(index, msg);
    }

    /// Remove and return the front message if its position is strictly
    /// before `until` (microseconds). Returns `None` if the queue is empty
    /// or the front message isn't due yet.
    pub fn pop(&self, until: u64) -> Option<ScheduledMessage> {
        let mut queue = self.inner.lock();
        match queue.front() {
            Some(front) if front.position_micros < until => queue.pop_front(),
            _ => None,
        }
    }

    /// Drain every message due before `until`, in order.
    pub fn drain_until(&self, until: u64) -> Vec<ScheduledMessage> {
        let mut out = Vec::new();
        while let Some(msg) = self.pop(until) {
            out.push(msg);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MidiEvent;

    fn msg(position_micros: u64) -> ScheduledMessage {
        ScheduledMessage::new(position_micros, MidiEvent::note_on(0, 60, 100))
    }

    #[test]
    fn push_keeps_order() {
        let q = MessageQueue::new();
        q.push(msg(30));
        q.push(msg(10));
        q.push(msg(20));
        assert_eq!(q.pop(100).unwrap().position_micros, 10);
        assert_eq!(q.pop(100).unwrap().position_micros, 20);
        assert_eq!(q.pop(100).unwrap().position_micros, 30);
    }

    #[test]
    fn equal_positions_preserve_insertion_order() {
        let q = MessageQueue::new();
        q.push(ScheduledMessage::new(10, MidiEvent::note_on(0, 60, 100)));
        q.push(ScheduledMessage::new(10, MidiEvent::note_on(0, 61, 100)));
        let first = q.pop(100).unwrap();
        let second = q.pop(100).unwrap();
        assert_eq!(first.message, ScheduledMessage::new(10, MidiEvent::note_on(0, 60, 100)).message);
        assert_eq!(second.message, ScheduledMessage::new(10, MidiEvent::note_on(0, 61, 100)).message);
    }

    #[test]
    fn pop_respects_until() {
        let q = MessageQueue::new();
        q.push(msg(50));
        assert_eq!(q.pop(50), None);
        assert!(q.pop(51).is_some());
    }

    #[test]
    fn drain_until_collects_all_due() {
        let q = MessageQueue::new();
        q.push(msg(10));
        q.push(msg(20));
        q.push(msg(30));
        let due = q.drain_until(25);
        assert_eq!(due.len(), 2);
        assert_eq!(q.len(), 1);
    }
}
