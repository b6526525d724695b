//! Per-channel noteNo -> VoiceId mapper with sustain-pedal (hold) deferral.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::id::VoiceId;

struct MappedNote {
    voice_id: VoiceId,
    holding: bool,
}

struct Inner {
    notes: HashMap<u8, MappedNote>,
    hold: bool,
}

/// Maps `noteNo -> active VoiceId` for one channel, honoring sustain-pedal
/// hold semantics. A `parking_lot::Mutex` serializes all operations; in
/// practice the owning channel only calls this from the audio thread.
pub struct VoiceMapper {
    inner: Mutex<Inner>,
}

impl VoiceMapper {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                notes: HashMap::new(),
                hold: false,
            }),
        }
    }

    /// Issue `on` for `note_no`, returning any displaced previous voice id
    /// as `off` (empty if there was none). A retrigger always replaces the
    /// prior mapping outright - hold is not honored for the displaced voice.
    pub fn note_on(&self, note_no: u8, new_voice_id: VoiceId) -> (VoiceId, VoiceId) {
        let mut inner = self.inner.lock();
        let off = match inner.notes.remove(&note_no) {
            Some(previous) => previous.voice_id,
            None => VoiceId::empty(),
        };
        inner.notes.insert(
            note_no,
            MappedNote {
                voice_id: new_voice_id,
                holding: false,
            },
        );
        (new_voice_id, off)
    }

    /// If `hold` is set and `force` is false, defer by marking the entry
    /// `holding` and return empty; otherwise remove the mapping and return
    /// its voice id.
    pub fn note_off(&self, note_no: u8, force: bool) -> VoiceId {
        let mut inner = self.inner.lock();
        if inner.hold && !force {
            if let Some(entry) = inner.notes.get_mut(&note_no) {
                entry.holding = true;
            }
            return VoiceId::empty();
        }
        match inner.notes.remove(&note_no) {
            Some(entry) => entry.voice_id,
            None => VoiceId::empty(),
        }
    }

    pub fn hold_on(&self) {
        self.inner.lock().hold = true;
    }

    /// Release every entry marked `holding`, returning their voice ids.
    pub fn hold_off(&self) -> Vec<VoiceId> {
        let mut inner = self.inner.lock();
        inner.hold = false;
        let released: Vec<u8> = inner
            .notes
            .iter()
            .filter(|(_, entry)| entry.holding)
            .map(|(&note, _)| note)
            .collect();
        let mut ids = Vec::with_capacity(released.len());
        for note in released {
            if let Some(entry) = inner.notes.remove(&note) {
                ids.push(entry.voice_id);
            }
        }
        ids
    }

    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.notes.clear();
        inner.hold = false;
    }

    pub fn count(&self) -> usize {
        self.inner.lock().notes.len()
    }

    /// All currently mapped voice ids, for "all notes off" style sweeps.
    pub fn all_voice_ids(&self) -> Vec<VoiceId> {
        self.inner
            .lock()
            .notes
            .values()
            .map(|entry| entry.voice_id)
            .collect()
    }

    /// All currently mapped note numbers, for CC123 "All Notes Off", which
    /// note-offs every mapped note through the normal hold path rather than
    /// cutting voices outright.
    pub fn notes(&self) -> Vec<u8> {
        self.inner.lock().notes.keys().copied().collect()
    }

    /// Remove whichever entry maps to `voice_id`, if any. Used when a voice
    /// is culled directly by the polyphony-cap enforcer rather than through
    /// a noteOff.
    pub fn remove_by_voice_id(&self, voice_id: VoiceId) {
        let mut inner = self.inner.lock();
        let note = inner
            .notes
            .iter()
            .find(|(_, entry)| entry.voice_id == voice_id)
            .map(|(&note, _)| note);
        if let Some(note) = note {
            inner.notes.remove(&note);
        }
    }
}

impl Default for VoiceMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{IdIssuer, VoiceTag};

    fn issuer() -> IdIssuer<VoiceTag> {
        IdIssuer::new()
    }

    #[test]
    fn note_on_then_note_off_roundtrips() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        let id = ids.issue();
        let (on, off) = mapper.note_on(60, id);
        assert_eq!(on, id);
        assert!(off.is_empty());
        assert_eq!(mapper.count(), 1);
        let released = mapper.note_off(60, false);
        assert_eq!(released, id);
        assert_eq!(mapper.count(), 0);
    }

    #[test]
    fn retrigger_returns_previous_as_off() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        let first = ids.issue();
        mapper.note_on(60, first);
        let second = ids.issue();
        let (on, off) = mapper.note_on(60, second);
        assert_eq!(on, second);
        assert_eq!(off, first);
        assert_eq!(mapper.count(), 1);
    }

    #[test]
    fn hold_defers_note_off() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        let id = ids.issue();
        mapper.note_on(60, id);
        mapper.hold_on();
        let released = mapper.note_off(60, false);
        assert!(released.is_empty());
        assert_eq!(mapper.count(), 1, "entry stays mapped while held");

        let released_by_hold_off = mapper.hold_off();
        assert_eq!(released_by_hold_off, vec![id]);
        assert_eq!(mapper.count(), 0);
    }

    #[test]
    fn hold_off_only_releases_notes_marked_holding() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        let held = ids.issue();
        let still_down = ids.issue();
        mapper.note_on(60, held);
        mapper.note_on(64, still_down);
        mapper.hold_on();
        mapper.note_off(60, false);
        // note 64 was never released - it should survive hold_off untouched.
        let released = mapper.hold_off();
        assert_eq!(released, vec![held]);
        assert_eq!(mapper.count(), 1);
    }

    #[test]
    fn force_note_off_ignores_hold() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        let id = ids.issue();
        mapper.note_on(60, id);
        mapper.hold_on();
        let released = mapper.note_off(60, true);
        assert_eq!(released, id);
        assert_eq!(mapper.count(), 0);
    }

    #[test]
    fn reset_clears_everything() {
        let ids = issuer();
        let mapper = VoiceMapper::new();
        mapper.note_on(60, ids.issue());
        mapper.hold_on();
        mapper.reset();
        assert_eq!(mapper.count(), 0);
        // hold flag cleared too: a subsequent note-off is immediate.
        let id = ids.issue();
        mapper.note_on(61, id);
        assert_eq!(mapper.note_off(61, false), id);
    }
}
