//! Process-wide monotonic id issuance.
//!
//! `VoiceId` and `ToneId` are both instances of [`IssuableId`], phantom-typed
//! on a marker so the two can't be conflated by accident even though both
//! are newtype wrappers over the same `u64` counter representation.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Marker for [`IssuableId`] instantiations. Not constructible.
pub trait IdTag {}

/// Marks ids naming a live [`crate::voice::Voice`].
#[derive(Debug)]
pub enum VoiceTag {}
impl IdTag for VoiceTag {}

/// Marks ids naming a registered tone/instrument definition.
#[derive(Debug)]
pub enum ToneTag {}
impl IdTag for ToneTag {}

pub type VoiceId = IssuableId<VoiceTag>;
pub type ToneId = IssuableId<ToneTag>;

/// A 64-bit id issued by an [`IdIssuer`]. `0` is the reserved "empty" value:
/// no issuer ever hands it out, so it safely represents "no voice"/"no tone"
/// without an `Option` wrapper on the hot path.
pub struct IssuableId<Tag: IdTag> {
    value: u64,
    _tag: PhantomData<Tag>,
}

impl<Tag: IdTag> IssuableId<Tag> {
    /// The reserved empty id. Compares unequal to any id an issuer returns.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            value: 0,
            _tag: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.value == 0
    }

    #[inline]
    const fn from_raw(value: u64) -> Self {
        Self {
            value,
            _tag: PhantomData,
        }
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.value
    }
}

impl<Tag: IdTag> Clone for IssuableId<Tag> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<Tag: IdTag> Copy for IssuableId<Tag> {}

impl<Tag: IdTag> PartialEq for IssuableId<Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<Tag: IdTag> Eq for IssuableId<Tag> {}

impl<Tag: IdTag> std::hash::Hash for IssuableId<Tag> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<Tag: IdTag> std::fmt::Debug for IssuableId<Tag> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "IssuableId({})", self.value)
    }
}

impl<Tag: IdTag> Default for IssuableId<Tag> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Atomic counter that hands out unique, monotonically increasing ids for
/// one `Tag`. Relaxed ordering is enough: we need uniqueness, not
/// publication of any other memory alongside the id.
pub struct IdIssuer<Tag: IdTag> {
    next: AtomicU64,
    _tag: PhantomData<Tag>,
}

impl<Tag: IdTag> IdIssuer<Tag> {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            _tag: PhantomData,
        }
    }

    /// Issue a fresh id, guaranteed greater than every id previously issued
    /// by this issuer.
    pub fn issue(&self) -> IssuableId<Tag> {
        let value = self.next.fetch_add(1, Ordering::Relaxed);
        IssuableId::from_raw(value)
    }

    pub const fn empty(&self) -> IssuableId<Tag> {
        IssuableId::empty()
    }
}

impl<Tag: IdTag> Default for IdIssuer<Tag> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_reserved() {
        let issuer: IdIssuer<VoiceTag> = IdIssuer::new();
        assert!(issuer.empty().is_empty());
        assert_ne!(issuer.issue(), issuer.empty());
    }

    #[test]
    fn issue_is_monotonic() {
        let issuer: IdIssuer<VoiceTag> = IdIssuer::new();
        let mut previous = issuer.issue();
        for _ in 0..1000 {
            let next = issuer.issue();
            assert!(next.raw() > previous.raw());
            previous = next;
        }
    }

    #[test]
    fn tags_are_distinct_types() {
        let voices: IdIssuer<VoiceTag> = IdIssuer::new();
        let tones: IdIssuer<ToneTag> = IdIssuer::new();
        let v = voices.issue();
        let t = tones.issue();
        // Same raw value (both start at 1) but different types -
        // this wouldn't compile if it mixed them: `v == t` is a type error.
        assert_eq!(v.raw(), t.raw());
    }

    #[test]
    fn issue_across_threads_stays_monotonic_and_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let issuer: Arc<IdIssuer<VoiceTag>> = Arc::new(IdIssuer::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let issuer = Arc::clone(&issuer);
            handles.push(std::thread::spawn(move || {
                (0..500).map(|_| issuer.issue().raw()).collect::<Vec<_>>()
            }));
        }
        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "id {id} issued twice");
            }
        }
        assert_eq!(all.len(), 8 * 500);
    }
}
