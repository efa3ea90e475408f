//! Staged, uncommitted edits.

use crate::{ContentKey, ContentValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A change staged during edit mode. The value's tag is the type
/// discriminant, so a change can target a field the tree does not have yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingChange {
    pub key: ContentKey,
    pub value: ContentValue,
}

impl PendingChange {
    pub fn new(key: ContentKey, value: ContentValue) -> Self {
        Self { key, value }
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }
}

/// Pending changes keyed by [`ContentKey`]. Holds at most one value per key;
/// staging a key again replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingBuffer {
    changes: BTreeMap<ContentKey, ContentValue>,
}

impl PendingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a change and returns the value it replaced, if any.
    pub fn stage(&mut self, change: PendingChange) -> Option<ContentValue> {
        self.changes.insert(change.key, change.value)
    }

    pub fn get(&self, key: &ContentKey) -> Option<&ContentValue> {
        self.changes.get(key)
    }

    pub fn contains(&self, key: &ContentKey) -> bool {
        self.changes.contains_key(key)
    }

    pub fn remove(&mut self, key: &ContentKey) -> Option<ContentValue> {
        self.changes.remove(key)
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContentKey, &ContentValue)> {
        self.changes.iter()
    }

    /// The buffer as a batch, in key order.
    pub fn to_changes(&self) -> Vec<PendingChange> {
        self.changes
            .iter()
            .map(|(key, value)| PendingChange::new(key.clone(), value.clone()))
            .collect()
    }

    /// Page slugs touched by the buffer.
    pub fn pages(&self) -> BTreeSet<String> {
        self.changes.keys().map(|k| k.page_slug.clone()).collect()
    }

    /// Removes every entry of `committed` whose value is still the one that
    /// was committed. Entries re-staged since then stay. Returns how many
    /// entries were removed.
    pub fn drain_committed(&mut self, committed: &PendingBuffer) -> usize {
        let before = self.changes.len();
        self.changes
            .retain(|key, value| committed.get(key) != Some(&*value));
        before - self.changes.len()
    }
}

impl FromIterator<PendingChange> for PendingBuffer {
    fn from_iter<I: IntoIterator<Item = PendingChange>>(iter: I) -> Self {
        let mut buffer = Self::new();
        for change in iter {
            buffer.stage(change);
        }
        buffer
    }
}
