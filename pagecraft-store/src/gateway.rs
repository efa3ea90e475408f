//! Persistence gateway abstraction.
//!
//! The engine does not know which database or transport stores content.
//! Anything that can read a page's overrides and upsert a batch of changes
//! can back it.

use crate::error::StoreResult;
use async_trait::async_trait;
use pagecraft_types::{ContentKey, ContentTree, PendingChange};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// The backend that persists content overrides.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Reads every stored override of a page. A page with no overrides
    /// yields an empty tree, not an error.
    async fn fetch_page_content(&self, page_slug: &str) -> StoreResult<ContentTree>;

    /// Upserts a batch of changes and reports an outcome per entry.
    ///
    /// Implementations may be all-or-nothing or best-effort; callers must
    /// not assume either.
    async fn upsert_content_batch(&self, entries: &[PendingChange]) -> StoreResult<BatchResult>;
}

/// Whether one batch entry was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryStatus {
    Acknowledged,
    Failed { reason: String },
}

/// The outcome for one key of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub key: ContentKey,
    pub status: EntryStatus,
}

impl EntryOutcome {
    pub fn acknowledged(key: ContentKey) -> Self {
        Self {
            key,
            status: EntryStatus::Acknowledged,
        }
    }

    pub fn failed(key: ContentKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            status: EntryStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_acknowledged(&self) -> bool {
        self.status == EntryStatus::Acknowledged
    }
}

/// A failed batch entry, as reported to the administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFailure {
    pub key: ContentKey,
    pub reason: String,
}

/// Per-entry outcomes of [`PersistenceGateway::upsert_content_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<EntryOutcome>) -> Self {
        Self { outcomes }
    }

    /// A result acknowledging every entry.
    pub fn acknowledge_all(entries: &[PendingChange]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|e| EntryOutcome::acknowledged(e.key.clone()))
                .collect(),
        )
    }

    /// Every entry of `entries` that was not acknowledged. An entry with no
    /// outcome at all counts as failed.
    pub fn failures(&self, entries: &[PendingChange]) -> Vec<EntryFailure> {
        let by_key: HashMap<&ContentKey, &EntryStatus> =
            self.outcomes.iter().map(|o| (&o.key, &o.status)).collect();

        entries
            .iter()
            .filter_map(|entry| match by_key.get(&entry.key) {
                Some(EntryStatus::Acknowledged) => None,
                Some(EntryStatus::Failed { reason }) => Some(EntryFailure {
                    key: entry.key.clone(),
                    reason: reason.clone(),
                }),
                None => Some(EntryFailure {
                    key: entry.key.clone(),
                    reason: "no acknowledgement from gateway".to_string(),
                }),
            })
            .collect()
    }

    /// True only if every entry of `entries` was acknowledged.
    pub fn all_acknowledged(&self, entries: &[PendingChange]) -> bool {
        self.failures(entries).is_empty()
    }

    /// Pages with at least one acknowledged entry.
    pub fn acknowledged_pages(&self) -> BTreeSet<String> {
        self.outcomes
            .iter()
            .filter(|o| o.is_acknowledged())
            .map(|o| o.key.page_slug.clone())
            .collect()
    }
}
