//! In-process persistence gateway.
//!
//! Stores rows in memory in the same flat shape a database table would use.
//! Besides backing local previews it lets tests inject failures, count
//! calls, and hold reads or writes open to exercise in-flight behaviour.

use crate::error::{StoreError, StoreResult};
use crate::gateway::{BatchResult, EntryOutcome, PersistenceGateway};
use async_trait::async_trait;
use pagecraft_types::{ContentField, ContentKey, ContentTree, PendingChange, StoredRow};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;
use tracing::debug;

/// A gateway that keeps every row in memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    rows: Mutex<BTreeMap<ContentKey, StoredRow>>,
    /// Keys whose writes are refused, with the reason reported.
    rejected: Mutex<HashMap<ContentKey, String>>,
    /// Whole-batch transport failure, if set.
    batch_failure: Mutex<Option<String>>,
    fail_fetches: AtomicBool,
    /// When set, a batch with any rejected entry writes nothing.
    transactional: AtomicBool,
    fetch_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    fetch_gate: Mutex<Option<Arc<Semaphore>>>,
    batch_gate: Mutex<Option<Arc<Semaphore>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryGateway {
    /// Creates an empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gateway seeded with rows.
    pub fn from_rows(rows: impl IntoIterator<Item = StoredRow>) -> Self {
        let gateway = Self::new();
        {
            let mut stored = lock(&gateway.rows);
            for row in rows {
                let key = ContentKey::new(&row.page_slug, &row.section_key, &row.field_key);
                stored.insert(key, row);
            }
        }
        gateway
    }

    /// Creates a gateway seeded from a JSON array of rows.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let rows: Vec<StoredRow> = serde_json::from_str(json)?;
        Ok(Self::from_rows(rows))
    }

    /// Writes one field directly, bypassing batches.
    pub fn put(&self, field: &ContentField) {
        lock(&self.rows).insert(field.key.clone(), StoredRow::from_field(field));
    }

    /// The stored row for a key.
    pub fn row(&self, key: &ContentKey) -> Option<StoredRow> {
        lock(&self.rows).get(key).cloned()
    }

    /// Every stored row, in key order.
    pub fn rows(&self) -> Vec<StoredRow> {
        lock(&self.rows).values().cloned().collect()
    }

    /// Makes every subsequent fetch fail (or succeed again).
    pub fn set_fetch_failure(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent batch fail as a whole with `reason`,
    /// or clears the failure with `None`.
    pub fn set_batch_failure(&self, reason: Option<&str>) {
        *lock(&self.batch_failure) = reason.map(str::to_string);
    }

    /// Refuses writes to `key` until [`MemoryGateway::accept`] is called.
    pub fn reject(&self, key: ContentKey, reason: impl Into<String>) {
        lock(&self.rejected).insert(key, reason.into());
    }

    /// Stops refusing writes to `key`.
    pub fn accept(&self, key: &ContentKey) {
        lock(&self.rejected).remove(key);
    }

    /// Switches between best-effort (default) and all-or-nothing batches.
    pub fn set_transactional(&self, transactional: bool) {
        self.transactional.store(transactional, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Holds every subsequent fetch until released with
    /// [`MemoryGateway::release_fetches`].
    pub fn hold_fetches(&self) {
        *lock(&self.fetch_gate) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets `n` held fetches proceed. Rows are read after release.
    pub fn release_fetches(&self, n: usize) {
        if let Some(gate) = lock(&self.fetch_gate).as_ref() {
            gate.add_permits(n);
        }
    }

    /// Holds every subsequent batch until released with
    /// [`MemoryGateway::release_batches`].
    pub fn hold_batches(&self) {
        *lock(&self.batch_gate) = Some(Arc::new(Semaphore::new(0)));
    }

    pub fn release_batches(&self, n: usize) {
        if let Some(gate) = lock(&self.batch_gate).as_ref() {
            gate.add_permits(n);
        }
    }

    async fn pass(gate: &Mutex<Option<Arc<Semaphore>>>) -> StoreResult<()> {
        let gate = lock(gate).clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|_| StoreError::Unavailable("gateway shut down".into()))?
                .forget();
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn fetch_page_content(&self, page_slug: &str) -> StoreResult<ContentTree> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.fetch_gate).await?;

        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory gateway offline".into()));
        }

        let rows: Vec<StoredRow> = lock(&self.rows)
            .values()
            .filter(|row| row.page_slug == page_slug)
            .cloned()
            .collect();
        debug!(page = page_slug, rows = rows.len(), "memory gateway read");
        Ok(ContentTree::from_rows(rows))
    }

    async fn upsert_content_batch(&self, entries: &[PendingChange]) -> StoreResult<BatchResult> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.batch_gate).await?;

        if let Some(reason) = lock(&self.batch_failure).clone() {
            return Err(StoreError::Unavailable(reason));
        }

        let rejected = lock(&self.rejected).clone();
        let any_rejected = entries.iter().any(|e| rejected.contains_key(&e.key));
        let write_nothing = any_rejected && self.transactional.load(Ordering::SeqCst);

        let mut rows = lock(&self.rows);
        let outcomes = entries
            .iter()
            .map(|entry| {
                if let Some(reason) = rejected.get(&entry.key) {
                    EntryOutcome::failed(entry.key.clone(), reason.clone())
                } else if write_nothing {
                    EntryOutcome::failed(entry.key.clone(), "batch rolled back")
                } else {
                    let field = ContentField::new(entry.key.clone(), entry.value.clone());
                    rows.insert(entry.key.clone(), StoredRow::from_field(&field));
                    EntryOutcome::acknowledged(entry.key.clone())
                }
            })
            .collect();
        debug!(entries = entries.len(), "memory gateway batch");
        Ok(BatchResult::new(outcomes))
    }
}
