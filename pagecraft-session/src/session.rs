//! Edit session: edit mode and the pending change buffer.
//!
//! One session exists per browser tab. It is the only writer of the pending
//! buffer. Staging is synchronous; only [`EditSession::commit_all`] awaits,
//! and no lock is held while it does.
//!
//! Every exit from edit mode starts a new epoch. A commit that finishes
//! after its epoch ended may still invalidate cached pages, but it never
//! touches the buffer the administrator has moved on to.

use crate::auth::{AllowAll, Authorizer};
use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use chrono::{DateTime, Utc};
use pagecraft_store::{ContentStoreClient, EntryFailure, PersistenceGateway, StoreError};
use pagecraft_types::{ContentKey, ContentValue, PendingBuffer, PendingChange, SessionId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Viewing,
    Editing,
    /// Editing, with a batch on its way to the gateway.
    Committing,
}

/// Summary of a successful commit.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    /// Entries sent and acknowledged.
    pub committed: usize,
    /// Pages invalidated in the store.
    pub pages: Vec<String>,
    pub committed_at: DateTime<Utc>,
}

impl CommitReport {
    fn nothing_to_commit() -> Self {
        Self {
            committed: 0,
            pages: Vec::new(),
            committed_at: Utc::now(),
        }
    }
}

/// The failure indicator shown to the administrator after a commit fails.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitFailure {
    pub message: String,
    /// Entries the gateway refused. Empty when the batch failed as a whole.
    pub failures: Vec<EntryFailure>,
    pub failed_at: DateTime<Utc>,
}

impl CommitFailure {
    fn from_error(error: &SessionError) -> Self {
        let failures = match error {
            SessionError::CommitRejected { failures, .. } => failures.clone(),
            _ => Vec::new(),
        };
        Self {
            message: error.to_string(),
            failures,
            failed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    editing: bool,
    /// Shared with in-flight commits; staging copies on write.
    pending: Arc<PendingBuffer>,
    epoch: u64,
    /// Epoch of the commit currently running, if any.
    in_flight: Option<u64>,
    last_failure: Option<CommitFailure>,
}

impl SessionState {
    fn clear_in_flight(&mut self, epoch: u64) {
        if self.in_flight == Some(epoch) {
            self.in_flight = None;
        }
    }
}

/// Marks a commit of `epoch` as in flight until it finishes or its future
/// is dropped, so a cancelled commit never blocks the next one.
struct InFlightCommit<'a> {
    session: &'a EditSession,
    epoch: u64,
    finished: bool,
}

impl InFlightCommit<'_> {
    /// Clears the marker under a lock the caller already holds.
    fn finish(mut self, state: &mut SessionState) {
        state.clear_in_flight(self.epoch);
        self.finished = true;
    }
}

impl Drop for InFlightCommit<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.session.state().clear_in_flight(self.epoch);
        debug!(session = %self.session.id, "commit cancelled before completion");
    }
}

/// The edit-mode state machine and the pending buffer.
pub struct EditSession {
    id: SessionId,
    gateway: Arc<dyn PersistenceGateway>,
    store: Arc<ContentStoreClient>,
    authorizer: Arc<dyn Authorizer>,
    config: SessionConfig,
    state: Mutex<SessionState>,
}

impl EditSession {
    /// Creates a session that lets anyone enter edit mode.
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        store: Arc<ContentStoreClient>,
        config: SessionConfig,
    ) -> Self {
        Self::with_authorizer(gateway, store, config, Arc::new(AllowAll))
    }

    /// Creates a session gated by a custom authorizer.
    pub fn with_authorizer(
        gateway: Arc<dyn PersistenceGateway>,
        store: Arc<ContentStoreClient>,
        config: SessionConfig,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            id: SessionId::new(),
            gateway,
            store,
            authorizer,
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        let state = self.state();
        if !state.editing {
            SessionPhase::Viewing
        } else if state.in_flight == Some(state.epoch) {
            SessionPhase::Committing
        } else {
            SessionPhase::Editing
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        self.state().editing
    }

    /// The pending buffer, only while editing. This is the layer the
    /// resolver puts above stored content.
    pub fn pending(&self) -> Option<Arc<PendingBuffer>> {
        let state = self.state();
        state.editing.then(|| Arc::clone(&state.pending))
    }

    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    /// The failure of the most recent commit, until a commit succeeds or
    /// edit mode is left.
    pub fn last_commit_failure(&self) -> Option<CommitFailure> {
        self.state().last_failure.clone()
    }

    /// Viewing → Editing. Entering while already editing is a no-op.
    pub fn enter_edit_mode(&self) -> SessionResult<()> {
        if !self.authorizer.can_edit() {
            warn!(session = %self.id, "edit mode refused by authorizer");
            return Err(SessionError::Unauthorized);
        }
        let mut state = self.state();
        if !state.editing {
            state.editing = true;
            info!(session = %self.id, epoch = state.epoch, "entered edit mode");
        }
        Ok(())
    }

    /// Editing → Viewing. Discards every pending change at once and does
    /// not wait for a commit in flight.
    pub fn exit_edit_mode(&self) {
        let mut state = self.state();
        if !state.editing {
            return;
        }
        let discarded = state.pending.len();
        state.editing = false;
        state.pending = Arc::default();
        state.last_failure = None;
        state.epoch += 1;
        info!(session = %self.id, discarded, "left edit mode");
    }

    /// Empties the buffer but stays in edit mode. Returns how many changes
    /// were dropped.
    pub fn discard_all(&self) -> usize {
        let mut state = self.state();
        if !state.editing {
            return 0;
        }
        let discarded = state.pending.len();
        state.pending = Arc::default();
        state.last_failure = None;
        info!(session = %self.id, discarded, "discarded pending changes");
        discarded
    }

    /// Upserts a change into the buffer. Rejected outside edit mode.
    pub fn stage_change(&self, change: PendingChange) -> SessionResult<()> {
        change.key.validate()?;
        let mut state = self.state();
        if !state.editing {
            warn!(session = %self.id, key = %change.key, "change staged outside edit mode, ignoring");
            return Err(SessionError::NotEditing);
        }
        debug!(session = %self.id, key = %change.key, kind = %change.kind(), "change staged");
        Arc::make_mut(&mut state.pending).stage(change);
        Ok(())
    }

    /// Shorthand for [`EditSession::stage_change`].
    pub fn stage(&self, key: ContentKey, value: ContentValue) -> SessionResult<()> {
        self.stage_change(PendingChange::new(key, value))
    }

    /// Sends the whole buffer to the gateway as one batch.
    ///
    /// Succeeds only if every entry is acknowledged. On any failure the
    /// buffer is left exactly as it was. On success the committed entries
    /// are drained, except those staged again since the commit began, and
    /// every touched page is invalidated in the store. An empty buffer
    /// returns at once without calling the gateway.
    pub async fn commit_all(&self) -> SessionResult<CommitReport> {
        let (snapshot, epoch) = {
            let mut state = self.state();
            if !state.editing {
                return Err(SessionError::NotEditing);
            }
            if state.pending.is_empty() {
                debug!(session = %self.id, "nothing to commit");
                return Ok(CommitReport::nothing_to_commit());
            }
            if state.in_flight == Some(state.epoch) {
                return Err(SessionError::CommitInFlight);
            }
            state.in_flight = Some(state.epoch);
            (Arc::clone(&state.pending), state.epoch)
        };
        let in_flight = InFlightCommit {
            session: self,
            epoch,
            finished: false,
        };

        let entries = snapshot.to_changes();
        let total = entries.len();
        info!(session = %self.id, entries = total, "committing pending changes");

        let outcome = match tokio::time::timeout(
            self.config.commit_timeout(),
            self.gateway.upsert_content_batch(&entries),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Timeout),
        };

        let result = match outcome {
            Ok(batch) => {
                // Acknowledged writes changed the store even if others failed.
                for page in batch.acknowledged_pages() {
                    self.store.invalidate(&page);
                }
                let failures = batch.failures(&entries);
                if failures.is_empty() {
                    Ok(())
                } else {
                    Err(SessionError::CommitRejected { failures, total })
                }
            }
            Err(e) => Err(SessionError::from(e)),
        };

        let mut state = self.state();
        in_flight.finish(&mut state);
        let current = state.epoch == epoch;

        match result {
            Ok(()) => {
                if current {
                    let drained = Arc::make_mut(&mut state.pending).drain_committed(&snapshot);
                    state.last_failure = None;
                    info!(
                        session = %self.id,
                        committed = total,
                        drained,
                        remaining = state.pending.len(),
                        "commit succeeded"
                    );
                } else {
                    info!(session = %self.id, committed = total, "commit finished after leaving edit mode");
                }
                Ok(CommitReport {
                    committed: total,
                    pages: snapshot.pages().into_iter().collect(),
                    committed_at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(session = %self.id, "commit failed, pending changes kept: {e}");
                if current {
                    state.last_failure = Some(CommitFailure::from_error(&e));
                }
                Err(e)
            }
        }
    }
}
