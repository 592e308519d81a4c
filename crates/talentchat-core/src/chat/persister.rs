//! Transcript persister: mirrors the conversation into the transcript store.
//!
//! The first write creates the record and captures the backend-assigned
//! [`SessionHandle`]; every later write updates that record. Failures are
//! logged and reported as [`PersistOutcome::Failed`], never propagated.
//!
//! Writes run under a per-session async mutex, so overlapping calls cannot
//! both create. History is append-only, which makes its length a revision
//! number: a snapshot no longer than the last one written is dropped as
//! stale instead of overwriting newer data.
//!
//! The handle itself lives in a set-once cell outside that mutex, so readers
//! never wait on a write that is still talking to the store.

use std::sync::{Arc, OnceLock};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use talentchat_types::chat::{Message, NewChatRecord, SessionHandle, VisitorProfile};

use crate::chat::repository::BoxTranscriptRepository;

/// Result of a single persist call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// No backend configured; nothing written.
    Disabled,
    /// First write; the record now exists under this handle.
    Created(SessionHandle),
    /// Existing record replaced with the newer history.
    Updated,
    /// A newer (or equal) snapshot was already written.
    Stale,
    /// Backend error, already logged.
    Failed(String),
}

/// Per-session transcript writer.
pub struct TranscriptPersister {
    repo: Option<Arc<BoxTranscriptRepository>>,
    /// Set once, by the first successful create.
    handle: OnceLock<SessionHandle>,
    /// Length of the last successfully written history.
    revision: Mutex<usize>,
}

impl TranscriptPersister {
    pub fn new(repo: Arc<BoxTranscriptRepository>) -> Self {
        Self {
            repo: Some(repo),
            handle: OnceLock::new(),
            revision: Mutex::new(0),
        }
    }

    /// Persister for an unconfigured backend: every call is a no-op.
    pub fn disabled() -> Self {
        Self {
            repo: None,
            handle: OnceLock::new(),
            revision: Mutex::new(0),
        }
    }

    /// Build from an optional shared repository.
    pub fn from_repo(repo: Option<Arc<BoxTranscriptRepository>>) -> Self {
        match repo {
            Some(repo) => Self::new(repo),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.repo.is_some()
    }

    /// Handle assigned by the backend, once the first create succeeded.
    ///
    /// Never blocks, even while a write is in flight.
    pub fn handle(&self) -> Option<SessionHandle> {
        self.handle.get().cloned()
    }

    /// Write `history` for `visitor`, creating or updating as needed.
    pub async fn persist(&self, visitor: &VisitorProfile, history: &[Message]) -> PersistOutcome {
        let Some(repo) = &self.repo else {
            return PersistOutcome::Disabled;
        };

        let mut revision = self.revision.lock().await;

        if self.handle.get().is_some() && history.len() <= *revision {
            debug!(
                messages = history.len(),
                revision = *revision,
                "Skipping stale transcript snapshot"
            );
            return PersistOutcome::Stale;
        }

        match self.handle.get().cloned() {
            None => {
                let record = NewChatRecord::new(visitor, history, Utc::now());
                match repo.create(&record).await {
                    Ok(handle) => {
                        info!(
                            backend = repo.name(),
                            handle = %handle,
                            messages = history.len(),
                            "Transcript created"
                        );
                        // Only the revision holder writes the cell, so it is still empty.
                        let _ = self.handle.set(handle.clone());
                        *revision = history.len();
                        PersistOutcome::Created(handle)
                    }
                    Err(e) => {
                        warn!(backend = repo.name(), error = %e, "Error saving chat");
                        PersistOutcome::Failed(e.to_string())
                    }
                }
            }
            Some(handle) => match repo.update(&handle, history).await {
                Ok(()) => {
                    debug!(
                        backend = repo.name(),
                        handle = %handle,
                        messages = history.len(),
                        "Transcript updated"
                    );
                    *revision = history.len();
                    PersistOutcome::Updated
                }
                Err(e) => {
                    warn!(backend = repo.name(), handle = %handle, error = %e, "Error saving chat");
                    PersistOutcome::Failed(e.to_string())
                }
            },
        }
    }
}
