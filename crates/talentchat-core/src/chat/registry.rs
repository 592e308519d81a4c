//! Concurrent registry of live chat widgets, keyed by widget id.
//!
//! Each widget sits behind its own async mutex so one session's round-trip
//! never blocks another. Entries are cloned `Arc`s; no `DashMap` guard is
//! held across an `.await`.
//!
//! Every lookup refreshes the session's last-activity time. Sessions idle
//! longer than a limit are swept out, and on shutdown the registry is
//! drained; both flush the session's pending transcript writes first.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use talentchat_types::config::Locale;

use crate::chat::persister::TranscriptPersister;
use crate::chat::repository::BoxTranscriptRepository;
use crate::chat::widget::ChatWidget;
use crate::inference::InferenceClient;

pub type SharedWidget<C> = Arc<Mutex<ChatWidget<C>>>;

struct SessionEntry<C: InferenceClient + 'static> {
    widget: SharedWidget<C>,
    last_active: Instant,
}

/// Live sessions sharing one inference client and one transcript backend.
pub struct SessionRegistry<C: InferenceClient + 'static> {
    sessions: DashMap<Uuid, SessionEntry<C>>,
    client: Arc<C>,
    repo: Option<Arc<BoxTranscriptRepository>>,
    locale: Locale,
}

impl<C: InferenceClient + 'static> SessionRegistry<C> {
    pub fn new(client: Arc<C>, repo: Option<Arc<BoxTranscriptRepository>>, locale: Locale) -> Self {
        Self {
            sessions: DashMap::new(),
            client,
            repo,
            locale,
        }
    }

    /// Open a fresh locked session. `locale` overrides the default.
    pub fn open(&self, locale: Option<Locale>) -> (Uuid, SharedWidget<C>) {
        let persister = TranscriptPersister::from_repo(self.repo.clone());
        let widget = ChatWidget::new(
            Arc::clone(&self.client),
            persister,
            locale.unwrap_or(self.locale),
        );
        let id = widget.id();
        let shared = Arc::new(Mutex::new(widget));
        self.sessions.insert(
            id,
            SessionEntry {
                widget: Arc::clone(&shared),
                last_active: Instant::now(),
            },
        );
        debug!(session_id = %id, "Session opened");
        (id, shared)
    }

    /// Look up a session and mark it active.
    pub fn get(&self, id: &Uuid) -> Option<SharedWidget<C>> {
        self.sessions.get_mut(id).map(|mut entry| {
            entry.last_active = Instant::now();
            Arc::clone(&entry.widget)
        })
    }

    /// Drop a session from the registry. In-flight work on a clone finishes.
    pub fn close(&self, id: &Uuid) -> Option<SharedWidget<C>> {
        let removed = self.sessions.remove(id).map(|(_, entry)| entry.widget);
        if removed.is_some() {
            debug!(session_id = %id, "Session closed");
        }
        removed
    }

    /// Close every session untouched for longer than `max_idle`, flushing
    /// its pending writes. Returns how many sessions were closed.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let idle: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| now.duration_since(entry.last_active) > max_idle)
            .map(|entry| *entry.key())
            .collect();

        let mut closed = 0;
        for id in idle {
            // Re-check under the shard lock: a lookup may have touched it since.
            let Some((_, entry)) = self
                .sessions
                .remove_if(&id, |_, entry| now.duration_since(entry.last_active) > max_idle)
            else {
                continue;
            };
            let flushed = entry.widget.lock().await.flush_persistence().await;
            debug!(session_id = %id, flushed = flushed.len(), "Idle session expired");
            closed += 1;
        }
        if closed > 0 {
            info!(closed, remaining = self.sessions.len(), "Expired idle sessions");
        }
        closed
    }

    /// Close every session, flushing pending writes. Used on shutdown.
    pub async fn drain(&self) -> usize {
        let ids: Vec<Uuid> = self.sessions.iter().map(|entry| *entry.key()).collect();
        let mut drained = 0;
        for id in ids {
            if let Some(widget) = self.close(&id) {
                widget.lock().await.flush_persistence().await;
                drained += 1;
            }
        }
        drained
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn persistence_enabled(&self) -> bool {
        self.repo.is_some()
    }
}
