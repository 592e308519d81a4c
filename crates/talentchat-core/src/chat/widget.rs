//! ChatWidget: one visitor's chat session, independent of any UI toolkit.
//!
//! Owns the intake gate, the conversation engine, and the session's
//! transcript persister. Front ends (terminal, HTTP) call the explicit
//! operations here instead of wiring UI callbacks to shared state.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use talentchat_types::chat::{Message, SessionHandle, VisitorProfile};
use talentchat_types::config::Locale;
use talentchat_types::error::{ChatError, FieldError, IntakeError};

use crate::chat::engine::ConversationEngine;
use crate::chat::persister::{PersistOutcome, TranscriptPersister};
use crate::inference::InferenceClient;
use crate::intake::IntakeGate;

/// Most recent settled write outcomes kept between flushes.
pub const SETTLED_CAPACITY: usize = 32;

/// What a call to [`ChatWidget::send_message`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing sent, nothing appended.
    Ignored,
    /// The endpoint answered; this reply was appended.
    Replied(Message),
    /// The call failed; the canned error reply was appended.
    Failed(Message),
}

impl SendOutcome {
    /// The appended assistant message, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            SendOutcome::Ignored => None,
            SendOutcome::Replied(m) | SendOutcome::Failed(m) => Some(m),
        }
    }
}

/// Inline error for one intake field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorView {
    pub field: &'static str,
    pub code: FieldError,
    pub message: &'static str,
}

/// Serializable view of a widget, used by the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSnapshot {
    pub id: Uuid,
    pub unlocked: bool,
    pub awaiting_reply: bool,
    pub show_errors: bool,
    pub errors: Vec<FieldErrorView>,
    pub draft: VisitorProfile,
    pub visitor: Option<VisitorProfile>,
    pub messages: Vec<Message>,
    pub transcript_id: Option<SessionHandle>,
}

/// A single chat session: intake gate, conversation, transcript mirror.
pub struct ChatWidget<C: InferenceClient + 'static> {
    id: Uuid,
    locale: Locale,
    gate: IntakeGate,
    engine: ConversationEngine,
    client: Arc<C>,
    persister: Arc<TranscriptPersister>,
    /// In-flight transcript writes.
    pending: JoinSet<PersistOutcome>,
    /// Writes that finished but have not been collected by `flush_persistence`,
    /// newest last, capped at [`SETTLED_CAPACITY`].
    settled: VecDeque<PersistOutcome>,
}

impl<C: InferenceClient + 'static> ChatWidget<C> {
    pub fn new(client: Arc<C>, persister: TranscriptPersister, locale: Locale) -> Self {
        Self {
            id: Uuid::now_v7(),
            locale,
            gate: IntakeGate::new(),
            engine: ConversationEngine::new(),
            client,
            persister: Arc::new(persister),
            pending: JoinSet::new(),
            settled: VecDeque::new(),
        }
    }

    /// Local session id (distinct from the backend transcript handle).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn messages(&self) -> &[Message] {
        self.engine.messages()
    }

    pub fn is_unlocked(&self) -> bool {
        !self.gate.is_open()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.engine.is_awaiting_reply()
    }

    pub fn visitor(&self) -> Option<&VisitorProfile> {
        self.gate.visitor()
    }

    pub fn show_errors(&self) -> bool {
        self.gate.show_errors()
    }

    /// Intake fields as currently edited.
    pub fn draft(&self) -> &VisitorProfile {
        self.gate.draft()
    }

    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.gate.visible_errors()
    }

    pub fn session_handle(&self) -> Option<SessionHandle> {
        self.persister.handle()
    }

    /// Whether a transcript store backs this session.
    pub fn persistence_enabled(&self) -> bool {
        self.persister.is_enabled()
    }

    // --- Intake ---

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.gate.set_name(name);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.gate.set_email(email);
    }

    /// Submit the intake draft. On success the conversation is unlocked and
    /// seeded with the greeting, which is returned.
    pub fn submit_intake(&mut self) -> Result<&Message, IntakeError> {
        let profile = match self.gate.submit() {
            Ok(profile) => profile,
            Err(e) => {
                debug!(session_id = %self.id, error = %e, "Intake rejected");
                return Err(e);
            }
        };

        self.engine.seed_greeting(self.locale.greeting(&profile.name));
        info!(session_id = %self.id, "Intake accepted, chat unlocked");
        self.engine
            .messages()
            .last()
            .ok_or(IntakeError::AlreadyUnlocked)
    }

    // --- Conversation ---

    /// Run one round-trip for `text`.
    ///
    /// The user message is appended before the request goes out; exactly one
    /// assistant message follows, the reply or the canned error. The full
    /// history is then handed to the persister in the background.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome, ChatError> {
        let Some(visitor) = self.gate.visitor().cloned() else {
            return Err(ChatError::Locked);
        };
        let Some(request) = self.engine.begin_send(text)? else {
            return Ok(SendOutcome::Ignored);
        };

        let start = Instant::now();
        let result = self.client.reply(&request).await.map(|r| r.reply);
        let succeeded = result.is_ok();

        let Some(reply) = self.engine.complete(result, self.locale).cloned() else {
            // begin_send left the engine awaiting; complete always appends.
            return Ok(SendOutcome::Ignored);
        };
        debug!(
            session_id = %self.id,
            backend = self.client.name(),
            succeeded,
            elapsed_ms = start.elapsed().as_millis() as u64,
            messages = self.engine.messages().len(),
            "Round-trip settled"
        );

        self.spawn_persist(visitor);

        Ok(if succeeded {
            SendOutcome::Replied(reply)
        } else {
            SendOutcome::Failed(reply)
        })
    }

    fn spawn_persist(&mut self, visitor: VisitorProfile) {
        self.reap_settled();

        let persister = Arc::clone(&self.persister);
        let history = self.engine.messages().to_vec();
        self.pending
            .spawn(async move { persister.persist(&visitor, &history).await });
    }

    fn reap_settled(&mut self) {
        while let Some(joined) = self.pending.try_join_next() {
            self.record_settled(joined);
        }
    }

    fn record_settled(&mut self, joined: Result<PersistOutcome, tokio::task::JoinError>) {
        match joined {
            Ok(outcome) => {
                if self.settled.len() == SETTLED_CAPACITY {
                    self.settled.pop_front();
                }
                self.settled.push_back(outcome);
            }
            Err(e) => warn!(session_id = %self.id, error = %e, "Persistence task aborted"),
        }
    }

    /// Number of transcript writes still in flight.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Wait for every outstanding transcript write and return the outcomes
    /// not yet collected, oldest first. Only the last [`SETTLED_CAPACITY`]
    /// are kept.
    pub async fn flush_persistence(&mut self) -> Vec<PersistOutcome> {
        while let Some(joined) = self.pending.join_next().await {
            self.record_settled(joined);
        }
        self.settled.drain(..).collect()
    }

    /// Serializable view of the current state. Never waits on persistence.
    pub fn snapshot(&self) -> WidgetSnapshot {
        let errors = self
            .gate
            .visible_errors()
            .into_iter()
            .map(|code| FieldErrorView {
                field: code.field(),
                code,
                message: code.message(self.locale),
            })
            .collect();

        WidgetSnapshot {
            id: self.id,
            unlocked: self.is_unlocked(),
            awaiting_reply: self.is_awaiting_reply(),
            show_errors: self.gate.show_errors(),
            errors,
            draft: self.gate.draft().clone(),
            visitor: self.gate.visitor().cloned(),
            messages: self.engine.messages().to_vec(),
            transcript_id: self.persister.handle(),
        }
    }
}
