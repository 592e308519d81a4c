//! Conversation engine: ordered history plus the idle/awaiting-reply machine.
//!
//! The engine does no I/O. `begin_send` produces the request to send and
//! `complete` consumes its outcome, so callers decide how the network call
//! is made and tests can drive every transition directly.

use talentchat_types::chat::Message;
use talentchat_types::config::Locale;
use talentchat_types::error::ChatError;
use talentchat_types::inference::{InferenceError, InferenceRequest};
use tracing::warn;

/// Round-trip state of the conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EngineState {
    #[default]
    Idle,
    AwaitingReply,
}

/// Append-only message history with single in-flight request.
#[derive(Debug, Default)]
pub struct ConversationEngine {
    history: Vec<Message>,
    state: EngineState,
}

impl ConversationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.state == EngineState::AwaitingReply
    }

    /// Append the assistant greeting that opens the conversation.
    pub fn seed_greeting(&mut self, greeting: String) {
        self.history.push(Message::assistant(greeting));
    }

    /// Start a round-trip for `text`.
    ///
    /// Blank input is ignored (`Ok(None)`): no history change, no request.
    /// Otherwise the user message is appended immediately and the request
    /// carries the history as it was before that append.
    pub fn begin_send(&mut self, text: &str) -> Result<Option<InferenceRequest>, ChatError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.is_awaiting_reply() {
            return Err(ChatError::ReplyPending);
        }

        let request = InferenceRequest {
            message: text.to_string(),
            prev_messages: self.history.clone(),
        };
        self.history.push(Message::user(text));
        self.state = EngineState::AwaitingReply;
        Ok(Some(request))
    }

    /// Settle the pending round-trip and return to idle.
    ///
    /// A failed call becomes the locale's canned error reply. Returns the
    /// appended assistant message, or `None` when nothing was pending.
    pub fn complete(
        &mut self,
        outcome: Result<String, InferenceError>,
        locale: Locale,
    ) -> Option<&Message> {
        if !self.is_awaiting_reply() {
            return None;
        }

        let text = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Inference request failed, replying with canned error");
                locale.error_reply().to_string()
            }
        };
        self.history.push(Message::assistant(text));
        self.state = EngineState::Idle;
        self.history.last()
    }
}
