//! Conversation, visitor, and transcript record types for Talentchat.
//!
//! These types model one recruiter conversation: the ordered message
//! history, the visitor who unlocked it, and the stored transcript row
//! that mirrors it in the persistence backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;
use std::str::FromStr;

/// Author of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single entry of the conversation history.
///
/// Serializes as `{"role": "...", "text": "..."}`, the shape both the
/// inference endpoint and the transcript store expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }
}

/// Identity the visitor gives at the intake gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorProfile {
    pub name: String,
    pub email: String,
}

impl VisitorProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Backend-assigned identifier of a persisted transcript.
///
/// Opaque to Talentchat. Row stores hand out either integer or string
/// keys, so both JSON forms deserialize into the same handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionHandle(pub String);

impl SessionHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionHandle {
    fn from(s: String) -> Self {
        SessionHandle(s)
    }
}

impl From<&str> for SessionHandle {
    fn from(s: &str) -> Self {
        SessionHandle(s.to_string())
    }
}

impl<'de> Deserialize<'de> for SessionHandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawHandle {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawHandle::deserialize(deserializer)? {
            RawHandle::Text(s) => SessionHandle(s),
            RawHandle::Signed(n) => SessionHandle(n.to_string()),
            RawHandle::Unsigned(n) => SessionHandle(n.to_string()),
        })
    }
}

/// Payload for the first write of a transcript (insert-one-returning-id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatRecord {
    pub user_name: String,
    pub user_email: String,
    pub conversation: Vec<Message>,
    pub created_at: DateTime<Utc>,
}

impl NewChatRecord {
    /// Build a create payload for `visitor` holding the full `history`.
    pub fn new(visitor: &VisitorProfile, history: &[Message], created_at: DateTime<Utc>) -> Self {
        Self {
            user_name: visitor.name.clone(),
            user_email: visitor.email.clone(),
            conversation: history.to_vec(),
            created_at,
        }
    }
}

/// A stored transcript row from the `chats` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: SessionHandle,
    pub user_name: String,
    pub user_email: String,
    pub conversation: Vec<Message>,
    pub created_at: DateTime<Utc>,
}
