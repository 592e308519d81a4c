//! Request/response shapes for the remote inference endpoint.

use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Body of the single POST sent for each visitor message.
///
/// `prev_messages` is the history *before* `message` was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub message: String,
    #[serde(rename = "prevMessages")]
    pub prev_messages: Vec<Message>,
}

/// Expected response body: `{"reply": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResponse {
    pub reply: String,
}

/// Errors from an inference round-trip.
///
/// None of these ever reach the visitor; the conversation engine turns
/// every variant into the canned error reply.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case_history_key() {
        let request = InferenceRequest {
            message: "What is your experience?".to_string(),
            prev_messages: vec![Message::assistant("¡Hola Ana!")],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "What is your experience?");
        assert_eq!(json["prevMessages"][0]["role"], "assistant");
        assert!(json.get("prev_messages").is_none());
    }

    #[test]
    fn test_response_requires_reply() {
        let ok: InferenceResponse = serde_json::from_str(r#"{"reply":"5 years"}"#).unwrap();
        assert_eq!(ok.reply, "5 years");
        assert!(serde_json::from_str::<InferenceResponse>(r#"{"answer":"x"}"#).is_err());
    }
}
