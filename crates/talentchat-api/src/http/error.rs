//! Application error type mapping to HTTP status codes and envelope format.

use std::time::Instant;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use talentchat_core::chat::widget::FieldErrorView;
use talentchat_types::error::ChatError;

use crate::http::response::{ApiErrorDetail, ApiResponse};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Conversation refused the send.
    Chat(ChatError),
    /// Intake submission failed validation.
    Intake(Vec<FieldErrorView>),
    /// Intake already submitted for this session.
    AlreadyUnlocked,
    /// Unknown session id.
    SessionNotFound(String),
    /// Malformed request.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

fn detail(code: &str, message: impl Into<String>) -> ApiErrorDetail {
    ApiErrorDetail {
        code: code.to_string(),
        message: message.into(),
        field: None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            AppError::Chat(ChatError::Locked) => (
                StatusCode::FORBIDDEN,
                vec![detail("CHAT_LOCKED", "Complete the intake form before chatting")],
            ),
            AppError::Chat(ChatError::ReplyPending) => (
                StatusCode::CONFLICT,
                vec![detail("REPLY_PENDING", "A reply is still pending for this session")],
            ),
            AppError::Intake(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                fields
                    .into_iter()
                    .map(|f| ApiErrorDetail {
                        code: f.code.code().to_string(),
                        message: f.message.to_string(),
                        field: Some(f.field.to_string()),
                    })
                    .collect(),
            ),
            AppError::AlreadyUnlocked => (
                StatusCode::CONFLICT,
                vec![detail("ALREADY_UNLOCKED", "Intake was already submitted")],
            ),
            AppError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                vec![detail("SESSION_NOT_FOUND", format!("Session '{id}' not found"))],
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, vec![detail("VALIDATION_ERROR", msg)]),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![detail("INTERNAL_ERROR", msg)],
            ),
        };

        // Handlers time their own responses; errors report zero.
        let body = ApiResponse::failure(errors, Instant::now());
        (status, Json(body)).into_response()
    }
}
