use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Locale;

/// A single intake field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldError {
    NameRequired,
    EmailRequired,
    EmailInvalid,
}

impl FieldError {
    /// Machine-readable code, e.g. `EMAIL_INVALID`.
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::NameRequired => "NAME_REQUIRED",
            FieldError::EmailRequired => "EMAIL_REQUIRED",
            FieldError::EmailInvalid => "EMAIL_INVALID",
        }
    }

    /// Field the error belongs to (`"name"` or `"email"`).
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::NameRequired => "name",
            FieldError::EmailRequired | FieldError::EmailInvalid => "email",
        }
    }

    /// Inline message shown next to the field.
    pub fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (FieldError::NameRequired, Locale::Es) => "El nombre es obligatorio",
            (FieldError::EmailRequired, Locale::Es) => "El correo electrónico es obligatorio",
            (FieldError::EmailInvalid, Locale::Es) => {
                "Por favor, ingresa un correo electrónico válido"
            }
            (FieldError::NameRequired, Locale::En) => "Name is required",
            (FieldError::EmailRequired, Locale::En) => "Email is required",
            (FieldError::EmailInvalid, Locale::En) => "Please enter a valid email address",
        }
    }
}

/// Errors returned by the intake gate.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("visitor profile rejected: {0:?}")]
    Rejected(Vec<FieldError>),

    #[error("chat is already unlocked")]
    AlreadyUnlocked,
}

/// Errors returned when sending a chat message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("chat is locked until the visitor completes intake")]
    Locked,

    #[error("a reply is already pending")]
    ReplyPending,
}

/// Errors from transcript repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
