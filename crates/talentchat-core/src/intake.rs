//! Intake gate: collects and validates the visitor's identity.
//!
//! The gate stays open (conversation locked) until a profile with a
//! non-empty name and a well-formed email is submitted. A rejected submit
//! only raises the error-display flag; it never panics or locks anything.

use std::sync::LazyLock;

use regex::Regex;

use talentchat_types::chat::VisitorProfile;
use talentchat_types::error::{FieldError, IntakeError};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Basic `local@domain.tld` check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Collect every field error for `profile`, in display order.
pub fn validate_profile(profile: &VisitorProfile) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if profile.name.is_empty() {
        errors.push(FieldError::NameRequired);
    }
    if profile.email.is_empty() {
        errors.push(FieldError::EmailRequired);
    } else if !is_valid_email(&profile.email) {
        errors.push(FieldError::EmailInvalid);
    }
    errors
}

/// Identity-collection step preceding chat access.
#[derive(Debug, Default)]
pub struct IntakeGate {
    draft: VisitorProfile,
    show_errors: bool,
    /// Frozen profile once the gate has closed.
    visitor: Option<VisitorProfile>,
}

impl IntakeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the gate is still blocking the conversation.
    pub fn is_open(&self) -> bool {
        self.visitor.is_none()
    }

    /// The accepted visitor, once the gate has closed.
    pub fn visitor(&self) -> Option<&VisitorProfile> {
        self.visitor.as_ref()
    }

    pub fn draft(&self) -> &VisitorProfile {
        &self.draft
    }

    pub fn show_errors(&self) -> bool {
        self.show_errors
    }

    /// Edit the draft name. Editing hides previously shown errors.
    pub fn set_name(&mut self, name: impl Into<String>) {
        if self.is_open() {
            self.draft.name = name.into();
            self.show_errors = false;
        }
    }

    /// Edit the draft email. Editing hides previously shown errors.
    pub fn set_email(&mut self, email: impl Into<String>) {
        if self.is_open() {
            self.draft.email = email.into();
            self.show_errors = false;
        }
    }

    /// Errors to display inline, empty unless the last submit was rejected.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        if self.show_errors {
            validate_profile(&self.draft)
        } else {
            Vec::new()
        }
    }

    /// Try to close the gate with the current draft.
    ///
    /// On success the profile is frozen and returned; there is no way to
    /// reopen the gate on this instance afterwards.
    pub fn submit(&mut self) -> Result<VisitorProfile, IntakeError> {
        if !self.is_open() {
            return Err(IntakeError::AlreadyUnlocked);
        }

        let errors = validate_profile(&self.draft);
        if !errors.is_empty() {
            self.show_errors = true;
            return Err(IntakeError::Rejected(errors));
        }

        self.show_errors = false;
        let profile = self.draft.clone();
        self.visitor = Some(profile.clone());
        Ok(profile)
    }
}
