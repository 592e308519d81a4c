//! Business logic and port traits for Talentchat.
//!
//! This crate defines the "ports" (`InferenceClient`, `TranscriptRepository`)
//! that the infrastructure layer implements. It depends only on
//! `talentchat-types` -- never on `talentchat-infra` or any HTTP/database crate.

pub mod chat;
pub mod inference;
pub mod intake;
