//! Shared domain types for Talentchat.
//!
//! This crate contains the domain types used across the workspace:
//! messages, visitor profiles, transcript records, inference payloads,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod inference;
