//! Infrastructure layer for Talentchat.
//!
//! Contains implementations of the port traits defined in `talentchat-core`:
//! the HTTP inference client, the PostgREST and SQLite transcript stores,
//! and configuration loading.

pub mod config;
pub mod inference;
pub mod rest;
pub mod sqlite;
