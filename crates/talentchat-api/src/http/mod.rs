//! HTTP/REST API layer for Talentchat.
//!
//! Axum-based REST API at `/api/v1/` exposing chat sessions, with envelope
//! response format and CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
