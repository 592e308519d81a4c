//! Inference client implementations.
//!
//! Contains the concrete [`InferenceClient`](talentchat_core::inference::InferenceClient)
//! used by the widget: a plain JSON-over-HTTP endpoint.

pub mod http;

pub use http::HttpInferenceClient;
