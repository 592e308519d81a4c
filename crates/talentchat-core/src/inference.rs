//! InferenceClient trait definition.
//!
//! The remote endpoint that answers on the candidate's behalf. Uses native
//! async fn in traits (RPITIT, Rust 2024 edition); implementations live in
//! talentchat-infra (e.g., `HttpInferenceClient`).

use talentchat_types::inference::{InferenceError, InferenceRequest, InferenceResponse};

/// Trait for inference backends.
pub trait InferenceClient: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Send one visitor message plus prior history and wait for the reply.
    fn reply(
        &self,
        request: &InferenceRequest,
    ) -> impl std::future::Future<Output = Result<InferenceResponse, InferenceError>> + Send;
}
