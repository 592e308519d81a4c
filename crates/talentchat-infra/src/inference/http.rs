//! HttpInferenceClient -- [`InferenceClient`] over a single JSON endpoint.
//!
//! Each visitor message is one `POST <endpoint_url>` carrying
//! `{message, prevMessages}`; a 2xx response with a `reply` field is the
//! answer. No timeout and no retry: a hung endpoint keeps the session
//! awaiting until it answers or the connection drops.
//!
//! The API key is a [`SecretString`], exposed only when building the
//! `x-api-key` header.

use secrecy::{ExposeSecret, SecretString};

use talentchat_core::inference::InferenceClient;
use talentchat_types::inference::{InferenceError, InferenceRequest, InferenceResponse};

/// Client for the candidate-answering inference endpoint.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: SecretString,
}

// No Debug derive: keeps the key out of any accidental formatting.

impl HttpInferenceClient {
    pub fn new(endpoint_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint_url: endpoint_url.into(),
            api_key,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }
}

impl InferenceClient for HttpInferenceClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn reply(&self, request: &InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        if self.endpoint_url.trim().is_empty() {
            return Err(InferenceError::Transport(
                "inference endpoint URL is not configured".to_string(),
            ));
        }

        tracing::debug!(
            url = %self.endpoint_url,
            history = request.prev_messages.len(),
            "Sending inference request"
        );

        let response = self
            .client
            .post(&self.endpoint_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| InferenceError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<InferenceResponse>()
            .await
            .map_err(|e| InferenceError::Deserialization(format!("failed to parse response: {e}")))
    }
}
