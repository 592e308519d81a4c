//! PostgREST (Supabase-compatible) transcript store.
//!
//! Talks to `{base}/rest/v1/{table}` with the project key sent both as
//! `apikey` and as a bearer token, the way Supabase's REST gateway expects.

use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use talentchat_core::chat::repository::TranscriptRepository;
use talentchat_types::chat::{ChatRecord, Message, NewChatRecord, SessionHandle};
use talentchat_types::error::RepositoryError;

/// Transcript repository backed by a PostgREST table.
pub struct RestTranscriptRepository {
    client: reqwest::Client,
    base_url: String,
    table: String,
    api_key: SecretString,
}

/// Only the id is read back from a `return=representation` insert.
#[derive(Deserialize)]
struct InsertedRow {
    id: SessionHandle,
}

impl RestTranscriptRepository {
    pub fn new(base_url: impl Into<String>, table: impl Into<String>, api_key: SecretString) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.into(),
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, self.table_url())
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
    }

    async fn check(response: Response) -> Result<Response, RepositoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RepositoryError::Unavailable(format!("HTTP {status}: {body}"))
            }
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::CONFLICT => RepositoryError::Conflict(body),
            _ => RepositoryError::Query(format!("HTTP {status}: {body}")),
        })
    }
}

fn transport_error(e: reqwest::Error) -> RepositoryError {
    tracing::debug!(error = %e, "Transcript store request failed");
    RepositoryError::Connection
}

impl TranscriptRepository for RestTranscriptRepository {
    fn name(&self) -> &str {
        "rest"
    }

    async fn create(&self, record: &NewChatRecord) -> Result<SessionHandle, RepositoryError> {
        let response = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await
            .map_err(transport_error)?;

        let rows: Vec<InsertedRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid insert response: {e}")))?;

        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| RepositoryError::Query("insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        handle: &SessionHandle,
        conversation: &[Message],
    ) -> Result<(), RepositoryError> {
        let response = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", format!("eq.{handle}"))])
            .json(&json!({ "conversation": conversation }))
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn get(&self, handle: &SessionHandle) -> Result<Option<ChatRecord>, RepositoryError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("id", format!("eq.{handle}")), ("select", "*".to_string())])
            .send()
            .await
            .map_err(transport_error)?;

        let rows: Vec<ChatRecord> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RepositoryError::Query(format!("invalid select response: {e}")))?;
        Ok(rows.into_iter().next())
    }
}
