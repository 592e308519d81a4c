//! Application state shared by the CLI commands and the REST API.
//!
//! AppState pins the generic core types to the concrete infra
//! implementations: the HTTP inference client and whichever transcript
//! backend the configuration selects.

use std::path::PathBuf;
use std::sync::Arc;

use talentchat_core::chat::registry::SessionRegistry;
use talentchat_core::chat::repository::BoxTranscriptRepository;
use talentchat_infra::config::{
    Secrets, apply_env_overrides, create_transcript_repository, load_secrets, load_widget_config,
    process_env, resolve_data_dir,
};
use talentchat_infra::inference::HttpInferenceClient;
use talentchat_types::config::WidgetConfig;

pub type ConcreteRegistry = SessionRegistry<HttpInferenceClient>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WidgetConfig>,
    pub secrets: Secrets,
    pub data_dir: PathBuf,
    pub client: Arc<HttpInferenceClient>,
    pub transcripts: Option<Arc<BoxTranscriptRepository>>,
    pub sessions: Arc<ConcreteRegistry>,
}

impl AppState {
    /// Load configuration and secrets, then wire the backends.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = apply_env_overrides(load_widget_config(&data_dir).await, process_env);
        let secrets = load_secrets(process_env);

        if config.inference.endpoint_url.is_empty() {
            tracing::warn!("No inference endpoint configured; every question will get the error reply");
        }

        let client = Arc::new(HttpInferenceClient::new(
            config.inference.endpoint_url.clone(),
            secrets.api_key.clone(),
        ));
        if !client.endpoint_url().is_empty() && !client.has_api_key() {
            tracing::warn!("TALENTCHAT_API_KEY is not set; the endpoint receives an empty x-api-key header");
        }
        let transcripts = create_transcript_repository(&config, &secrets, &data_dir).await;

        Ok(Self::from_parts(config, secrets, data_dir, client, transcripts))
    }

    pub fn from_parts(
        config: WidgetConfig,
        secrets: Secrets,
        data_dir: PathBuf,
        client: Arc<HttpInferenceClient>,
        transcripts: Option<Arc<BoxTranscriptRepository>>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new(
            Arc::clone(&client),
            transcripts.clone(),
            config.locale,
        ));
        Self {
            config: Arc::new(config),
            secrets,
            data_dir,
            client,
            transcripts,
            sessions,
        }
    }
}
