//! Configuration loading for Talentchat.
//!
//! Reads `config.toml` from the data directory (`~/.talentchat/` by default),
//! layers `TALENTCHAT_*` environment overrides on top, and builds the
//! transcript backend the configuration selects. Nothing here aborts
//! startup: missing or broken inputs degrade to defaults with a log line.
//!
//! Environment access goes through a `lookup` closure so tests never touch
//! the process environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::SecretString;

use talentchat_core::chat::repository::BoxTranscriptRepository;
use talentchat_types::config::{Locale, PersistenceBackend, WidgetConfig};

use crate::rest::RestTranscriptRepository;
use crate::sqlite::chat::SqliteTranscriptRepository;
use crate::sqlite::pool::{DatabasePool, database_url};

pub const ENV_DATA_DIR: &str = "TALENTCHAT_DATA_DIR";
pub const ENV_API_URL: &str = "TALENTCHAT_API_URL";
pub const ENV_API_KEY: &str = "TALENTCHAT_API_KEY";
pub const ENV_LOCALE: &str = "TALENTCHAT_LOCALE";
pub const ENV_STORE_URL: &str = "TALENTCHAT_STORE_URL";
pub const ENV_STORE_KEY: &str = "TALENTCHAT_STORE_KEY";

/// Read a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Credentials read once at startup.
#[derive(Debug, Clone)]
pub struct Secrets {
    /// Inference endpoint key; empty when unset.
    pub api_key: SecretString,
    /// Transcript store key (the `rest` backend).
    pub store_key: Option<SecretString>,
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `TALENTCHAT_DATA_DIR`
/// 2. `~/.talentchat`
/// 3. `.talentchat` in the working directory
pub fn resolve_data_dir() -> PathBuf {
    resolve_data_dir_with(process_env)
}

pub fn resolve_data_dir_with(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".talentchat");
    }

    PathBuf::from(".talentchat")
}

/// Load `{data_dir}/config.toml`, falling back to defaults when the file is
/// missing or malformed.
pub async fn load_widget_config(data_dir: &Path) -> WidgetConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return WidgetConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return WidgetConfig::default();
        }
    };

    match toml::from_str::<WidgetConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            WidgetConfig::default()
        }
    }
}

/// Apply `TALENTCHAT_*` overrides. Empty values are ignored.
pub fn apply_env_overrides(
    mut config: WidgetConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> WidgetConfig {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_API_URL) {
        config.inference.endpoint_url = url;
    }

    if let Some(locale) = get(ENV_LOCALE) {
        match locale.parse::<Locale>() {
            Ok(locale) => config.locale = locale,
            Err(e) => tracing::warn!("Ignoring {ENV_LOCALE}: {e}"),
        }
    }

    if let Some(url) = get(ENV_STORE_URL) {
        config.persistence.rest_url = Some(url);
        if config.persistence.backend == PersistenceBackend::None {
            config.persistence.backend = PersistenceBackend::Rest;
        }
    }

    config
}

/// Read credentials. Missing values never fail.
pub fn load_secrets(lookup: impl Fn(&str) -> Option<String>) -> Secrets {
    let api_key = lookup(ENV_API_KEY).unwrap_or_default();
    if api_key.is_empty() {
        tracing::debug!("{ENV_API_KEY} not set, inference requests go out without a key");
    }

    Secrets {
        api_key: SecretString::from(api_key),
        store_key: lookup(ENV_STORE_KEY)
            .filter(|k| !k.is_empty())
            .map(SecretString::from),
    }
}

/// Open the local SQLite transcript store under `data_dir`.
pub async fn open_sqlite_store(data_dir: &Path) -> Result<SqliteTranscriptRepository, sqlx::Error> {
    tokio::fs::create_dir_all(data_dir).await?;
    let pool = DatabasePool::new(&database_url(data_dir)).await?;
    Ok(SqliteTranscriptRepository::new(pool))
}

/// Build the transcript backend the configuration selects.
///
/// `None` means persistence is a no-op: backend `none`, `rest` without a URL
/// or key, or a SQLite store that failed to open.
pub async fn create_transcript_repository(
    config: &WidgetConfig,
    secrets: &Secrets,
    data_dir: &Path,
) -> Option<Arc<BoxTranscriptRepository>> {
    let persistence = &config.persistence;
    match persistence.backend {
        PersistenceBackend::None => {
            tracing::info!("Transcript persistence disabled");
            None
        }
        PersistenceBackend::Rest => {
            let url = persistence.rest_url.as_deref().filter(|u| !u.is_empty())?;
            let Some(key) = secrets.store_key.clone() else {
                tracing::warn!(
                    "Transcript store URL set but {ENV_STORE_KEY} is missing, persistence disabled"
                );
                return None;
            };
            tracing::info!(url, table = %persistence.table, "Using REST transcript store");
            Some(Arc::new(BoxTranscriptRepository::new(
                RestTranscriptRepository::new(url, persistence.table.clone(), key),
            )))
        }
        PersistenceBackend::Sqlite => match open_sqlite_store(data_dir).await {
            Ok(repo) => {
                tracing::info!(data_dir = %data_dir.display(), "Using SQLite transcript store");
                Some(Arc::new(BoxTranscriptRepository::new(repo)))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open SQLite transcript store, persistence disabled");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn resolve_data_dir_prefers_env() {
        let dir = resolve_data_dir_with(env(&[(ENV_DATA_DIR, "/srv/talentchat")]));
        assert_eq!(dir, PathBuf::from("/srv/talentchat"));
    }

    #[test]
    fn resolve_data_dir_falls_back_to_home() {
        let dir = resolve_data_dir_with(env(&[]));
        assert!(dir.ends_with(".talentchat"));
    }

    #[tokio::test]
    async fn load_widget_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_widget_config(tmp.path()).await;
        assert_eq!(config.locale, Locale::Es);
        assert!(config.inference.endpoint_url.is_empty());
        assert_eq!(config.persistence.backend, PersistenceBackend::None);
        assert_eq!(config.persistence.table, "chats");
    }

    #[tokio::test]
    async fn load_widget_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
locale = "en"

[inference]
endpoint_url = "https://example.com/api/chat"

[persistence]
backend = "sqlite"

[server]
port = 8080
"#,
        )
        .await
        .unwrap();

        let config = load_widget_config(tmp.path()).await;
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.inference.endpoint_url, "https://example.com/api/chat");
        assert_eq!(config.persistence.backend, PersistenceBackend::Sqlite);
        assert_eq!(config.persistence.table, "chats");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[tokio::test]
    async fn load_widget_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_widget_config(tmp.path()).await;
        assert_eq!(config.persistence.backend, PersistenceBackend::None);
    }

    #[test]
    fn env_overrides_apply() {
        let config = apply_env_overrides(
            WidgetConfig::default(),
            env(&[
                (ENV_API_URL, "https://infer.example.com"),
                (ENV_LOCALE, "EN"),
                (ENV_STORE_URL, "https://abc.supabase.co"),
            ]),
        );
        assert_eq!(config.inference.endpoint_url, "https://infer.example.com");
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.persistence.rest_url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(config.persistence.backend, PersistenceBackend::Rest);
    }

    #[test]
    fn store_url_keeps_explicit_backend() {
        let mut base = WidgetConfig::default();
        base.persistence.backend = PersistenceBackend::Sqlite;
        let config = apply_env_overrides(base, env(&[(ENV_STORE_URL, "https://abc.supabase.co")]));
        assert_eq!(config.persistence.backend, PersistenceBackend::Sqlite);
    }

    #[test]
    fn invalid_and_empty_overrides_are_ignored() {
        let config = apply_env_overrides(
            WidgetConfig::default(),
            env(&[(ENV_LOCALE, "fr"), (ENV_API_URL, "  ")]),
        );
        assert_eq!(config.locale, Locale::Es);
        assert!(config.inference.endpoint_url.is_empty());
    }

    #[test]
    fn load_secrets_defaults() {
        let secrets = load_secrets(env(&[]));
        assert_eq!(secrets.api_key.expose_secret(), "");
        assert!(secrets.store_key.is_none());

        let secrets = load_secrets(env(&[(ENV_API_KEY, "k1"), (ENV_STORE_KEY, "k2")]));
        assert_eq!(secrets.api_key.expose_secret(), "k1");
        assert_eq!(secrets.store_key.unwrap().expose_secret(), "k2");
    }

    #[tokio::test]
    async fn repository_none_backend() {
        let tmp = TempDir::new().unwrap();
        let secrets = load_secrets(env(&[]));
        let repo = create_transcript_repository(&WidgetConfig::default(), &secrets, tmp.path()).await;
        assert!(repo.is_none());
    }

    #[tokio::test]
    async fn repository_rest_requires_url_and_key() {
        let tmp = TempDir::new().unwrap();
        let mut config = WidgetConfig::default();
        config.persistence.backend = PersistenceBackend::Rest;

        let with_key = load_secrets(env(&[(ENV_STORE_KEY, "k")]));
        assert!(create_transcript_repository(&config, &with_key, tmp.path()).await.is_none());

        config.persistence.rest_url = Some("https://abc.supabase.co".to_string());
        let without_key = load_secrets(env(&[]));
        assert!(create_transcript_repository(&config, &without_key, tmp.path()).await.is_none());

        let repo = create_transcript_repository(&config, &with_key, tmp.path()).await.unwrap();
        assert_eq!(repo.name(), "rest");
    }

    #[tokio::test]
    async fn repository_sqlite_opens_under_data_dir() {
        let tmp = TempDir::new().unwrap();
        let data_dir = tmp.path().join("nested");
        let mut config = WidgetConfig::default();
        config.persistence.backend = PersistenceBackend::Sqlite;

        let repo = create_transcript_repository(&config, &load_secrets(env(&[])), &data_dir)
            .await
            .unwrap();
        assert_eq!(repo.name(), "sqlite");
        assert!(data_dir.join("talentchat.db").exists());
    }
}
