//! Configuration types for Talentchat.
//!
//! `WidgetConfig` represents `config.toml` in the data directory. Every
//! field has a default so an absent or partial file still yields a usable
//! configuration.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Language of the canned texts (greeting, error reply, field errors).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Greeting seeded as the first assistant message once intake succeeds.
    pub fn greeting(&self, name: &str) -> String {
        match self {
            Locale::Es => format!(
                "¡Hola {name}! Bienvenido(a) a nuestro chat. Estoy aquí para responder tus preguntas sobre mi experiencia laboral. ¿Qué te gustaría saber?"
            ),
            Locale::En => format!(
                "Hello {name}! Welcome to our chat. I'm here to answer your questions about my work experience. What would you like to know?"
            ),
        }
    }

    /// Assistant text used in place of a reply when the inference call fails.
    pub fn error_reply(&self) -> &'static str {
        match self {
            Locale::Es => "Hubo un error al procesar tu pregunta.",
            Locale::En => "There was an error processing your question.",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Es => write!(f, "es"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" => Ok(Locale::Es),
            "en" => Ok(Locale::En),
            other => Err(format!("invalid locale: '{other}'")),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub locale: Locale,

    #[serde(default)]
    pub inference: InferenceSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

/// Where visitor messages are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceSettings {
    /// Endpoint URL. Empty means unconfigured: every request fails and
    /// the visitor sees the canned error reply.
    #[serde(default)]
    pub endpoint_url: String,
}

/// Which transcript store backs the persister.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    #[default]
    None,
    Sqlite,
    Rest,
}

impl fmt::Display for PersistenceBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceBackend::None => write!(f, "none"),
            PersistenceBackend::Sqlite => write!(f, "sqlite"),
            PersistenceBackend::Rest => write!(f, "rest"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    #[serde(default)]
    pub backend: PersistenceBackend,

    /// Base URL of the PostgREST service (the `rest` backend).
    #[serde(default)]
    pub rest_url: Option<String>,

    /// Table (collection) holding transcripts.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "chats".to_string()
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            backend: PersistenceBackend::None,
            rest_url: None,
            table: default_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding a built web widget bundle to serve at `/`.
    #[serde(default)]
    pub web_dir: Option<String>,

    /// Seconds without a request before a session is flushed and closed.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            web_dir: None,
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widget_config_default_values() {
        let config = WidgetConfig::default();
        assert_eq!(config.locale, Locale::Es);
        assert!(config.inference.endpoint_url.is_empty());
        assert_eq!(config.persistence.backend, PersistenceBackend::None);
        assert_eq!(config.persistence.table, "chats");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.session_idle_secs, 1800);
    }

    #[test]
    fn test_widget_config_deserialize_with_defaults() {
        let config: WidgetConfig = toml::from_str("").unwrap();
        assert_eq!(config.persistence.table, "chats");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_widget_config_deserialize_with_values() {
        let toml_str = r#"
locale = "en"

[inference]
endpoint_url = "https://api.example.com/chat"

[persistence]
backend = "rest"
rest_url = "https://db.example.com"

[server]
port = 8080
session_idle_secs = 600
"#;
        let config: WidgetConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.locale, Locale::En);
        assert_eq!(config.inference.endpoint_url, "https://api.example.com/chat");
        assert_eq!(config.persistence.backend, PersistenceBackend::Rest);
        assert_eq!(config.persistence.rest_url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.persistence.table, "chats");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_idle_secs, 600);
    }

    #[test]
    fn test_greeting_contains_name() {
        assert!(Locale::Es.greeting("Ana").starts_with("¡Hola Ana!"));
        assert!(Locale::En.greeting("Ana").starts_with("Hello Ana!"));
    }

    #[test]
    fn test_error_reply_texts() {
        assert_eq!(Locale::Es.error_reply(), "Hubo un error al procesar tu pregunta.");
        assert_eq!(
            Locale::En.error_reply(),
            "There was an error processing your question."
        );
    }

    #[test]
    fn test_locale_parse() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }
}
