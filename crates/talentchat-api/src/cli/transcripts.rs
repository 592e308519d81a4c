//! Transcript browsing CLI commands: list and show.
//!
//! `show` fetches one transcript by id from whichever store is configured.
//! `list` pages through the local SQLite store, so it needs the `sqlite`
//! backend; remote stores have their own tools for browsing.

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use talentchat_core::chat::repository::BoxTranscriptRepository;
use talentchat_infra::config::open_sqlite_store;
use talentchat_infra::sqlite::chat::SqliteTranscriptRepository;
use talentchat_types::chat::{ChatRecord, MessageRole, SessionHandle};
use talentchat_types::config::PersistenceBackend;

use crate::state::AppState;

async fn open_store(state: &AppState) -> Result<SqliteTranscriptRepository> {
    let backend = state.config.persistence.backend;
    if backend != PersistenceBackend::Sqlite {
        bail!(
            "Listing transcripts needs the sqlite backend (configured: {backend}). \
             Set `backend = \"sqlite\"` under [persistence] in config.toml."
        );
    }
    open_sqlite_store(&state.data_dir)
        .await
        .context("Failed to open transcript store")
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

/// First visitor question of a transcript, for the list view.
fn first_question(record: &ChatRecord) -> &str {
    record
        .conversation
        .iter()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.text.as_str())
        .unwrap_or("")
}

/// List stored transcripts, newest first.
///
/// ```bash
/// tchat transcripts list --limit 10
/// tchat transcripts ls --json
/// ```
pub async fn list_transcripts(state: &AppState, limit: u32, offset: u32, json: bool) -> Result<()> {
    let store = open_store(state).await?;
    let records = store.list(limit, offset).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!(
            "  {} No transcripts stored yet. Start one with: {}",
            style("i").blue().bold(),
            style("tchat chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Visitor").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("First question").fg(Color::White),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(truncate(record.id.as_str(), 13)).fg(Color::DarkGrey),
            Cell::new(&record.user_name).fg(Color::Cyan),
            Cell::new(&record.user_email),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(record.conversation.len()),
            Cell::new(truncate(first_question(record), 40)),
        ]);
    }

    let total = store.count().await?;

    println!();
    println!("{table}");
    println!(
        "  {} Showing {} of {} transcripts",
        style("i").blue().bold(),
        records.len(),
        total
    );
    println!();

    Ok(())
}

/// Fetch one transcript from the configured store.
async fn fetch_transcript(store: Option<&BoxTranscriptRepository>, id: &str) -> Result<ChatRecord> {
    let Some(store) = store else {
        bail!(
            "No transcript store configured. \
             Set `backend` under [persistence] in config.toml."
        );
    };
    store
        .get(&SessionHandle::from(id))
        .await
        .with_context(|| format!("Failed to read transcript '{id}' from {}", store.name()))?
        .with_context(|| format!("Transcript '{id}' not found"))
}

/// Print one transcript in full.
pub async fn show_transcript(state: &AppState, id: &str, json: bool) -> Result<()> {
    let record = fetch_transcript(state.transcripts.as_deref(), id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} <{}>",
        style("Transcript").bold(),
        style(&record.user_name).cyan().bold(),
        style(&record.user_email).dim()
    );
    println!(
        "  {} {}",
        style("Started:").dim(),
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  {}", style("---").dim());
    println!();

    for message in &record.conversation {
        let label = match message.role {
            MessageRole::User => style(record.user_name.clone()).green().bold(),
            MessageRole::Assistant => style("Candidate".to_string()).cyan().bold(),
        };
        println!("  {label}");
        for line in message.text.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use secrecy::SecretString;
    use serde_json::json;
    use talentchat_infra::rest::RestTranscriptRepository;
    use talentchat_types::chat::Message;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_show_reads_from_rest_store() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chats"))
            .and(query_param("id", "eq.7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 7,
                "user_name": "Ana",
                "user_email": "ana@example.com",
                "conversation": [
                    {"role": "assistant", "text": "¡Hola Ana!"},
                    {"role": "user", "text": "¿Qué stack usas?"},
                    {"role": "assistant", "text": "Rust"}
                ],
                "created_at": "2025-03-01T10:00:00Z"
            }])))
            .mount(&server)
            .await;
        let store = BoxTranscriptRepository::new(RestTranscriptRepository::new(
            server.uri(),
            "chats",
            SecretString::from("k"),
        ));

        let record = fetch_transcript(Some(&store), "7").await.unwrap();
        assert_eq!(record.id, SessionHandle::from("7"));
        assert_eq!(record.user_name, "Ana");
        assert_eq!(record.conversation.len(), 3);
        assert_eq!(first_question(&record), "¿Qué stack usas?");
    }

    #[tokio::test]
    async fn test_show_reports_missing_transcript() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/chats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let store = BoxTranscriptRepository::new(RestTranscriptRepository::new(
            server.uri(),
            "chats",
            SecretString::from("k"),
        ));

        let err = fetch_transcript(Some(&store), "99").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_show_without_store_explains_configuration() {
        let err = fetch_transcript(None, "1").await.unwrap_err();
        assert!(err.to_string().contains("[persistence]"));
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("¿Cuántos años de experiencia?", 10), "¿Cuánto...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn first_question_skips_greeting() {
        let record = ChatRecord {
            id: SessionHandle::from("1"),
            user_name: "Ana".to_string(),
            user_email: "ana@example.com".to_string(),
            conversation: vec![
                Message::assistant("¡Hola Ana!"),
                Message::user("¿Qué stack usas?"),
            ],
            created_at: Utc::now(),
        };
        assert_eq!(first_question(&record), "¿Qué stack usas?");
    }

    #[test]
    fn first_question_empty_without_user_messages() {
        let record = ChatRecord {
            id: SessionHandle::from("1"),
            user_name: "Ana".to_string(),
            user_email: "ana@example.com".to_string(),
            conversation: vec![Message::assistant("¡Hola Ana!")],
            created_at: Utc::now(),
        };
        assert_eq!(first_question(&record), "");
    }
}
