//! SQLite transcript repository.
//!
//! Implements `TranscriptRepository` from `talentchat-core` using sqlx with
//! split read/write pools. The conversation is stored as a JSON array in a
//! single TEXT column, mirroring the remote `chats` collection.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use talentchat_core::chat::repository::TranscriptRepository;
use talentchat_types::chat::{ChatRecord, Message, NewChatRecord, SessionHandle};
use talentchat_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `TranscriptRepository`.
pub struct SqliteTranscriptRepository {
    pool: DatabasePool,
}

impl SqliteTranscriptRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Most recent transcripts first.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ChatRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chats ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?")
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ChatRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_record()
            })
            .collect()
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }
}

// ---------------------------------------------------------------------------
// Private row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatRow {
    id: String,
    user_name: String,
    user_email: String,
    conversation: String,
    created_at: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_name: row.try_get("user_name")?,
            user_email: row.try_get("user_email")?,
            conversation: row.try_get("conversation")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<ChatRecord, RepositoryError> {
        let conversation: Vec<Message> = serde_json::from_str(&self.conversation)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation JSON: {e}")))?;

        Ok(ChatRecord {
            id: SessionHandle(self.id),
            user_name: self.user_name,
            user_email: self.user_email,
            conversation,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn conversation_json(conversation: &[Message]) -> Result<String, RepositoryError> {
    serde_json::to_string(conversation)
        .map_err(|e| RepositoryError::Query(format!("failed to encode conversation: {e}")))
}

// ---------------------------------------------------------------------------
// TranscriptRepository implementation
// ---------------------------------------------------------------------------

impl TranscriptRepository for SqliteTranscriptRepository {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create(&self, record: &NewChatRecord) -> Result<SessionHandle, RepositoryError> {
        let id = Uuid::now_v7().to_string();
        let created_at = format_datetime(&record.created_at);

        sqlx::query(
            r#"INSERT INTO chats (id, user_name, user_email, conversation, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&record.user_name)
        .bind(&record.user_email)
        .bind(conversation_json(&record.conversation)?)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        Ok(SessionHandle(id))
    }

    async fn update(
        &self,
        handle: &SessionHandle,
        conversation: &[Message],
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE chats SET conversation = ?, updated_at = ? WHERE id = ?")
            .bind(conversation_json(conversation)?)
            .bind(format_datetime(&Utc::now()))
            .bind(handle.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get(&self, handle: &SessionHandle) -> Result<Option<ChatRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chats WHERE id = ?")
            .bind(handle.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let chat_row =
                    ChatRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(chat_row.into_record()?))
            }
            None => Ok(None),
        }
    }
}
