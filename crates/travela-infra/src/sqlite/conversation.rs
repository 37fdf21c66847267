//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `travela-core`: raw queries,
//! private Row structs, reads on the reader pool and writes on the writer.
//! Chats are loaded with their conversation, oldest first.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::Row;
use travela_core::chat::repository::ConversationRepository;
use travela_types::chat::{Chat, Conversation};
use travela_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConversationRow {
    id: String,
    user_phone: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_phone: row.try_get("user_phone")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self, messages: Vec<Chat>) -> Result<Conversation, RepositoryError> {
        Ok(Conversation {
            id: self.id,
            user_phone: self.user_phone,
            title: self.title,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct ChatRow {
    id: String,
    conversation_id: String,
    user_phone: String,
    question: String,
    answer: String,
    timestamp: String,
}

impl ChatRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            user_phone: row.try_get("user_phone")?,
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_chat(self) -> Result<Chat, RepositoryError> {
        Ok(Chat {
            id: self.id,
            user_phone: self.user_phone,
            conversation_id: self.conversation_id,
            question: self.question,
            answer: self.answer,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

fn rows_to_chats(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Chat>, RepositoryError> {
    let mut chats = Vec::with_capacity(rows.len());
    for row in rows {
        let chat_row = ChatRow::from_row(row).map_err(query_error)?;
        chats.push(chat_row.into_chat()?);
    }
    Ok(chats)
}

async fn insert_chat(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    chat: &Chat,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "INSERT INTO chats (id, conversation_id, user_phone, question, answer, timestamp)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&chat.id)
    .bind(&chat.conversation_id)
    .bind(&chat.user_phone)
    .bind(&chat.question)
    .bind(&chat.answer)
    .bind(format_datetime(&chat.timestamp))
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.message().contains("UNIQUE") {
                return RepositoryError::Conflict(format!("chat {} already exists", chat.id));
            }
        }
        query_error(e)
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query(
            "INSERT INTO conversations (id, user_phone, title, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&conversation.id)
        .bind(&conversation.user_phone)
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!(
                        "conversation {} already exists",
                        conversation.id
                    ));
                }
            }
            query_error(e)
        })?;

        for chat in &conversation.messages {
            insert_chat(&mut tx, chat).await?;
        }

        tx.commit().await.map_err(query_error)
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let conversation_row = ConversationRow::from_row(&row).map_err(query_error)?;

        let chat_rows = sqlx::query(
            "SELECT * FROM chats WHERE conversation_id = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let messages = rows_to_chats(&chat_rows)?;
        Ok(Some(conversation_row.into_conversation(messages)?))
    }

    async fn list_conversations(&self, phone: &str) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE user_phone = ? ORDER BY updated_at DESC, id DESC",
        )
        .bind(phone)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let chat_rows = sqlx::query(
            "SELECT chats.* FROM chats
             JOIN conversations ON conversations.id = chats.conversation_id
             WHERE conversations.user_phone = ?
             ORDER BY chats.timestamp ASC, chats.id ASC",
        )
        .bind(phone)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut by_conversation: HashMap<String, Vec<Chat>> = HashMap::new();
        for chat in rows_to_chats(&chat_rows)? {
            by_conversation
                .entry(chat.conversation_id.clone())
                .or_default()
                .push(chat);
        }

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conversation_row = ConversationRow::from_row(row).map_err(query_error)?;
            let messages = by_conversation
                .remove(&conversation_row.id)
                .unwrap_or_default();
            conversations.push(conversation_row.into_conversation(messages)?);
        }
        Ok(conversations)
    }

    async fn append_chat(&self, chat: &Chat) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let result = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&chat.timestamp))
            .bind(&chat.conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        insert_chat(&mut tx, chat).await?;
        tx.commit().await.map_err(query_error)
    }

    async fn update_title(
        &self,
        id: &str,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?")
            .bind(title)
            .bind(format_datetime(&updated_at))
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
