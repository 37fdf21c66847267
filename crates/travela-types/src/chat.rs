//! Chat and conversation types.
//!
//! A conversation is a titled, ordered group of question/answer exchanges
//! owned by one user. Chats are immutable once saved and always belong to
//! exactly one conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a conversation title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// A single question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub user_phone: String,
    pub conversation_id: String,
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl Chat {
    pub fn new(user_phone: String, conversation_id: String, question: String, answer: String) -> Self {
        Self {
            id: generate_id(),
            user_phone,
            conversation_id,
            question,
            answer,
            timestamp: Utc::now(),
        }
    }
}

/// A titled conversation with its messages in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_phone: String,
    pub title: String,
    pub messages: Vec<Chat>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Start an empty conversation with a generated id and default title.
    pub fn new(user_phone: String) -> Self {
        let id = generate_id();
        let now = Utc::now();
        Self {
            title: default_title(&id),
            id,
            user_phone,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, phone: &str) -> bool {
        self.user_phone == phone
    }
}

/// Default title for a conversation: `Chat ` plus the id's last 8 characters.
///
/// The tail of a v7 id is random, so titles differ even for conversations
/// created in the same millisecond.
pub fn default_title(id: &str) -> String {
    let tail_start = id.len().saturating_sub(8);
    format!("Chat {}", &id[tail_start..])
}

/// Time-sortable identifier in simple (unhyphenated) hex form.
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}
