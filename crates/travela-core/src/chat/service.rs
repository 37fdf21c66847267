//! Conversation service: chat persistence, retrieval and title updates.
//!
//! A chat saved without a conversation id starts a new conversation; a chat
//! saved with one is appended to it. Conversations owned by a different
//! phone are reported as not found.

use chrono::Utc;
use tracing::info;
use travela_types::chat::{Chat, Conversation, MAX_TITLE_CHARS};
use travela_types::error::{ConversationError, RepositoryError};
use travela_types::phone::mask_phone;

use crate::chat::repository::ConversationRepository;

/// Orchestrates conversation lifecycle on top of a `ConversationRepository`.
pub struct ConversationService<C: ConversationRepository> {
    repo: C,
}

impl<C: ConversationRepository> ConversationService<C> {
    pub fn new(repo: C) -> Self {
        Self { repo }
    }

    /// Access the underlying repository.
    pub fn repo(&self) -> &C {
        &self.repo
    }

    /// Persist a question/answer exchange.
    ///
    /// With `conversation_id`, the conversation must exist and belong to
    /// `phone`. Without one, a new conversation is created holding just
    /// this chat.
    pub async fn save_chat(
        &self,
        phone: &str,
        question: String,
        answer: String,
        conversation_id: Option<&str>,
    ) -> Result<Chat, ConversationError> {
        match conversation_id {
            Some(id) => {
                self.get_owned_conversation(phone, id).await?;
                let chat = Chat::new(phone.to_string(), id.to_string(), question, answer);
                self.repo.append_chat(&chat).await.map_err(not_found)?;
                Ok(chat)
            }
            None => {
                let mut conversation = Conversation::new(phone.to_string());
                let chat = Chat::new(
                    phone.to_string(),
                    conversation.id.clone(),
                    question,
                    answer,
                );
                conversation.updated_at = chat.timestamp;
                conversation.messages.push(chat.clone());
                self.repo.create_conversation(&conversation).await?;
                info!(
                    conversation_id = %conversation.id,
                    phone = %mask_phone(phone),
                    "Conversation created"
                );
                Ok(chat)
            }
        }
    }

    /// Get a conversation by id.
    pub async fn get_conversation(&self, id: &str) -> Result<Conversation, ConversationError> {
        self.repo
            .get_conversation(id)
            .await?
            .ok_or(ConversationError::NotFound)
    }

    /// Get a conversation by id, treating one owned by another phone as absent.
    pub async fn get_owned_conversation(
        &self,
        phone: &str,
        id: &str,
    ) -> Result<Conversation, ConversationError> {
        let conversation = self.get_conversation(id).await?;
        if !conversation.is_owned_by(phone) {
            return Err(ConversationError::NotFound);
        }
        Ok(conversation)
    }

    /// All conversations owned by `phone`, newest activity first.
    ///
    /// Returns an empty list when the user has none.
    pub async fn get_conversations(
        &self,
        phone: &str,
    ) -> Result<Vec<Conversation>, ConversationError> {
        Ok(self.repo.list_conversations(phone).await?)
    }

    /// Overwrite a conversation's title; messages are unchanged.
    pub async fn update_conversation(
        &self,
        id: &str,
        title: &str,
    ) -> Result<Conversation, ConversationError> {
        let title = validate_title(title)?;
        self.repo
            .update_title(id, &title, Utc::now())
            .await
            .map_err(not_found)?;
        info!(conversation_id = %id, "Conversation title updated");
        self.get_conversation(id).await
    }

    /// Like [`update_conversation`](Self::update_conversation), restricted to the owner.
    pub async fn update_owned_conversation(
        &self,
        phone: &str,
        id: &str,
        title: &str,
    ) -> Result<Conversation, ConversationError> {
        self.get_owned_conversation(phone, id).await?;
        self.update_conversation(id, title).await
    }
}

fn validate_title(title: &str) -> Result<String, ConversationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ConversationError::InvalidTitle(
            "title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ConversationError::InvalidTitle(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn not_found(e: RepositoryError) -> ConversationError {
    match e {
        RepositoryError::NotFound => ConversationError::NotFound,
        other => ConversationError::Storage(other),
    }
}
