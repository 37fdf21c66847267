//! ConversationRepository trait definition.
//!
//! Provides CRUD operations for conversations and their chats.
//! Follows the same RPITIT pattern as `UserRepository`.

use chrono::{DateTime, Utc};
use travela_types::chat::{Chat, Conversation};
use travela_types::error::RepositoryError;

/// Repository trait for conversation and chat persistence.
///
/// Implementations live in travela-infra (e.g., `SqliteConversationRepository`).
pub trait ConversationRepository: Send + Sync {
    /// Insert a conversation together with any messages it already holds.
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Get a conversation with its messages in chronological order.
    fn get_conversation(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// All conversations owned by `phone`, most recently updated first.
    fn list_conversations(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Append a chat to its conversation and bump the conversation's `updated_at`
    /// to the chat timestamp.
    ///
    /// Returns `RepositoryError::NotFound` if the conversation does not exist.
    fn append_chat(
        &self,
        chat: &Chat,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Overwrite the title and `updated_at`.
    ///
    /// Returns `RepositoryError::NotFound` if the conversation does not exist.
    fn update_title(
        &self,
        id: &str,
        title: &str,
        updated_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
