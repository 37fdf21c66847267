//! Conversation persistence and the conversation service.
//!
//! `ConversationRepository` is the storage port; `ConversationService`
//! applies the creation, ownership and title rules on top of it.

pub mod repository;
pub mod service;
