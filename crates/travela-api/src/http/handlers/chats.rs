//! Conversation history endpoints.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use travela_types::chat::Conversation;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::body::ApiJson;
use crate::http::handlers::ask::ChatResponse;
use crate::state::AppState;

/// A conversation with its messages, oldest first.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<ChatResponse>,
}

impl From<Conversation> for ConversationResponse {
    fn from(conversation: Conversation) -> Self {
        Self {
            id: conversation.id,
            title: conversation.title,
            updated_at: conversation.updated_at,
            messages: conversation.messages.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request body for `PUT /chats/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub title: String,
}

/// GET /chats - List the caller's conversations, most recent first.
pub async fn list_conversations(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<ConversationResponse>>, AppError> {
    let conversations = state
        .conversation_service
        .get_conversations(&identity.phone)
        .await?;
    Ok(Json(conversations.into_iter().map(Into::into).collect()))
}

/// GET /chats/{id} - Fetch one of the caller's conversations.
pub async fn get_conversation(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state
        .conversation_service
        .get_owned_conversation(&identity.phone, &id)
        .await?;
    Ok(Json(conversation.into()))
}

/// PUT /chats/{id} - Rename one of the caller's conversations.
pub async fn update_conversation(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateTitleRequest>,
) -> Result<Json<ConversationResponse>, AppError> {
    let conversation = state
        .conversation_service
        .update_owned_conversation(&identity.phone, &id, &body.title)
        .await?;
    Ok(Json(conversation.into()))
}
