//! Question endpoint: forwards to the travel agent and saves the exchange.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use travela_types::chat::Chat;

use crate::http::error::AppError;
use crate::http::extractors::auth::AuthUser;
use crate::http::extractors::body::ApiJson;
use crate::state::AppState;

/// Request body for `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Continue this conversation; a new one is started when absent.
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// One saved question/answer exchange.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    pub conversation_id: String,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            question: chat.question,
            answer: chat.answer,
            timestamp: chat.timestamp,
            conversation_id: chat.conversation_id,
        }
    }
}

/// POST /ask - Ask the travel assistant a question.
///
/// An explicit conversation id is checked before the agent is called, so a
/// foreign or unknown conversation costs no model request.
pub async fn ask(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    ApiJson(body): ApiJson<AskRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if body.question.trim().is_empty() {
        return Err(AppError::Validation("question must not be empty".to_string()));
    }
    let conversation_id = body
        .conversation_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());

    if let Some(id) = conversation_id {
        state
            .conversation_service
            .get_owned_conversation(&identity.phone, id)
            .await?;
    }

    let answer = state
        .gateway
        .ask(&identity.phone, &identity.session_id, &body.question)
        .await?;

    let chat = state
        .conversation_service
        .save_chat(
            &identity.phone,
            body.question,
            answer,
            conversation_id,
        )
        .await?;

    Ok(Json(chat.into()))
}
