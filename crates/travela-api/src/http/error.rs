//! Application error type mapping domain failures to HTTP responses.
//!
//! Every error body has the shape `{"detail": "...", "code": "..."}`.
//! Delivery, agent and storage details are logged, not returned.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use travela_types::error::{AgentError, AuthError, ConversationError, OtpError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Otp(OtpError),
    Auth(AuthError),
    Conversation(ConversationError),
    Agent(AgentError),
    /// Missing or malformed credentials.
    Unauthorized(String),
    /// Request failed validation.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<OtpError> for AppError {
    fn from(e: OtpError) -> Self {
        AppError::Otp(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        AppError::Conversation(e)
    }
}

impl From<AgentError> for AppError {
    fn from(e: AgentError) -> Self {
        AppError::Agent(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(e: FormRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Request failed with internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            AppError::Otp(OtpError::RateLimited { .. }) => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many OTP requests. Please try again later.".to_string(),
            ),
            AppError::Otp(OtpError::DeliveryFailed(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OTP_DELIVERY_FAILED",
                "Failed to send OTP".to_string(),
            ),
            AppError::Otp(OtpError::InvalidOtp) => {
                (StatusCode::UNAUTHORIZED, "INVALID_OTP", "Invalid OTP".to_string())
            }
            AppError::Otp(OtpError::UserNotFound(_)) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::Otp(OtpError::InvalidPhone(phone)) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid phone number: '{phone}'"),
            ),
            AppError::Otp(e @ OtpError::Storage(_)) => internal(e),
            AppError::Auth(AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Invalid token".to_string())
            }
            AppError::Auth(e) => internal(e),
            AppError::Conversation(ConversationError::NotFound) => (
                StatusCode::NOT_FOUND,
                "CONVERSATION_NOT_FOUND",
                "Conversation not found".to_string(),
            ),
            AppError::Conversation(ConversationError::NoConversations) => (
                StatusCode::NOT_FOUND,
                "NO_CONVERSATIONS",
                "No conversations found".to_string(),
            ),
            AppError::Conversation(ConversationError::InvalidTitle(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Conversation(e @ ConversationError::Storage(_)) => internal(e),
            AppError::Agent(e) => {
                tracing::error!(error = %e, "Agent request failed");
                let detail = match e {
                    AgentError::NoResponse => "The assistant did not return a response",
                    _ => "The assistant is unavailable right now",
                };
                (StatusCode::BAD_GATEWAY, "AGENT_ERROR", detail.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => internal(msg),
        };

        let body = json!({
            "detail": detail,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if code == "UNAUTHORIZED" {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
