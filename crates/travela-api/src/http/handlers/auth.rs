//! Phone OTP login endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::http::extractors::body::{ApiForm, ApiJson};
use crate::state::AppState;

/// Request body for `POST /auth/request-otp`.
#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

#[derive(Debug, Serialize)]
pub struct OtpRequestResponse {
    pub message: String,
}

/// OAuth2 password-grant style form: the phone is the username and the OTP
/// is the password.
#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub grant_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /auth/request-otp - Issue and deliver a one-time code.
pub async fn request_otp(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<OtpRequest>,
) -> Result<Json<OtpRequestResponse>, AppError> {
    let issued = state.otp_service.request_otp(&body.phone).await?;
    Ok(Json(OtpRequestResponse {
        message: issued.message,
    }))
}

/// POST /auth/verify-otp - Exchange a valid code for a bearer token.
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<VerifyOtpForm>,
) -> Result<Json<TokenResponse>, AppError> {
    if let Some(grant_type) = form.grant_type.as_deref() {
        if !grant_type.is_empty() && grant_type != "password" {
            return Err(AppError::Validation(format!(
                "Unsupported grant_type '{grant_type}'"
            )));
        }
    }

    let identity = state
        .otp_service
        .verify_otp(&form.username, &form.password)
        .await?;
    let access_token = state
        .auth_service
        .issue_token(&identity.phone, &identity.session_id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
