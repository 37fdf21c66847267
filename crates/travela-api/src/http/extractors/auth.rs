//! Bearer token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to the session
//! identity it was issued for.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use travela_types::auth::SessionIdentity;

use crate::http::error::AppError;
use crate::state::AppState;

/// Authenticated caller. Extracting this validates the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionIdentity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let identity = state.auth_service.resolve_token(token)?;
        Ok(AuthUser(identity))
    }
}

/// Extract the bearer token from request headers.
fn extract_bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;
    let value = header.to_str().map_err(|_| {
        AppError::Unauthorized("Invalid Authorization header encoding".to_string())
    })?;

    // Scheme is case-insensitive.
    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::Unauthorized("Not authenticated".to_string()));
    }
    Ok(token)
}
