//! Body extractors whose rejections use the API error format.

use axum::extract::FromRequest;

use crate::http::error::AppError;

/// `axum::Json` with malformed bodies reported as `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::Form` with malformed bodies reported as `VALIDATION_ERROR`.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);
