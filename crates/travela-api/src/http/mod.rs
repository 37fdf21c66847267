//! HTTP API layer.
//!
//! Axum routes for OTP login, questions to the travel agent and
//! conversation history, with bearer token authentication and CORS.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
