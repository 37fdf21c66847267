//! Shared domain types for the Travela API.
//!
//! Users, chats and conversations, session token claims, agent exchange
//! types, settings, and the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod phone;
pub mod user;
