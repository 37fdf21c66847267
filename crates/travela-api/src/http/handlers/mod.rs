//! HTTP request handlers for the REST API.

pub mod ask;
pub mod auth;
pub mod chats;
