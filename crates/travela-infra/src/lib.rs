//! Infrastructure layer for the Travela API.
//!
//! Contains implementations of the ports defined in `travela-core`: SQLite
//! storage for users, OTP codes and conversations, the Africa's Talking SMS
//! client, the Gemini agent client, and the settings file loader.

pub mod config;
pub mod llm;
pub mod sms;
pub mod sqlite;
