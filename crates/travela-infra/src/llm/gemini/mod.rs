//! Google Gemini agent provider.
//!
//! [`GeminiAgentProvider`] implements the
//! [`AgentProvider`](travela_core::agent::provider::AgentProvider) trait for
//! the Gemini `generateContent` API, with optional Google Search grounding.

pub mod client;
pub mod types;

pub use client::GeminiAgentProvider;
