//! AgentProvider trait definition.
//!
//! This is the abstraction over the hosted conversational agent. The
//! provider is stateless; session context is supplied with every request.

use travela_types::agent::{AgentReply, AgentRequest};
use travela_types::error::AgentError;

/// Trait for hosted agent backends (Gemini, ...).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in travela-infra (e.g., `GeminiAgentProvider`).
pub trait AgentProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send a request and receive the full reply.
    fn complete(
        &self,
        request: &AgentRequest,
    ) -> impl std::future::Future<Output = Result<AgentReply, AgentError>> + Send;
}
