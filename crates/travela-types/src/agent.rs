//! Agent request/response types.
//!
//! These model the exchange with the hosted conversational agent: a system
//! instruction, the session's prior turns, and the new question.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author of a turn in an agent session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    User,
    Model,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRole::User => write!(f, "user"),
            AgentRole::Model => write!(f, "model"),
        }
    }
}

impl FromStr for AgentRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(AgentRole::User),
            "model" | "assistant" => Ok(AgentRole::Model),
            other => Err(format!("invalid agent role: '{other}'")),
        }
    }
}

/// One turn in an agent session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: AgentRole,
    pub content: String,
}

impl AgentMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: AgentRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: AgentRole::Model,
            content: content.into(),
        }
    }
}

/// A request to the agent provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Persona/system instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Prior turns followed by the new user turn.
    pub messages: Vec<AgentMessage>,
    /// Whether the provider may ground answers with web search.
    #[serde(default)]
    pub web_search: bool,
}

/// The provider's reply.
///
/// `text` is `None` when the provider produced no final text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReply {
    pub text: Option<String>,
    pub model: String,
}
