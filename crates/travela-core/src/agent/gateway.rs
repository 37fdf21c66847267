//! Chat gateway: relays a user's question to the hosted agent.
//!
//! The gateway keeps one context per (phone, session id): the prior user and
//! model turns, sent along with every new question. A fresh OTP
//! verification yields a new session id and therefore a fresh context.
//! Answers are passed through untouched; an empty reply is a
//! [`AgentError::NoResponse`], never a placeholder.
//!
//! Contexts idle for longer than `session_idle_ttl` are evicted; their
//! session tokens have expired by then.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};
use travela_types::agent::{AgentMessage, AgentRequest};
use travela_types::error::AgentError;
use travela_types::phone::mask_phone;

use super::box_provider::BoxAgentProvider;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    phone: String,
    session_id: String,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Persona instruction sent with every request.
    pub system: Option<String>,
    /// Allow the provider to ground answers with web search.
    pub web_search: bool,
    /// Most recent turns retained per session (user and model turns each count).
    /// Turns are dropped in user/model pairs, so the kept context always
    /// opens with a user turn.
    pub history_limit: usize,
    /// Contexts unused for this long are dropped.
    pub session_idle_ttl: Duration,
}

struct SessionHistory {
    turns: Vec<AgentMessage>,
    last_used: Instant,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            system: None,
            web_search: false,
            history_limit: 40,
            session_idle_ttl: Duration::from_secs(30 * 60),
        }
    }
}

pub struct ChatGateway {
    provider: BoxAgentProvider,
    config: GatewayConfig,
    sessions: DashMap<SessionKey, SessionHistory>,
}

impl ChatGateway {
    pub fn new(provider: BoxAgentProvider, config: GatewayConfig) -> Self {
        Self {
            provider,
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn provider(&self) -> &BoxAgentProvider {
        &self.provider
    }

    /// Ask the agent `question` within the (phone, session) context and
    /// return the answer text.
    pub async fn ask(
        &self,
        phone: &str,
        session_id: &str,
        question: &str,
    ) -> Result<String, AgentError> {
        let key = SessionKey {
            phone: phone.to_string(),
            session_id: session_id.to_string(),
        };

        // Snapshot the history; the map entry must not be held across the await.
        let mut messages = self
            .sessions
            .get(&key)
            .map(|h| h.turns.clone())
            .unwrap_or_default();
        messages.push(AgentMessage::user(question));

        let request = AgentRequest {
            system: self.config.system.clone(),
            messages,
            web_search: self.config.web_search,
        };

        debug!(
            provider = self.provider.name(),
            model = self.provider.model(),
            phone = %mask_phone(phone),
            turns = request.messages.len(),
            "Forwarding question to agent"
        );

        let reply = self.provider.complete(&request).await?;

        let answer = match reply.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                warn!(
                    provider = self.provider.name(),
                    model = %reply.model,
                    "Agent produced no final response"
                );
                return Err(AgentError::NoResponse);
            }
        };

        self.evict_idle_except(&key);

        let mut history = self.sessions.entry(key).or_insert_with(|| SessionHistory {
            turns: Vec::new(),
            last_used: Instant::now(),
        });
        history.last_used = Instant::now();
        history.turns.push(AgentMessage::user(question));
        history.turns.push(AgentMessage::model(answer.clone()));
        let excess = history.turns.len().saturating_sub(self.config.history_limit);
        if excess > 0 {
            // Round up to a whole user/model pair.
            let remove = (excess.div_ceil(2) * 2).min(history.turns.len());
            history.turns.drain(..remove);
        }

        Ok(answer)
    }

    /// Drop every context idle for longer than `session_idle_ttl`.
    /// Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.config.session_idle_ttl;
        self.sessions.retain(|_, s| s.last_used.elapsed() < ttl);
        before.saturating_sub(self.sessions.len())
    }

    fn evict_idle_except(&self, keep: &SessionKey) {
        let ttl = self.config.session_idle_ttl;
        self.sessions
            .retain(|k, s| k == keep || s.last_used.elapsed() < ttl);
    }

    /// Number of live session contexts.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// The recorded turns for a session (empty if none).
    pub fn history(&self, phone: &str, session_id: &str) -> Vec<AgentMessage> {
        let key = SessionKey {
            phone: phone.to_string(),
            session_id: session_id.to_string(),
        };
        self.sessions
            .get(&key)
            .map(|h| h.turns.clone())
            .unwrap_or_default()
    }
}
