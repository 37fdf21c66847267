//! Hosted agent provider implementations.
//!
//! Contains the concrete [`AgentProvider`](travela_core::agent::provider::AgentProvider)
//! for Google Gemini and a factory ([`create_agent_provider`]) that builds the
//! configured provider from [`Settings`].

pub mod gemini;

use secrecy::SecretString;

use travela_core::agent::box_provider::BoxAgentProvider;
use travela_types::config::Settings;

use self::gemini::GeminiAgentProvider;

/// Build the agent provider described by `settings`.
pub fn create_agent_provider(settings: &Settings) -> Result<BoxAgentProvider, reqwest::Error> {
    let provider = GeminiAgentProvider::new(
        SecretString::from(settings.gemini_api_key.clone()),
        settings.gemini_model.clone(),
    )?
    .with_base_url(settings.gemini_base_url.clone());
    Ok(BoxAgentProvider::new(provider))
}
