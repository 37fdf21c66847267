//! GeminiAgentProvider -- concrete [`AgentProvider`] for Google Gemini.
//!
//! Sends the session history to `models/{model}:generateContent` in a single
//! request and returns the first candidate's text. The API key travels in
//! the `x-goog-api-key` header, never in the URL, and is only exposed while
//! building the request.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use travela_core::agent::provider::AgentProvider;
use travela_types::agent::{AgentReply, AgentRequest, AgentRole};
use travela_types::error::AgentError;

use super::types::{Content, GenerateContentRequest, GenerateContentResponse, GoogleSearch, Tool};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini agent provider.
///
/// Does not derive Debug; the API key stays out of any formatted output.
pub struct GeminiAgentProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiAgentProvider {
    pub fn new(api_key: SecretString, model: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model
                .strip_prefix("models/")
                .unwrap_or(&model)
                .to_string(),
        })
    }

    /// Override the base URL (proxies, or wiremock in tests).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn to_gemini_request(request: &AgentRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    AgentRole::User => "user",
                    AgentRole::Model => "model",
                };
                Content::text(Some(role), &m.content)
            })
            .collect();

        let tools = if request.web_search {
            vec![Tool {
                google_search: GoogleSearch::default(),
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents,
            system_instruction: request
                .system
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| Content::text(None, s)),
            tools,
        }
    }
}

impl AgentProvider for GeminiAgentProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "gemini", error = %e, "Agent request failed");
                AgentError::Provider {
                    message: format!("HTTP request failed: {e}"),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                provider = "gemini",
                status = status.as_u16(),
                body = %error_body,
                "Agent returned an error status"
            );
            return Err(match status.as_u16() {
                401 | 403 => AgentError::AuthenticationFailed,
                429 => AgentError::RateLimited,
                _ => AgentError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            AgentError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        debug!(
            candidates = parsed.candidates.len(),
            finish_reason = ?parsed.candidates.first().and_then(|c| c.finish_reason.as_deref()),
            "Agent response received"
        );

        Ok(AgentReply {
            text: parsed.answer_text(),
            model: parsed.model_version.unwrap_or_else(|| self.model.clone()),
        })
    }
}
