//! AfricasTalkingSms -- [`SmsSender`] backed by the Africa's Talking bulk SMS API.
//!
//! Posts a form to `/version1/messaging` and treats the message as delivered
//! only when the first recipient's status is `Success`. The `sandbox`
//! username is routed to the sandbox host.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! when building the request headers.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use travela_core::sms::SmsSender;
use travela_types::error::SmsError;

const LIVE_BASE_URL: &str = "https://api.africastalking.com";
const SANDBOX_BASE_URL: &str = "https://api.sandbox.africastalking.com";
const MESSAGING_PATH: &str = "/version1/messaging";

/// Africa's Talking SMS client.
pub struct AfricasTalkingSms {
    client: reqwest::Client,
    username: String,
    api_key: SecretString,
    sender_id: Option<String>,
    base_url: String,
}

impl AfricasTalkingSms {
    /// Create a client for `username`. The base URL follows the username:
    /// `sandbox` goes to the sandbox host, anything else to production.
    pub fn new(
        username: String,
        api_key: SecretString,
        sender_id: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        let base_url = if username == "sandbox" {
            SANDBOX_BASE_URL
        } else {
            LIVE_BASE_URL
        }
        .to_string();

        Ok(Self {
            client,
            username,
            api_key,
            sender_id: sender_id.filter(|s| !s.trim().is_empty()),
            base_url,
        })
    }

    /// Override the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "SMSMessageData")]
    data: MessageData,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Recipients", default)]
    recipients: Vec<Recipient>,
}

#[derive(Debug, Deserialize)]
struct Recipient {
    status: String,
    #[serde(rename = "messageId", default)]
    message_id: Option<String>,
}

impl SmsSender for AfricasTalkingSms {
    fn name(&self) -> &str {
        "africastalking"
    }

    async fn send(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let mut form = vec![
            ("username", self.username.as_str()),
            ("to", to),
            ("message", message),
        ];
        if let Some(sender_id) = &self.sender_id {
            form.push(("from", sender_id.as_str()));
        }

        let response = self
            .client
            .post(format!("{}{MESSAGING_PATH}", self.base_url))
            .header("apiKey", self.api_key.expose_secret())
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SmsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|e| SmsError::Malformed(e.to_string()))?;

        let recipient = parsed.data.recipients.first().ok_or_else(|| {
            SmsError::Rejected(if parsed.data.message.is_empty() {
                "no recipients".to_string()
            } else {
                parsed.data.message.clone()
            })
        })?;

        if recipient.status != "Success" {
            return Err(SmsError::Rejected(recipient.status.clone()));
        }

        debug!(message_id = ?recipient.message_id, "SMS accepted by gateway");
        Ok(())
    }
}
