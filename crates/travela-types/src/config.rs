//! Application settings.
//!
//! `Settings` is assembled from built-in defaults, an optional TOML file and
//! environment/CLI overrides. Every field has a default so a bare
//! development run needs no configuration at all.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder signing key used when none is configured.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Staging,
    Production,
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Development => write!(f, "development"),
            AppEnv::Staging => write!(f, "staging"),
            AppEnv::Production => write!(f, "production"),
        }
    }
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "staging" => Ok(AppEnv::Staging),
            "production" | "prod" => Ok(AppEnv::Production),
            other => Err(format!("invalid app environment: '{other}'")),
        }
    }
}

/// Top-level settings for the Travela API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app_name: String,
    pub app_env: AppEnv,

    /// Hosted agent model identifier.
    pub gemini_model: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    /// Let the agent ground answers with Google Search.
    pub agent_google_search: bool,
    /// Most recent turns kept per agent session.
    pub agent_history_limit: usize,
    /// Persona instruction sent with every agent request.
    pub agent_instruction: String,

    pub africastalking_username: String,
    pub africastalking_api_key: String,
    pub africastalking_sender_id: Option<String>,

    pub database_url: String,

    pub jwt_secret_key: String,
    pub jwt_algorithm: String,
    pub jwt_access_token_expire_minutes: i64,

    /// Allowed CORS origins; `*` allows any.
    pub allowed_hosts: Vec<String>,

    pub otp_expiry_seconds: u64,
    pub otp_max_attempts: u32,
}

impl Settings {
    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    /// Whether the token signing key is still the built-in placeholder.
    pub fn uses_default_jwt_secret(&self) -> bool {
        self.jwt_secret_key == DEFAULT_JWT_SECRET
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "travela".to_string(),
            app_env: AppEnv::Development,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_api_key: String::new(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            agent_google_search: true,
            agent_history_limit: 40,
            agent_instruction: "You are Travela, an AI travel assistant who can answer questions \
                about travel destinations, provide travel tips, and help users plan their trips."
                .to_string(),
            africastalking_username: String::new(),
            africastalking_api_key: String::new(),
            africastalking_sender_id: None,
            database_url: "sqlite://travela.db?mode=rwc".to_string(),
            jwt_secret_key: DEFAULT_JWT_SECRET.to_string(),
            jwt_algorithm: "HS256".to_string(),
            jwt_access_token_expire_minutes: 30,
            allowed_hosts: vec!["*".to_string()],
            otp_expiry_seconds: 300,
            otp_max_attempts: 3,
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

// Secrets never appear in Debug output.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("app_env", &self.app_env)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("agent_google_search", &self.agent_google_search)
            .field("agent_history_limit", &self.agent_history_limit)
            .field("africastalking_username", &self.africastalking_username)
            .field("africastalking_api_key", &redact(&self.africastalking_api_key))
            .field("africastalking_sender_id", &self.africastalking_sender_id)
            .field("database_url", &self.database_url)
            .field("jwt_secret_key", &redact(&self.jwt_secret_key))
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field(
                "jwt_access_token_expire_minutes",
                &self.jwt_access_token_expire_minutes,
            )
            .field("allowed_hosts", &self.allowed_hosts)
            .field("otp_expiry_seconds", &self.otp_expiry_seconds)
            .field("otp_max_attempts", &self.otp_max_attempts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.app_name, "travela");
        assert!(settings.is_development());
        assert_eq!(settings.jwt_algorithm, "HS256");
        assert_eq!(settings.jwt_access_token_expire_minutes, 30);
        assert_eq!(settings.otp_max_attempts, 3);
        assert_eq!(settings.allowed_hosts, vec!["*"]);
        assert!(settings.uses_default_jwt_secret());
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.gemini_model, "gemini-2.0-flash");
        assert_eq!(settings.otp_expiry_seconds, 300);
    }

    #[test]
    fn test_settings_deserialize_with_values() {
        let toml_str = r#"
app_env = "production"
otp_max_attempts = 5
allowed_hosts = ["https://travela.app", "http://localhost:3000"]
africastalking_sender_id = "TRAVELA"
"#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.app_env, AppEnv::Production);
        assert_eq!(settings.otp_max_attempts, 5);
        assert_eq!(settings.allowed_hosts.len(), 2);
        assert_eq!(settings.africastalking_sender_id.as_deref(), Some("TRAVELA"));
        // untouched fields keep their defaults
        assert_eq!(settings.jwt_algorithm, "HS256");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let settings = Settings {
            jwt_secret_key: "super-secret-signing-key".to_string(),
            gemini_api_key: "AIza-test".to_string(),
            ..Settings::default()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("super-secret-signing-key"));
        assert!(!debug.contains("AIza-test"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_app_env_parse() {
        assert_eq!("Production".parse::<AppEnv>().unwrap(), AppEnv::Production);
        assert_eq!("dev".parse::<AppEnv>().unwrap(), AppEnv::Development);
        assert!("qa".parse::<AppEnv>().is_err());
    }
}
