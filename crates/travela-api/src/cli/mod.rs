//! CLI definitions for the `travela` binary.
//!
//! Uses clap derive macros. Every setting can be given as a flag or through
//! its environment variable; both override the settings file.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use clap_complete::Shell;
use travela_types::config::{AppEnv, Settings};

/// Travel assistant API: phone OTP login, AI answers, saved conversations.
#[derive(Parser)]
#[command(name = "travela", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Only log warnings and errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "LOG_JSON")]
    pub log_json: bool,

    /// Export trace spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve(ServeArgs),

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// Host to bind to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Settings file (TOML). Defaults to `travela.toml` in the working directory.
    #[arg(long, env = "TRAVELA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

/// Per-field overrides for [`Settings`].
#[derive(Args, Default)]
pub struct SettingsArgs {
    /// Product name shown in OTP messages.
    #[arg(long, env = "APP_NAME")]
    pub app_name: Option<String>,

    /// Deployment environment: development, staging or production.
    #[arg(long, env = "APP_ENV")]
    pub app_env: Option<AppEnv>,

    /// Gemini model identifier.
    #[arg(long, env = "GEMINI_MODEL")]
    pub gemini_model: Option<String>,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini API base URL.
    #[arg(long, env = "GEMINI_BASE_URL")]
    pub gemini_base_url: Option<String>,

    /// Let the agent ground answers with Google Search.
    #[arg(
        long,
        env = "AGENT_GOOGLE_SEARCH",
        action = ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub agent_google_search: Option<bool>,

    /// Most recent turns kept per agent session.
    #[arg(long, env = "AGENT_HISTORY_LIMIT")]
    pub agent_history_limit: Option<usize>,

    /// Africa's Talking account username (`sandbox` for the sandbox).
    #[arg(long, env = "AFRICASTALKING_USERNAME")]
    pub africastalking_username: Option<String>,

    /// Africa's Talking API key.
    #[arg(long, env = "AFRICASTALKING_API_KEY", hide_env_values = true)]
    pub africastalking_api_key: Option<String>,

    /// Registered sender id or short code.
    #[arg(long, env = "AFRICASTALKING_SENDER_ID")]
    pub africastalking_sender_id: Option<String>,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Session token signing key.
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret_key: Option<String>,

    /// Session token algorithm: HS256, HS384 or HS512.
    #[arg(long, env = "JWT_ALGORITHM")]
    pub jwt_algorithm: Option<String>,

    /// Session token lifetime in minutes.
    #[arg(long, env = "JWT_ACCESS_TOKEN_EXPIRE_MINUTES")]
    pub jwt_access_token_expire_minutes: Option<i64>,

    /// Allowed CORS origins, comma separated (`*` for any).
    #[arg(long, env = "ALLOWED_HOSTS", value_delimiter = ',')]
    pub allowed_hosts: Option<Vec<String>>,

    /// OTP lifetime in seconds.
    #[arg(long, env = "OTP_EXPIRY_SECONDS")]
    pub otp_expiry_seconds: Option<u64>,

    /// OTP requests allowed per phone within one expiry window.
    #[arg(long, env = "OTP_MAX_ATTEMPTS")]
    pub otp_max_attempts: Option<u32>,
}

impl SettingsArgs {
    /// Overlay the given values onto `settings`.
    pub fn apply(self, mut settings: Settings) -> Settings {
        fn set<T>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut settings.app_name, self.app_name);
        set(&mut settings.app_env, self.app_env);
        set(&mut settings.gemini_model, self.gemini_model);
        set(&mut settings.gemini_api_key, self.gemini_api_key);
        set(&mut settings.gemini_base_url, self.gemini_base_url);
        set(&mut settings.agent_google_search, self.agent_google_search);
        set(&mut settings.agent_history_limit, self.agent_history_limit);
        set(&mut settings.africastalking_username, self.africastalking_username);
        set(&mut settings.africastalking_api_key, self.africastalking_api_key);
        if self.africastalking_sender_id.is_some() {
            settings.africastalking_sender_id = self.africastalking_sender_id;
        }
        set(&mut settings.database_url, self.database_url);
        set(&mut settings.jwt_secret_key, self.jwt_secret_key);
        set(&mut settings.jwt_algorithm, self.jwt_algorithm);
        set(
            &mut settings.jwt_access_token_expire_minutes,
            self.jwt_access_token_expire_minutes,
        );
        if let Some(hosts) = self.allowed_hosts {
            let hosts: Vec<String> = hosts
                .into_iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect();
            if !hosts.is_empty() {
                settings.allowed_hosts = hosts;
            }
        }
        set(&mut settings.otp_expiry_seconds, self.otp_expiry_seconds);
        set(&mut settings.otp_max_attempts, self.otp_max_attempts);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_overrides_only_given_fields() {
        let args = SettingsArgs {
            app_env: Some(AppEnv::Production),
            otp_max_attempts: Some(5),
            allowed_hosts: Some(vec![
                "https://travela.app".to_string(),
                " ".to_string(),
                " http://localhost:3000".to_string(),
            ]),
            ..SettingsArgs::default()
        };
        let settings = args.apply(Settings::default());
        assert_eq!(settings.app_env, AppEnv::Production);
        assert_eq!(settings.otp_max_attempts, 5);
        assert_eq!(
            settings.allowed_hosts,
            vec!["https://travela.app", "http://localhost:3000"]
        );
        assert_eq!(settings.jwt_algorithm, "HS256");
        assert_eq!(settings.app_name, "travela");
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "travela",
            "-v",
            "serve",
            "--port",
            "9000",
            "--app-env",
            "prod",
            "--agent-google-search",
            "false",
            "--allowed-hosts",
            "https://a.example,https://b.example",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Serve(serve) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(serve.port, 9000);
        assert_eq!(serve.settings.app_env, Some(AppEnv::Production));
        assert_eq!(serve.settings.agent_google_search, Some(false));
        assert_eq!(
            serve.settings.allowed_hosts,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
    }
}
