//! Application state wiring all services together.
//!
//! Services are generic over repository/store/gateway traits; AppState pins
//! them to the concrete infra implementations. The agent provider is
//! type-erased so tests can wire a stub in place of Gemini.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;

use travela_core::agent::box_provider::BoxAgentProvider;
use travela_core::agent::gateway::{ChatGateway, GatewayConfig};
use travela_core::chat::service::ConversationService;
use travela_core::service::auth::AuthService;
use travela_core::service::otp::{OtpPolicy, OtpService};
use travela_infra::llm::create_agent_provider;
use travela_infra::sms::africastalking::AfricasTalkingSms;
use travela_infra::sqlite::conversation::SqliteConversationRepository;
use travela_infra::sqlite::otp::SqliteOtpStore;
use travela_infra::sqlite::pool::DatabasePool;
use travela_infra::sqlite::user::SqliteUserRepository;
use travela_types::config::Settings;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteOtpService = OtpService<SqliteUserRepository, SqliteOtpStore, AfricasTalkingSms>;

pub type ConcreteConversationService = ConversationService<SqliteConversationRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub otp_service: Arc<ConcreteOtpService>,
    pub auth_service: Arc<AuthService>,
    pub conversation_service: Arc<ConcreteConversationService>,
    pub gateway: Arc<ChatGateway>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: open the database, build the
    /// outbound clients, wire services.
    pub async fn init(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&settings.database_url)
            .await
            .with_context(|| format!("failed to open database {}", settings.database_url))?;
        let provider =
            create_agent_provider(&settings).context("failed to build agent HTTP client")?;
        Self::with_provider(settings, db_pool, provider)
    }

    /// Wire services over an open pool with the given agent provider.
    pub fn with_provider(
        settings: Settings,
        db_pool: DatabasePool,
        provider: BoxAgentProvider,
    ) -> anyhow::Result<Self> {
        let sms = AfricasTalkingSms::new(
            settings.africastalking_username.clone(),
            SecretString::from(settings.africastalking_api_key.clone()),
            settings.africastalking_sender_id.clone(),
        )
        .context("failed to build SMS HTTP client")?;

        let otp_service = OtpService::new(
            SqliteUserRepository::new(db_pool.clone()),
            SqliteOtpStore::new(db_pool.clone()),
            sms,
            OtpPolicy {
                ttl: Duration::from_secs(settings.otp_expiry_seconds),
                max_attempts: settings.otp_max_attempts,
                development: settings.is_development(),
                app_name: settings.app_name.clone(),
            },
        );

        let token_ttl = token_lifetime(settings.jwt_access_token_expire_minutes)?;
        let auth_service = AuthService::new(
            &settings.jwt_secret_key,
            &settings.jwt_algorithm,
            token_ttl,
        )?;

        let conversation_service =
            ConversationService::new(SqliteConversationRepository::new(db_pool.clone()));

        let gateway = ChatGateway::new(
            provider,
            GatewayConfig {
                system: Some(settings.agent_instruction.clone()),
                web_search: settings.agent_google_search,
                history_limit: settings.agent_history_limit,
                session_idle_ttl: token_ttl.to_std()?,
            },
        );

        Ok(Self {
            settings: Arc::new(settings),
            otp_service: Arc::new(otp_service),
            auth_service: Arc::new(auth_service),
            conversation_service: Arc::new(conversation_service),
            gateway: Arc::new(gateway),
            db_pool,
        })
    }
}

/// Validate the configured token lifetime.
fn token_lifetime(minutes: i64) -> anyhow::Result<chrono::Duration> {
    if minutes <= 0 {
        anyhow::bail!("jwt_access_token_expire_minutes must be positive, got {minutes}");
    }
    chrono::Duration::try_minutes(minutes)
        .with_context(|| format!("jwt_access_token_expire_minutes is out of range: {minutes}"))
}
