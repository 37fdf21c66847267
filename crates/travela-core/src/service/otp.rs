//! OTP service: issue, deliver and verify one-time passcodes.
//!
//! `OtpService` depends only on the `UserRepository`, `OtpStore` and
//! `SmsSender` ports. Codes are single use: a successful verification
//! deletes both the code and the attempt counter.

use std::time::Duration;

use rand::Rng;
use tracing::{error, info, warn};
use travela_types::auth::SessionIdentity;
use travela_types::error::{OtpError, RepositoryError};
use travela_types::phone::{mask_phone, normalize_phone};
use uuid::Uuid;

use crate::repository::user::UserRepository;
use crate::sms::SmsSender;
use crate::storage::otp_store::OtpStore;

/// Knobs for OTP issuance.
#[derive(Debug, Clone)]
pub struct OtpPolicy {
    /// Lifetime of a code, and of the attempt-counter window.
    pub ttl: Duration,
    /// OTP requests allowed per phone within one window.
    pub max_attempts: u32,
    /// Skip SMS and hand the code back to the caller.
    pub development: bool,
    /// Product name used in the SMS text.
    pub app_name: String,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_attempts: 3,
            development: false,
            app_name: "travela".to_string(),
        }
    }
}

/// Outcome of a successful OTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpIssued {
    /// Normalized phone the code was issued for.
    pub phone: String,
    /// Client-facing message.
    pub message: String,
    /// The code itself, only in development mode.
    pub dev_code: Option<String>,
}

pub struct OtpService<U: UserRepository, O: OtpStore, S: SmsSender> {
    users: U,
    store: O,
    sms: S,
    policy: OtpPolicy,
}

impl<U: UserRepository, O: OtpStore, S: SmsSender> OtpService<U, O, S> {
    pub fn new(users: U, store: O, sms: S, policy: OtpPolicy) -> Self {
        Self {
            users,
            store,
            sms,
            policy,
        }
    }

    pub fn policy(&self) -> &OtpPolicy {
        &self.policy
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    /// Issue a fresh code for `raw_phone` and deliver it.
    ///
    /// Creates the user on first contact. Fails with `RateLimited` once the
    /// attempt counter has reached the ceiling within its window.
    pub async fn request_otp(&self, raw_phone: &str) -> Result<OtpIssued, OtpError> {
        let phone = normalize(raw_phone)?;
        self.users.get_or_create_user(&phone).await?;

        let attempts = self.store.attempt_count(&phone).await?;
        if attempts >= self.policy.max_attempts {
            warn!(phone = %mask_phone(&phone), attempts, "OTP request rate limited");
            return Err(OtpError::RateLimited {
                max_attempts: self.policy.max_attempts,
            });
        }

        let code = generate_code();
        self.store.put_code(&phone, &code, self.policy.ttl).await?;
        let attempts = self.store.record_attempt(&phone, self.policy.ttl).await?;

        if self.policy.development {
            info!(phone = %mask_phone(&phone), attempts, "OTP issued (development mode, SMS skipped)");
            return Ok(OtpIssued {
                message: format!("OTP sent in development mode {code}"),
                phone,
                dev_code: Some(code),
            });
        }

        let text = format!("Your {} OTP: {code}", self.policy.app_name);
        if let Err(e) = self.sms.send(&phone, &text).await {
            error!(
                gateway = self.sms.name(),
                phone = %mask_phone(&phone),
                error = %e,
                "OTP delivery failed"
            );
            return Err(OtpError::DeliveryFailed(e.to_string()));
        }

        info!(gateway = self.sms.name(), phone = %mask_phone(&phone), attempts, "OTP issued");
        Ok(OtpIssued {
            phone,
            message: "OTP sent".to_string(),
            dev_code: None,
        })
    }

    /// Check `code` against the live OTP for `raw_phone`.
    ///
    /// On a match the user is marked authenticated under a new session id
    /// and the OTP is consumed. On a mismatch nothing is modified.
    pub async fn verify_otp(
        &self,
        raw_phone: &str,
        code: &str,
    ) -> Result<SessionIdentity, OtpError> {
        let phone = normalize(raw_phone)?;

        let stored = self.store.get_code(&phone).await?;
        match stored {
            Some(stored) if stored == code.trim() => {}
            _ => {
                warn!(phone = %mask_phone(&phone), "OTP verification failed");
                return Err(OtpError::InvalidOtp);
            }
        }

        if self.users.get_user(&phone).await?.is_none() {
            return Err(OtpError::UserNotFound(phone));
        }

        let session_id = Uuid::new_v4().simple().to_string();
        self.users
            .start_session(&phone, &session_id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => OtpError::UserNotFound(phone.clone()),
                other => OtpError::Storage(other),
            })?;
        self.store.clear(&phone).await?;

        info!(phone = %mask_phone(&phone), "User verified");
        Ok(SessionIdentity { phone, session_id })
    }
}

fn normalize(raw_phone: &str) -> Result<String, OtpError> {
    normalize_phone(raw_phone).ok_or_else(|| OtpError::InvalidPhone(raw_phone.to_string()))
}

/// Uniformly random 6-digit code.
fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}
