//! SMS delivery port.
//!
//! The OTP service hands codes to an `SmsSender`; the concrete gateway
//! client lives in travela-infra.

use travela_types::error::SmsError;

/// Trait for SMS gateways.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait SmsSender: Send + Sync {
    /// Gateway name for logs (e.g., "africastalking").
    fn name(&self) -> &str;

    /// Send `message` to a single recipient.
    ///
    /// Succeeds only when the gateway reports the message as accepted for
    /// delivery; transport failures and rejected statuses are errors.
    fn send(
        &self,
        to: &str,
        message: &str,
    ) -> impl std::future::Future<Output = Result<(), SmsError>> + Send;
}
