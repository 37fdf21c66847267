//! OTP store trait.
//!
//! Holds at most one live code per phone plus an attempt counter whose
//! window starts at its first increment. Expired entries read as absent.

use std::time::Duration;

use travela_types::error::RepositoryError;

/// Keyed store for OTP codes and request-attempt counters.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait OtpStore: Send + Sync {
    /// Store `code` for `phone`, replacing any previous code. Expires after `ttl`.
    fn put_code(
        &self,
        phone: &str,
        code: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The live code for `phone`, or None if absent or expired.
    fn get_code(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Current attempt count within the live window (0 if none).
    fn attempt_count(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// Increment the attempt counter and return the new count.
    ///
    /// Opens a new window of length `ttl` when no live window exists;
    /// otherwise the existing window's expiry is kept.
    fn record_attempt(
        &self,
        phone: &str,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<u32, RepositoryError>> + Send;

    /// Delete both the code and the attempt counter. No-op if absent.
    fn clear(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
