//! User repository trait definition.

use travela_types::error::RepositoryError;
use travela_types::user::User;

/// Repository trait for phone-keyed user records.
///
/// Implementations live in travela-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait UserRepository: Send + Sync {
    /// Look a user up by normalized phone number.
    fn get_user(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Return the existing user for `phone`, creating an unauthenticated one if absent.
    fn get_or_create_user(
        &self,
        phone: &str,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Mark the user authenticated under a new session id.
    ///
    /// Returns `RepositoryError::NotFound` if no user exists for `phone`.
    fn start_session(
        &self,
        phone: &str,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;
}
