//! SQLite user repository implementation.

use chrono::Utc;
use sqlx::Row;
use travela_core::repository::user::UserRepository;
use travela_types::error::RepositoryError;
use travela_types::user::User;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    // Reads that follow a write in the same call go through the writer so
    // they observe it.
    async fn fetch(
        &self,
        phone: &str,
        executor: &sqlx::SqlitePool,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_optional(executor)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(query_error)?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

struct UserRow {
    phone: String,
    authenticated: bool,
    session_id: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            phone: row.try_get("phone")?,
            authenticated: row.try_get("authenticated")?,
            session_id: row.try_get("session_id")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        Ok(User {
            phone: self.phone,
            authenticated: self.authenticated,
            session_id: self.session_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

impl UserRepository for SqliteUserRepository {
    async fn get_user(&self, phone: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch(phone, &self.pool.reader).await
    }

    async fn get_or_create_user(&self, phone: &str) -> Result<User, RepositoryError> {
        let user = User::new(phone.to_string());
        sqlx::query(
            "INSERT INTO users (phone, authenticated, session_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(phone) DO NOTHING",
        )
        .bind(&user.phone)
        .bind(user.authenticated)
        .bind(&user.session_id)
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        self.fetch(phone, &self.pool.writer)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn start_session(&self, phone: &str, session_id: &str) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET authenticated = 1, session_id = ?, updated_at = ? WHERE phone = ?",
        )
        .bind(session_id)
        .bind(format_datetime(&Utc::now()))
        .bind(phone)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.fetch(phone, &self.pool.writer)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    const PHONE: &str = "+254712345678";

    #[tokio::test]
    async fn test_get_missing_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        assert!(repo.get_user(PHONE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let repo = SqliteUserRepository::new(test_pool().await);

        let first = repo.get_or_create_user(PHONE).await.unwrap();
        assert_eq!(first.phone, PHONE);
        assert!(!first.authenticated);
        assert!(first.session_id.is_empty());

        let second = repo.get_or_create_user(PHONE).await.unwrap();
        assert_eq!(second.created_at, first.created_at);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&repo.pool.reader)
            .await
            .unwrap();
        assert_eq!(count.0, 1);
    }

    #[tokio::test]
    async fn test_start_session() {
        let repo = SqliteUserRepository::new(test_pool().await);
        repo.get_or_create_user(PHONE).await.unwrap();

        let user = repo.start_session(PHONE, "0123abcd").await.unwrap();
        assert!(user.authenticated);
        assert_eq!(user.session_id, "0123abcd");

        let user = repo.start_session(PHONE, "fedc9876").await.unwrap();
        assert_eq!(user.session_id, "fedc9876");

        let fetched = repo.get_user(PHONE).await.unwrap().unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_start_session_unknown_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let err = repo.start_session(PHONE, "abc").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
