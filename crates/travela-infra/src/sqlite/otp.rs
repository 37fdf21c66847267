//! SQLite OTP store: codes and attempt counters with expiry.
//!
//! Expiry instants are unix milliseconds. Rows past their expiry are treated
//! as absent by every read and are overwritten by the next write.

use std::time::Duration;

use chrono::Utc;
use sqlx::Row;
use travela_core::storage::otp_store::OtpStore;
use travela_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of `OtpStore`.
pub struct SqliteOtpStore {
    pool: DatabasePool,
}

impl SqliteOtpStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Delete expired codes and counters. Returns the number of rows removed.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let now = now_ms();
        let mut removed = 0;
        for sql in [
            "DELETE FROM otp_codes WHERE expires_at <= ?",
            "DELETE FROM otp_attempts WHERE expires_at <= ?",
        ] {
            removed += sqlx::query(sql)
                .bind(now)
                .execute(&self.pool.writer)
                .await
                .map_err(query_error)?
                .rows_affected();
        }
        Ok(removed)
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

fn expiry_ms(ttl: Duration) -> i64 {
    now_ms().saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX))
}

impl OtpStore for SqliteOtpStore {
    async fn put_code(&self, phone: &str, code: &str, ttl: Duration) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO otp_codes (phone, code, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(phone) DO UPDATE SET code = excluded.code, expires_at = excluded.expires_at",
        )
        .bind(phone)
        .bind(code)
        .bind(expiry_ms(ttl))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;
        Ok(())
    }

    async fn get_code(&self, phone: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT code FROM otp_codes WHERE phone = ? AND expires_at > ?")
            .bind(phone)
            .bind(now_ms())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|r| r.try_get::<String, _>("code"))
            .transpose()
            .map_err(query_error)
    }

    async fn attempt_count(&self, phone: &str) -> Result<u32, RepositoryError> {
        let row = sqlx::query("SELECT count FROM otp_attempts WHERE phone = ? AND expires_at > ?")
            .bind(phone)
            .bind(now_ms())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let count: i64 = row.try_get("count").map_err(query_error)?;
                Ok(count as u32)
            }
            None => Ok(0),
        }
    }

    async fn record_attempt(&self, phone: &str, ttl: Duration) -> Result<u32, RepositoryError> {
        // A lapsed window restarts at 1 with a fresh expiry; a live one keeps its expiry.
        let row = sqlx::query(
            "INSERT INTO otp_attempts (phone, count, expires_at) VALUES (?1, 1, ?2)
             ON CONFLICT(phone) DO UPDATE SET
                 count = CASE WHEN otp_attempts.expires_at <= ?3 THEN 1 ELSE otp_attempts.count + 1 END,
                 expires_at = CASE WHEN otp_attempts.expires_at <= ?3 THEN excluded.expires_at ELSE otp_attempts.expires_at END
             RETURNING count",
        )
        .bind(phone)
        .bind(expiry_ms(ttl))
        .bind(now_ms())
        .fetch_one(&self.pool.writer)
        .await
        .map_err(query_error)?;

        let count: i64 = row.try_get("count").map_err(query_error)?;
        Ok(count as u32)
    }

    async fn clear(&self, phone: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        sqlx::query("DELETE FROM otp_codes WHERE phone = ?")
            .bind(phone)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query("DELETE FROM otp_attempts WHERE phone = ?")
            .bind(phone)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)
    }
}
