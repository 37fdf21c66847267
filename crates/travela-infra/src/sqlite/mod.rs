//! SQLite storage layer.
//!
//! Repository and store implementations backed by SQLite with WAL mode and
//! split read/write connection pools.

use chrono::{DateTime, SecondsFormat, Utc};
use travela_types::error::RepositoryError;

pub mod conversation;
pub mod otp;
pub mod pool;
pub mod user;

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

// Fixed-width UTC text so ORDER BY on the column is chronological.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}
