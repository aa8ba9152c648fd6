mod follow_store;
mod post_store;
mod user_store;

pub use follow_store::SqliteFollowStore;
pub use post_store::SqlitePostStore;
pub use user_store::SqliteUserStore;

use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;

use crate::domain::error::DomainError;

/// Instants are persisted as microseconds since the Unix epoch so SQL range
/// comparisons are exact.
fn micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

fn instant_from_micros(value: i64) -> Result<DateTime<Utc>, DomainError> {
    DateTime::from_timestamp_micros(value)
        .ok_or_else(|| DomainError::Storage(format!("timestamp out of range: {value}")))
}

fn map_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.kind() {
            ErrorKind::UniqueViolation => {
                return DomainError::AlreadyExists(db_err.message().to_string());
            }
            ErrorKind::ForeignKeyViolation => {
                return DomainError::NotFound("referenced row".to_string());
            }
            _ => {}
        }
    }
    DomainError::Storage(err.to_string())
}
