//! Error types for the SQLite backend.

use oxide_dal_core::DriverError;
use sqlx::error::ErrorKind;

/// Errors raised while opening a database.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    /// The async runtime could not be started.
    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// Database error while connecting.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for opening a database.
pub type Result<T> = std::result::Result<T, SqliteError>;

/// SQLSTATE reported for constraint violations.
const INTEGRITY_VIOLATION: &str = "23000";

/// Maps a sqlx error onto the driver error reported to the core crate.
///
/// SQLite has no SQLSTATE of its own; constraint violations are tagged with
/// the integrity-violation class and the extended result code becomes the
/// vendor code.
pub(crate) fn driver_error(error: sqlx::Error) -> DriverError {
    match error {
        sqlx::Error::Database(db) => {
            let mut driver = DriverError::new(db.message());
            if let Some(code) = db.code().and_then(|code| code.parse::<i64>().ok()) {
                driver = driver.with_vendor_code(code);
            }
            match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => driver.with_sql_state(INTEGRITY_VIOLATION),
                _ => driver,
            }
        }
        other => DriverError::new(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error() {
        let driver = driver_error(sqlx::Error::RowNotFound);
        assert!(driver.sql_state.is_none());
        assert!(driver.vendor_code.is_none());
        assert!(!driver.message.is_empty());
    }
}
