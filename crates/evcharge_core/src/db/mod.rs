//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the charging manager.
//! - Apply schema migrations in deterministic order.
//! - Classify SQLite failures so constraint violations stay distinguishable.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Statements run in autocommit mode; every write commits on its own.

use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Category of a storage-level constraint failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    Other,
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Schema constraint rejected a write (UNIQUE, FOREIGN KEY, ...).
    ConstraintViolation {
        kind: ConstraintKind,
        message: String,
        source: rusqlite::Error,
    },
    Io(std::io::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Builds a constraint violation without an underlying SQLite error.
    ///
    /// Used by non-SQLite repositories that emulate schema constraints.
    pub fn unique_violation(table: &str, column: &str) -> Self {
        let message = format!("UNIQUE constraint failed: {table}.{column}");
        Self::ConstraintViolation {
            kind: ConstraintKind::Unique,
            source: rusqlite::Error::SqliteFailure(
                ffi::Error {
                    code: ffi::ErrorCode::ConstraintViolation,
                    extended_code: ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(message.clone()),
            ),
            message,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Returns `table.column` for a UNIQUE violation, `None` otherwise.
    pub fn unique_target(&self) -> Option<&str> {
        match self {
            Self::ConstraintViolation {
                kind: ConstraintKind::Unique,
                message,
                ..
            } => message
                .strip_prefix("UNIQUE constraint failed: ")
                .map(str::trim),
            _ => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::ConstraintViolation { message, .. } => {
                write!(f, "constraint violation: {message}")
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ConstraintViolation { source, .. } => Some(source),
            Self::Io(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        let classified = match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == ffi::ErrorCode::ConstraintViolation =>
            {
                let kind = match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        ConstraintKind::Unique
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
                    _ => ConstraintKind::Other,
                };
                Some((kind, message.clone().unwrap_or_else(|| err.to_string())))
            }
            _ => None,
        };

        match classified {
            Some((kind, message)) => Self::ConstraintViolation {
                kind,
                message,
                source: value,
            },
            None => Self::Sqlite(value),
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConstraintKind, DbError};

    #[test]
    fn unique_violation_exposes_target_column() {
        let err = DbError::unique_violation("users", "rfid_code");
        assert!(err.is_constraint_violation());
        assert_eq!(err.unique_target(), Some("users.rfid_code"));
    }

    #[test]
    fn non_constraint_errors_stay_generic() {
        let err = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(!err.is_constraint_violation());
        assert!(err.unique_target().is_none());
    }

    #[test]
    fn sqlite_unique_failure_is_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err = DbError::from(
            conn.execute("INSERT INTO t VALUES ('a');", [])
                .unwrap_err(),
        );
        match &err {
            DbError::ConstraintViolation { kind, .. } => {
                assert_eq!(*kind, ConstraintKind::Unique);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.unique_target(), Some("t.v"));
    }
}
