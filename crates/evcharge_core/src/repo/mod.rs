//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one data access contract per entity (`Condo`, `User`).
//! - Isolate SQLite query details from service orchestration.
//! - Provide in-memory implementations of the same contracts.
//!
//! # Invariants
//! - Repository writes enforce entity `validate()` before persistence.
//! - Storage errors (including constraint violations) propagate unchanged.
//! - No cross-entity logic lives here.

use crate::db::DbError;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod condo_repo;
pub mod memory;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// `update` was called on an entity that was never persisted.
    MissingId(&'static str),
    InvalidData(String),
}

impl RepoError {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }

    /// Returns `table.column` when this is a storage UNIQUE violation.
    pub fn unique_target(&self) -> Option<&str> {
        match self {
            Self::Db(err) => err.unique_target(),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingId(entity) => write!(f, "{entity} id is required for update"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingId(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::from(value))
    }
}
