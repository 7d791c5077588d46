//! Core use-case services.
//!
//! # Responsibility
//! - Enforce cross-entity rules (condo must exist, delete guard).
//! - Normalize user input before it reaches repositories.
//! - Keep the presentation layer decoupled from storage details.
//!
//! # Invariants
//! - Storage UNIQUE violations are translated into domain errors; only condo
//!   registration also pre-checks the name.
//! - Every other repository error passes through unchanged as `Repo`.

use crate::import::LoadError;
use crate::model::user::UserId;
use crate::model::validation::ValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod condo_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error shared by condo and user use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Malformed field value.
    Validation(ValidationError),
    /// Another condo already uses this name.
    DuplicateName(String),
    /// Another user already holds this RFID code.
    DuplicateRfid(String),
    /// Referenced condo name does not resolve.
    CondoNotFound(String),
    /// Target user does not exist.
    UserNotFound(UserId),
    /// Unrecognized lookup mode or unparsable lookup value.
    InvalidArgument(String),
    /// Import file could not be read or parsed.
    Load(LoadError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// True for uniqueness failures, translated or raw.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::DuplicateName(_) | Self::DuplicateRfid(_) => true,
            Self::Repo(err) => err.is_constraint_violation(),
            _ => false,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "a condo named `{name}` already exists"),
            Self::DuplicateRfid(rfid) => {
                write!(f, "RFID `{rfid}` is already assigned to another user")
            }
            Self::CondoNotFound(name) => {
                write!(f, "condo `{name}` not found; register the condo first")
            }
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Load(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Load(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LoadError> for ServiceError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Lookup mode accepted by the `get` use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupBy {
    Id,
    Name,
}

impl FromStr for LookupBy {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            other => Err(ServiceError::InvalidArgument(format!(
                "lookup mode must be `id` or `name`, got `{other}`"
            ))),
        }
    }
}

fn parse_lookup_id(value: &str) -> ServiceResult<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        ServiceError::InvalidArgument(format!("id must be an integer, got `{}`", value.trim()))
    })
}
