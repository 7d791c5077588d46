//! Core domain logic for the EV charging condominium manager.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod export;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, ConstraintKind, DbError, DbResult};
pub use export::{export_condos, export_users, ExportError};
pub use import::{load_condos, load_users, parse_condos, parse_users, LoadError, UserRecord};
pub use logging::{init_logging, logging_status};
pub use model::condo::{Condo, CondoId};
pub use model::user::{Measurement, User, UserId, VehicleType};
pub use model::validation::{normalize_rfid, normalize_vehicle_type, ValidationError};
pub use repo::condo_repo::{CondoRepository, SqliteCondoRepository};
pub use repo::memory::{MemoryCondoRepository, MemoryUserRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::condo_service::{CondoDeleteOutcome, CondoService};
pub use service::user_service::{UserImportReport, UserService, NO_MEASUREMENT_MESSAGE};
pub use service::{LookupBy, ServiceError, ServiceResult};

