//! Condo use-case service.
//!
//! # Responsibility
//! - Register, import, query, update and delete condos.
//! - Guard deletion of condos that still have users.
//!
//! # Invariants
//! - Condo names are unique; duplicates surface as `DuplicateName`.
//! - Bulk import skips existing names instead of failing.
//! - `delete` re-reads occupancy on every call and reports domain outcomes
//!   as a value, not as an error.

use crate::import::load_condos;
use crate::model::condo::{Condo, CondoId};
use crate::repo::condo_repo::CondoRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{parse_lookup_id, LookupBy, ServiceError, ServiceResult};
use log::{info, warn};
use std::path::Path;

/// Result of a guarded condo deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CondoDeleteOutcome {
    Deleted,
    NotFound,
    /// Users still reference the condo by name.
    Blocked { user_count: u64 },
}

impl CondoDeleteOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Operator-facing description of the outcome.
    pub fn message(self) -> &'static str {
        match self {
            Self::Deleted => "Condo deleted successfully.",
            Self::NotFound => "Condo not found.",
            Self::Blocked { .. } => {
                "Users are still linked to this condo; deletion not allowed."
            }
        }
    }
}

/// Condo service facade over repository implementations.
pub struct CondoService<C: CondoRepository, U: UserRepository> {
    condos: C,
    users: U,
}

impl<C: CondoRepository, U: UserRepository> CondoService<C, U> {
    /// Creates a service using the provided repository implementations.
    pub fn new(condos: C, users: U) -> Self {
        Self { condos, users }
    }

    /// Registers a new condo and returns its id.
    ///
    /// # Errors
    /// - `DuplicateName` when a condo with `name` already exists.
    /// - `Validation` when a field is out of range.
    pub fn register(
        &self,
        name: &str,
        apartments_count: u32,
        chargers_count: u32,
        charger_type: &str,
        state: &str,
        energy_price: f64,
    ) -> ServiceResult<CondoId> {
        if self.condos.get_by_name(name)?.is_some() {
            return Err(ServiceError::DuplicateName(name.to_string()));
        }

        let condo = Condo::new(
            name,
            apartments_count,
            chargers_count,
            charger_type,
            state,
            energy_price,
        );
        condo.validate()?;
        let id = self
            .condos
            .create(&condo)
            .map_err(|err| translate_error(err, &condo))?;
        info!("event=condo_register module=service status=ok id={id}");
        Ok(id)
    }

    /// Creates every condo whose name is not registered yet.
    ///
    /// Returns how many condos were created. Not atomic: a storage failure
    /// stops the batch but keeps the condos created before it.
    pub fn import_bulk(&self, condos: &[Condo]) -> ServiceResult<usize> {
        let mut created = 0;
        for condo in condos {
            if self.condos.get_by_name(&condo.name)?.is_some() {
                warn!(
                    "event=condo_import module=service status=skipped reason=duplicate_name name={}",
                    condo.name
                );
                continue;
            }
            self.condos
                .create(condo)
                .map_err(|err| translate_error(err, condo))?;
            created += 1;
        }
        info!("event=condo_import module=service status=ok created={created}");
        Ok(created)
    }

    /// Loads a condo import file and feeds it to `import_bulk`.
    ///
    /// A malformed file fails before any condo is persisted.
    pub fn import_from_file(&self, path: impl AsRef<Path>) -> ServiceResult<usize> {
        let condos = load_condos(path)?;
        self.import_bulk(&condos)
    }

    /// Looks a condo up by a textual mode (`id` or `name`).
    pub fn get(&self, by: &str, value: &str) -> ServiceResult<Option<Condo>> {
        match by.parse::<LookupBy>()? {
            LookupBy::Id => self.get_by_id(parse_lookup_id(value)?),
            LookupBy::Name => self.get_by_name(value),
        }
    }

    pub fn get_by_id(&self, id: CondoId) -> ServiceResult<Option<Condo>> {
        Ok(self.condos.get_by_id(id)?)
    }

    pub fn get_by_name(&self, name: &str) -> ServiceResult<Option<Condo>> {
        Ok(self.condos.get_by_name(name)?)
    }

    /// Lists all condos ordered by id.
    pub fn list(&self) -> ServiceResult<Vec<Condo>> {
        Ok(self.condos.list_all()?)
    }

    /// Persists every field of `condo` unconditionally.
    ///
    /// Renaming cascades to the users' condo reference at storage level.
    pub fn update(&self, condo: &Condo) -> ServiceResult<()> {
        self.condos
            .update(condo)
            .map_err(|err| translate_error(err, condo))?;
        info!(
            "event=condo_update module=service status=ok id={}",
            condo.id.unwrap_or_default()
        );
        Ok(())
    }

    /// Deletes a condo unless users still reference it.
    pub fn delete(&self, id: CondoId) -> ServiceResult<CondoDeleteOutcome> {
        let Some(condo) = self.condos.get_by_id(id)? else {
            return Ok(CondoDeleteOutcome::NotFound);
        };

        let user_count = self.users.count_by_condo(&condo.name)?;
        if user_count > 0 {
            info!(
                "event=condo_delete module=service status=blocked id={id} user_count={user_count}"
            );
            return Ok(CondoDeleteOutcome::Blocked { user_count });
        }

        self.condos.delete(id)?;
        info!("event=condo_delete module=service status=ok id={id}");
        Ok(CondoDeleteOutcome::Deleted)
    }
}

fn translate_error(err: RepoError, condo: &Condo) -> ServiceError {
    match err.unique_target() {
        Some("condos.name") => ServiceError::DuplicateName(condo.name.clone()),
        _ => err.into(),
    }
}
