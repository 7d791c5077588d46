//! User use-case service.
//!
//! # Responsibility
//! - Register, import, query, update and delete users.
//! - Record and report each user's last charging measurement.
//!
//! # Invariants
//! - A user's condo must resolve to an existing condo at create and update.
//! - Vehicle type and RFID are normalized on every write.
//! - Bulk import never aborts on a single bad record.
//! - Partial measurement states are reported as "no measurement".

use crate::import::{load_users, UserRecord};
use crate::model::user::{Measurement, User, UserId};
use crate::model::validation::{normalize_rfid, normalize_vehicle_type};
use crate::repo::condo_repo::CondoRepository;
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use crate::service::{parse_lookup_id, LookupBy, ServiceError, ServiceResult};
use log::{info, warn};
use std::path::Path;

/// Message returned by `read_last_measure` when no full measurement exists.
pub const NO_MEASUREMENT_MESSAGE: &str = "User has no charging measurements recorded yet.";

/// Outcome of a bulk user import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserImportReport {
    pub succeeded: usize,
    pub failed: usize,
    /// One `line N: <reason>` entry per failed record.
    ///
    /// `N` is the record's physical line in the source file, so blank and
    /// `#` comment lines count; it is not the record's ordinal.
    pub errors: Vec<String>,
}

/// User service facade over repository implementations.
pub struct UserService<U: UserRepository, C: CondoRepository> {
    users: U,
    condos: C,
}

impl<U: UserRepository, C: CondoRepository> UserService<U, C> {
    /// Creates a service using the provided repository implementations.
    pub fn new(users: U, condos: C) -> Self {
        Self { users, condos }
    }

    /// Registers a user in an existing condo and returns its id.
    ///
    /// # Errors
    /// - `CondoNotFound` when `condo_name` is not a registered condo.
    /// - `Validation` for an unknown vehicle type or malformed RFID.
    /// - `DuplicateRfid` when storage reports the RFID as taken.
    pub fn register(
        &self,
        name: &str,
        apartment: &str,
        condo_name: &str,
        plate_ending: &str,
        vehicle_type: &str,
        rfid_code: &str,
    ) -> ServiceResult<UserId> {
        self.ensure_condo_exists(condo_name)?;

        let user = User::new(
            name,
            apartment,
            condo_name,
            plate_ending,
            normalize_vehicle_type(vehicle_type)?,
            normalize_rfid(rfid_code)?,
        );
        user.validate()?;
        let id = self
            .users
            .create(&user)
            .map_err(|err| translate_error(err, &user))?;
        info!("event=user_register module=service status=ok id={id}");
        Ok(id)
    }

    /// Registers every record, collecting per-line failures.
    pub fn import_bulk(&self, records: &[UserRecord]) -> UserImportReport {
        let mut report = UserImportReport::default();
        for record in records {
            match self.register(
                &record.name,
                &record.apartment,
                &record.condo,
                &record.plate_ending,
                &record.vehicle_type,
                &record.rfid_code,
            ) {
                Ok(_) => report.succeeded += 1,
                Err(err) => {
                    warn!(
                        "event=user_import module=service status=record_failed line={} error={}",
                        record.line, err
                    );
                    report.failed += 1;
                    report.errors.push(format!("line {}: {err}", record.line));
                }
            }
        }
        info!(
            "event=user_import module=service status=ok succeeded={} failed={}",
            report.succeeded, report.failed
        );
        report
    }

    /// Loads a user import file and feeds it to `import_bulk`.
    ///
    /// A malformed file fails before any user is registered.
    pub fn import_from_file(&self, path: impl AsRef<Path>) -> ServiceResult<UserImportReport> {
        let records = load_users(path)?;
        Ok(self.import_bulk(&records))
    }

    /// Looks a user up by a textual mode (`id` or `name`).
    pub fn get(&self, by: &str, value: &str) -> ServiceResult<Option<User>> {
        match by.parse::<LookupBy>()? {
            LookupBy::Id => self.get_by_id(parse_lookup_id(value)?),
            LookupBy::Name => self.get_by_name(value),
        }
    }

    pub fn get_by_id(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.users.get_by_id(id)?)
    }

    pub fn get_by_name(&self, name: &str) -> ServiceResult<Option<User>> {
        Ok(self.users.get_by_name(name)?)
    }

    /// Lists all users ordered by id.
    pub fn list(&self) -> ServiceResult<Vec<User>> {
        Ok(self.users.list_all()?)
    }

    /// Replaces the full user row after re-checking and re-normalizing it.
    ///
    /// # Errors
    /// - `CondoNotFound` when the condo reference no longer resolves.
    /// - `Validation` for a malformed RFID.
    /// - `DuplicateRfid` when the RFID belongs to another user.
    pub fn update(&self, user: &User) -> ServiceResult<()> {
        if !user.condo.trim().is_empty() {
            self.ensure_condo_exists(&user.condo)?;
        }

        let mut normalized = user.clone();
        normalized.vehicle_type = normalize_vehicle_type(user.vehicle_type.as_str())?;
        normalized.rfid_code = normalize_rfid(&user.rfid_code)?;
        normalized.validate()?;
        self.users
            .update(&normalized)
            .map_err(|err| translate_error(err, &normalized))?;
        info!(
            "event=user_update module=service status=ok id={}",
            normalized.id.unwrap_or_default()
        );
        Ok(())
    }

    /// Deletes a user; absent ids are ignored.
    pub fn delete(&self, id: UserId) -> ServiceResult<()> {
        self.users.delete(id)?;
        info!("event=user_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Overwrites the user's last measurement in a single row update.
    ///
    /// # Errors
    /// - `Validation` when a reading is negative or not finite.
    /// - `UserNotFound` when `id` does not exist.
    pub fn set_last_measure(
        &self,
        id: UserId,
        energy_kwh: f64,
        cost: f64,
        time_minutes: f64,
    ) -> ServiceResult<()> {
        let measurement = Measurement {
            energy_kwh,
            cost,
            time_minutes,
        };
        measurement.validate()?;

        let mut user = self
            .users
            .get_by_id(id)?
            .ok_or(ServiceError::UserNotFound(id))?;
        user.set_last_measurement(measurement);
        self.users.update(&user)?;
        info!("event=user_measure module=service status=ok id={id}");
        Ok(())
    }

    /// Formats the user's last measurement for display.
    ///
    /// Returns `NO_MEASUREMENT_MESSAGE` unless all three fields are present.
    pub fn read_last_measure(&self, id: UserId) -> ServiceResult<String> {
        let user = self
            .users
            .get_by_id(id)?
            .ok_or(ServiceError::UserNotFound(id))?;
        Ok(match user.last_measurement() {
            Some(measurement) => format!(
                "Energy: {:.3} kWh | Cost: R$ {:.2} | Time: {:.1} min",
                measurement.energy_kwh, measurement.cost, measurement.time_minutes
            ),
            None => NO_MEASUREMENT_MESSAGE.to_string(),
        })
    }

    fn ensure_condo_exists(&self, condo_name: &str) -> ServiceResult<()> {
        if self.condos.get_by_name(condo_name)?.is_none() {
            warn!("event=user_condo_check module=service status=missing condo={condo_name}");
            return Err(ServiceError::CondoNotFound(condo_name.to_string()));
        }
        Ok(())
    }
}

fn translate_error(err: RepoError, user: &User) -> ServiceError {
    match err.unique_target() {
        Some("users.rfid_code") => ServiceError::DuplicateRfid(user.rfid_code.clone()),
        _ => err.into(),
    }
}
