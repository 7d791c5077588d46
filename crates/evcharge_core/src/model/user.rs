//! User (resident) domain model.
//!
//! # Responsibility
//! - Define the resident record and its last charging measurement.
//! - Map vehicle types to their two canonical storage tokens.
//!
//! # Invariants
//! - `condo` holds the referenced condo's name.
//! - `rfid_code` is unique and stored lowercase.
//! - A measurement is reported only when all three `last_*` fields are set.

use crate::model::validation::{normalize_rfid, ValidationError};
use std::fmt::{Display, Formatter};

/// Storage-assigned user identifier.
pub type UserId = i64;

/// Vehicle category, restricted to exactly two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Hybrid,
    Electric,
}

impl VehicleType {
    /// Canonical token used in storage, exports and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "híbrido",
            Self::Electric => "elétrico",
        }
    }
}

impl Display for VehicleType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One complete charging session reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub energy_kwh: f64,
    pub cost: f64,
    pub time_minutes: f64,
}

impl Measurement {
    /// Rejects negative or non-finite readings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_reading("energy", self.energy_kwh)?;
        check_reading("cost", self.cost)?;
        check_reading("time", self.time_minutes)
    }
}

fn check_reading(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidMeasurement { field, value });
    }
    Ok(())
}

/// Resident registered to charge a vehicle at a condo.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// `None` until the record is persisted.
    pub id: Option<UserId>,
    pub name: String,
    /// Apartment label, e.g. "12B".
    pub apartment: String,
    /// Name of the condo this user belongs to.
    pub condo: String,
    /// Last digits of the vehicle plate.
    pub plate_ending: String,
    pub vehicle_type: VehicleType,
    /// Lowercase 8-character hex access-card code.
    pub rfid_code: String,
    pub last_energy: Option<f64>,
    pub last_cost: Option<f64>,
    pub last_time_minutes: Option<f64>,
}

impl User {
    /// Creates an unpersisted user with no measurement recorded.
    ///
    /// Does not normalize `rfid_code`; services do that before persistence.
    pub fn new(
        name: impl Into<String>,
        apartment: impl Into<String>,
        condo: impl Into<String>,
        plate_ending: impl Into<String>,
        vehicle_type: VehicleType,
        rfid_code: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            apartment: apartment.into(),
            condo: condo.into(),
            plate_ending: plate_ending.into(),
            vehicle_type,
            rfid_code: rfid_code.into(),
            last_energy: None,
            last_cost: None,
            last_time_minutes: None,
        }
    }

    /// Returns the last measurement only when every field of it is present.
    pub fn last_measurement(&self) -> Option<Measurement> {
        Some(Measurement {
            energy_kwh: self.last_energy?,
            cost: self.last_cost?,
            time_minutes: self.last_time_minutes?,
        })
    }

    /// Overwrites all three measurement fields.
    pub fn set_last_measurement(&mut self, measurement: Measurement) {
        self.last_energy = Some(measurement.energy_kwh);
        self.last_cost = Some(measurement.cost);
        self.last_time_minutes = Some(measurement.time_minutes);
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `BlankField` for an empty name, apartment or condo reference.
    /// - `InvalidRfid` when `rfid_code` is not already in normalized form.
    /// - `InvalidMeasurement` for a stored reading that is negative or NaN.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        if self.apartment.trim().is_empty() {
            return Err(ValidationError::BlankField("apartment"));
        }
        if self.condo.trim().is_empty() {
            return Err(ValidationError::BlankField("condo"));
        }
        if normalize_rfid(&self.rfid_code)? != self.rfid_code {
            return Err(ValidationError::InvalidRfid(self.rfid_code.clone()));
        }
        for (field, value) in [
            ("energy", self.last_energy),
            ("cost", self.last_cost),
            ("time", self.last_time_minutes),
        ] {
            if let Some(value) = value {
                check_reading(field, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Measurement, User, VehicleType};
    use crate::model::validation::ValidationError;

    fn sample_user() -> User {
        User::new("Ana", "12B", "Alpha", "34", VehicleType::Electric, "b3950a25")
    }

    #[test]
    fn new_user_has_no_measurement() {
        let user = sample_user();
        assert!(user.last_measurement().is_none());
    }

    #[test]
    fn partial_measurement_is_reported_as_absent() {
        let mut user = sample_user();
        user.last_energy = Some(4.0);
        user.last_cost = Some(2.0);
        assert!(user.last_measurement().is_none());
    }

    #[test]
    fn set_last_measurement_overwrites_all_fields() {
        let mut user = sample_user();
        user.set_last_measurement(Measurement {
            energy_kwh: 12.5,
            cost: 9.37,
            time_minutes: 45.0,
        });
        assert_eq!(user.last_energy, Some(12.5));
        assert_eq!(user.last_cost, Some(9.37));
        assert_eq!(user.last_time_minutes, Some(45.0));
        assert!(user.last_measurement().is_some());
    }

    #[test]
    fn validate_requires_normalized_rfid() {
        let mut user = sample_user();
        user.rfid_code = "B3950A25".to_string();
        assert!(matches!(
            user.validate(),
            Err(ValidationError::InvalidRfid(_))
        ));
    }

    #[test]
    fn validate_rejects_blank_condo_reference() {
        let mut user = sample_user();
        user.condo = String::new();
        assert_eq!(user.validate(), Err(ValidationError::BlankField("condo")));
    }

    #[test]
    fn measurement_rejects_nan_and_negative_readings() {
        let nan = Measurement {
            energy_kwh: f64::NAN,
            cost: 9.37,
            time_minutes: 45.0,
        };
        assert!(matches!(
            nan.validate(),
            Err(ValidationError::InvalidMeasurement { field: "energy", .. })
        ));

        let negative = Measurement {
            energy_kwh: 1.0,
            cost: 1.0,
            time_minutes: -5.0,
        };
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidMeasurement { field: "time", .. })
        ));
    }

    #[test]
    fn validate_rejects_infinite_stored_reading() {
        let mut user = sample_user();
        user.last_cost = Some(f64::INFINITY);
        assert!(matches!(
            user.validate(),
            Err(ValidationError::InvalidMeasurement { field: "cost", .. })
        ));
    }

    #[test]
    fn vehicle_type_displays_canonical_token() {
        assert_eq!(VehicleType::Hybrid.to_string(), "híbrido");
        assert_eq!(VehicleType::Electric.to_string(), "elétrico");
    }
}
