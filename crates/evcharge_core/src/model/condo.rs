//! Condo domain model.
//!
//! # Responsibility
//! - Define the managed residential property record.
//! - Validate field ranges before persistence.
//!
//! # Invariants
//! - `name` is unique across all condos (enforced by storage).
//! - Apartment and charger counts are strictly positive.
//! - `energy_price` is finite and non-negative.

use crate::model::validation::ValidationError;

/// Storage-assigned condo identifier.
pub type CondoId = i64;

/// Residential property with charging infrastructure.
#[derive(Debug, Clone, PartialEq)]
pub struct Condo {
    /// `None` until the record is persisted.
    pub id: Option<CondoId>,
    /// Unique display name, also used as the users' foreign key.
    pub name: String,
    pub apartments_count: u32,
    pub chargers_count: u32,
    /// Free-text category, e.g. "slow" or "fast".
    pub charger_type: String,
    /// State/region code.
    pub state: String,
    /// Price per kWh.
    pub energy_price: f64,
}

impl Condo {
    /// Creates an unpersisted condo.
    pub fn new(
        name: impl Into<String>,
        apartments_count: u32,
        chargers_count: u32,
        charger_type: impl Into<String>,
        state: impl Into<String>,
        energy_price: f64,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            apartments_count,
            chargers_count,
            charger_type: charger_type.into(),
            state: state.into(),
            energy_price,
        }
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `BlankField` when `name` is empty after trim.
    /// - `NonPositive` when a count is zero.
    /// - `InvalidPrice` when the price is negative or not finite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        if self.apartments_count == 0 {
            return Err(ValidationError::NonPositive("apartments_count"));
        }
        if self.chargers_count == 0 {
            return Err(ValidationError::NonPositive("chargers_count"));
        }
        if !self.energy_price.is_finite() || self.energy_price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.energy_price));
        }
        Ok(())
    }
}
