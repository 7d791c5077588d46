//! Field-level normalization and validation errors.
//!
//! # Invariants
//! - RFID codes are exactly 8 hex characters and always stored lowercase.
//! - Normalizers are idempotent: feeding an output back in returns it unchanged.

use crate::model::user::VehicleType;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static RFID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{8}$").expect("valid rfid regex"));

/// Malformed field value on a domain record.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Count field must be greater than zero.
    NonPositive(&'static str),
    /// Energy price is negative or not a finite number.
    InvalidPrice(f64),
    /// RFID is not 8 hexadecimal characters.
    InvalidRfid(String),
    /// Vehicle type is neither hybrid nor electric.
    InvalidVehicleType(String),
    /// Measurement reading is negative or not a finite number.
    InvalidMeasurement { field: &'static str, value: f64 },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::NonPositive(field) => write!(f, "{field} must be greater than zero"),
            Self::InvalidPrice(value) => {
                write!(f, "energy price must be a non-negative number, got {value}")
            }
            Self::InvalidRfid(value) => write!(
                f,
                "RFID must be an 8-character hexadecimal string (e.g. b3950a25), got `{value}`"
            ),
            Self::InvalidVehicleType(value) => write!(
                f,
                "vehicle type must be `{}` or `{}`, got `{value}`",
                VehicleType::Hybrid.as_str(),
                VehicleType::Electric.as_str()
            ),
            Self::InvalidMeasurement { field, value } => {
                write!(f, "{field} must be a non-negative number, got {value}")
            }
        }
    }
}

impl Error for ValidationError {}

/// Validates an RFID code and returns its lowercase form.
///
/// Surrounding whitespace is ignored.
pub fn normalize_rfid(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if !RFID_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidRfid(trimmed.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Maps free-form vehicle type input onto one of the two canonical variants.
///
/// Matching is case-insensitive and accepts the unaccented spellings
/// `hibrido` / `eletrico`.
pub fn normalize_vehicle_type(value: &str) -> Result<VehicleType, ValidationError> {
    match value.trim().to_lowercase().as_str() {
        "híbrido" | "hibrido" => Ok(VehicleType::Hybrid),
        "elétrico" | "eletrico" => Ok(VehicleType::Electric),
        _ => Err(ValidationError::InvalidVehicleType(value.trim().to_string())),
    }
}
