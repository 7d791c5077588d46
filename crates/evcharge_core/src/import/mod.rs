//! Flat-file loaders for bulk condo and user registration.
//!
//! # Responsibility
//! - Parse `;`-delimited UTF-8 text into entity records.
//! - Reject structurally malformed files before any record reaches a service.
//!
//! # Invariants
//! - Blank lines and lines starting with `#` are ignored.
//! - Every data line has exactly six fields; fields are trimmed.
//! - Errors carry the 1-based physical line number of the offending line.
//!
//! File formats:
//! - condos: `name;charger_type;chargers_count;state;price;apartments_count`
//! - users: `name;apartment;condo_name;plate_ending;vehicle_type;rfid`

use crate::model::condo::Condo;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const FIELDS_PER_LINE: usize = 6;
const CONDO_LAYOUT: &str = "name;charger_type;chargers_count;state;price;apartments_count";
const USER_LAYOUT: &str = "name;apartment;condo;plate_ending;vehicle_type;rfid";

pub type LoadResult<T> = Result<T, LoadError>;

/// Failure while reading or parsing an import file.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: std::io::Error },
    Line { line: usize, message: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read `{}`: {source}", path.display())
            }
            Self::Line { line, message } => write!(f, "line {line}: {message}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Line { .. } => None,
        }
    }
}

/// Raw user record as read from an import file.
///
/// Vehicle type and RFID are left unnormalized; registration validates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// 1-based line in the source text.
    pub line: usize,
    pub name: String,
    pub apartment: String,
    pub condo: String,
    pub plate_ending: String,
    pub vehicle_type: String,
    pub rfid_code: String,
}

/// Reads and parses a condo import file.
pub fn load_condos(path: impl AsRef<Path>) -> LoadResult<Vec<Condo>> {
    parse_condos(&read_text(path.as_ref())?)
}

/// Reads and parses a user import file.
pub fn load_users(path: impl AsRef<Path>) -> LoadResult<Vec<UserRecord>> {
    parse_users(&read_text(path.as_ref())?)
}

/// Parses condo records; numeric fields and ranges are checked here.
pub fn parse_condos(text: &str) -> LoadResult<Vec<Condo>> {
    data_lines(text, CONDO_LAYOUT)?
        .into_iter()
        .map(|(line, fields)| -> LoadResult<Condo> {
            let [name, charger_type, chargers, state, price, apartments] = fields;
            let chargers_count = parse_count(line, "chargers_count", chargers)?;
            let energy_price = parse_price(line, price)?;
            let apartments_count = parse_count(line, "apartments_count", apartments)?;
            let condo = Condo::new(
                name,
                apartments_count,
                chargers_count,
                charger_type,
                state,
                energy_price,
            );
            condo.validate().map_err(|err| LoadError::Line {
                line,
                message: err.to_string(),
            })?;
            Ok(condo)
        })
        .collect()
}

/// Parses user records without validating field contents.
pub fn parse_users(text: &str) -> LoadResult<Vec<UserRecord>> {
    Ok(data_lines(text, USER_LAYOUT)?
        .into_iter()
        .map(|(line, fields)| {
            let [name, apartment, condo, plate_ending, vehicle_type, rfid_code] = fields;
            UserRecord {
                line,
                name: name.to_string(),
                apartment: apartment.to_string(),
                condo: condo.to_string(),
                plate_ending: plate_ending.to_string(),
                vehicle_type: vehicle_type.to_string(),
                rfid_code: rfid_code.to_string(),
            }
        })
        .collect())
}

fn read_text(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn data_lines<'a>(
    text: &'a str,
    layout: &str,
) -> LoadResult<Vec<(usize, [&'a str; FIELDS_PER_LINE])>> {
    let mut out = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(';').map(str::trim).collect();
        let fields: [&str; FIELDS_PER_LINE] =
            parts.as_slice().try_into().map_err(|_| LoadError::Line {
                line,
                message: format!(
                    "expected {FIELDS_PER_LINE} fields ({layout}), found {} in `{trimmed}`",
                    parts.len()
                ),
            })?;
        out.push((line, fields));
    }
    Ok(out)
}

fn parse_count(line: usize, field: &str, value: &str) -> LoadResult<u32> {
    value.parse::<u32>().map_err(|_| LoadError::Line {
        line,
        message: format!("{field} must be a non-negative integer, got `{value}`"),
    })
}

fn parse_price(line: usize, value: &str) -> LoadResult<f64> {
    value
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| LoadError::Line {
            line,
            message: format!("price must be numeric, got `{value}`"),
        })
}

#[cfg(test)]
mod tests {
    use super::{parse_condos, parse_users, LoadError};

    #[test]
    fn parse_condos_skips_comments_and_blank_lines() {
        let text = "# name;type;chargers;state;price;apartments\n\
                    \n\
                    Gamma;slow;2;SP;0.80;60\n\
                    Delta ; fast ; 3 ; MG ; 0,95 ; 120\n";
        let condos = parse_condos(text).unwrap();
        assert_eq!(condos.len(), 2);
        assert_eq!(condos[0].name, "Gamma");
        assert_eq!(condos[0].chargers_count, 2);
        assert_eq!(condos[0].apartments_count, 60);
        assert_eq!(condos[1].name, "Delta");
        assert_eq!(condos[1].charger_type, "fast");
        assert!((condos[1].energy_price - 0.95).abs() < f64::EPSILON);
        assert!(condos.iter().all(|condo| condo.id.is_none()));
    }

    #[test]
    fn parse_condos_reports_physical_line_of_bad_number() {
        let text = "# header\nGamma;slow;2;SP;0.80;60\nDelta;fast;three;MG;0.95;120\n";
        match parse_condos(text).unwrap_err() {
            LoadError::Line { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("chargers_count"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_condos_rejects_zero_apartments() {
        let err = parse_condos("Gamma;slow;2;SP;0.80;0").unwrap_err();
        assert!(matches!(err, LoadError::Line { line: 1, .. }));
    }

    #[test]
    fn parse_users_rejects_wrong_field_count() {
        let text = "Ana;12B;Alpha;34;elétrico;b3950a25\nBob;1;Alpha;56;híbrido\n";
        let err = parse_users(text).unwrap_err();
        assert!(matches!(err, LoadError::Line { line: 2, .. }));
        assert!(err.to_string().starts_with("line 2:"));
    }

    #[test]
    fn parse_users_keeps_raw_values_and_line_numbers() {
        let text = "# users\nAna;12B;Alpha;34;ELETRICO;B3950A25\n";
        let users = parse_users(text).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].line, 2);
        assert_eq!(users[0].vehicle_type, "ELETRICO");
        assert_eq!(users[0].rfid_code, "B3950A25");
    }
}
