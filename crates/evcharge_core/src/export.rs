//! CSV export of condos and users.
//!
//! # Responsibility
//! - Write one `;`-delimited file per entity kind into an export directory.
//!
//! # Invariants
//! - The export directory is created on demand.
//! - Files are overwritten on every export; column order is fixed.

use crate::model::condo::Condo;
use crate::model::user::User;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONDOS_FILE_NAME: &str = "condos.csv";
pub const USERS_FILE_NAME: &str = "users.csv";

const CONDO_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "Apartments",
    "Chargers",
    "ChargerType",
    "State",
    "EnergyPrice",
];
const USER_HEADERS: [&str; 10] = [
    "ID",
    "Name",
    "RFID",
    "Apartment",
    "Condo",
    "PlateEnding",
    "VehicleType",
    "LastEnergy",
    "LastCost",
    "LastTimeMinutes",
];

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "export failed: {err}"),
            Self::Csv(err) => write!(f, "export failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Writes `condos.csv` into `dir` and returns its path.
pub fn export_condos(dir: impl AsRef<Path>, condos: &[Condo]) -> Result<PathBuf, ExportError> {
    let rows = condos.iter().map(|condo| {
        vec![
            optional_cell(condo.id),
            condo.name.clone(),
            condo.apartments_count.to_string(),
            condo.chargers_count.to_string(),
            condo.charger_type.clone(),
            condo.state.clone(),
            condo.energy_price.to_string(),
        ]
    });
    write_csv(dir.as_ref(), CONDOS_FILE_NAME, &CONDO_HEADERS, rows)
}

/// Writes `users.csv` into `dir` and returns its path.
///
/// Absent measurement values are written as empty cells.
pub fn export_users(dir: impl AsRef<Path>, users: &[User]) -> Result<PathBuf, ExportError> {
    let rows = users.iter().map(|user| {
        vec![
            optional_cell(user.id),
            user.name.clone(),
            user.rfid_code.clone(),
            user.apartment.clone(),
            user.condo.clone(),
            user.plate_ending.clone(),
            user.vehicle_type.as_str().to_string(),
            optional_cell(user.last_energy),
            optional_cell(user.last_cost),
            optional_cell(user.last_time_minutes),
        ]
    });
    write_csv(dir.as_ref(), USERS_FILE_NAME, &USER_HEADERS, rows)
}

fn write_csv(
    dir: &Path,
    file_name: &str,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&path)?;
    writer.write_record(headers)?;
    let mut written = 0usize;
    for row in rows {
        writer.write_record(&row)?;
        written += 1;
    }
    writer.flush()?;

    info!(
        "event=csv_export module=export status=ok file={} rows={written}",
        path.display()
    );
    Ok(path)
}

fn optional_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
