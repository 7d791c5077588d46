//! Numbered text menu over the condo and user services.
//!
//! # Invariants
//! - A failing operation prints `Error: ...` and the loop continues.
//! - End of input exits the loop cleanly.
//! - Blank answers in update prompts keep the current value.

use evcharge_core::{
    export_condos, export_users, normalize_rfid, normalize_vehicle_type, CondoRepository,
    CondoService, ExportError, ServiceError, User, UserRepository, UserService, ValidationError,
};
use log::error;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const MENU_TEXT: &str = "=== EVCharge Manager ===
1) Register condo
2) Import condos from TXT
3) Register user
4) Find user (by id or name)
5) Find condo (by id or name)
6) Update user
7) Update condo
8) Record/view last measurement
9) Delete user
10) Delete condo
11) List users and export CSV
12) List condos and export CSV
13) Import users from TXT
0) Exit";

#[derive(Debug)]
pub enum MenuError {
    /// Input stream closed.
    Eof,
    Io(io::Error),
    /// Operator typed something unusable.
    Input(String),
    Validation(ValidationError),
    Service(ServiceError),
    Export(ExportError),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eof => write!(f, "input closed"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "{message}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MenuError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Eof | Self::Input(_) => None,
        }
    }
}

impl From<io::Error> for MenuError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ValidationError> for MenuError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ServiceError> for MenuError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<ExportError> for MenuError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

type MenuResult<T> = Result<T, MenuError>;

/// Request/response loop driving the services.
pub struct Menu<U: UserRepository, C: CondoRepository, R: BufRead, W: Write> {
    users: UserService<U, C>,
    condos: CondoService<C, U>,
    export_dir: PathBuf,
    input: R,
    output: W,
}

impl<U: UserRepository, C: CondoRepository, R: BufRead, W: Write> Menu<U, C, R, W> {
    pub fn new(
        users: UserService<U, C>,
        condos: CondoService<C, U>,
        export_dir: PathBuf,
        input: R,
        output: W,
    ) -> Self {
        Self {
            users,
            condos,
            export_dir,
            input,
            output,
        }
    }

    /// Runs until the operator chooses `0` or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU_TEXT}")?;
            let choice = match self.prompt("> Choose: ") {
                Ok(choice) => choice,
                Err(MenuError::Eof) => return Ok(()),
                Err(MenuError::Io(err)) => return Err(err),
                Err(_) => continue,
            };

            let result = match choice.as_str() {
                "1" => self.register_condo(),
                "2" => self.import_condos(),
                "3" => self.register_user(),
                "4" => self.find_user(),
                "5" => self.find_condo(),
                "6" => self.update_user(),
                "7" => self.update_condo(),
                "8" => self.measurements(),
                "9" => self.delete_user(),
                "10" => self.delete_condo(),
                "11" => self.list_users(),
                "12" => self.list_condos(),
                "13" => self.import_users(),
                "0" => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => {
                    writeln!(self.output, "Invalid option.")?;
                    continue;
                }
            };

            match result {
                Ok(()) => {}
                Err(MenuError::Eof) => return Ok(()),
                Err(MenuError::Io(err)) => return Err(err),
                Err(err) => {
                    error!("event=menu_op module=cli status=error option={choice} error={err}");
                    writeln!(self.output, "Error: {err}")?;
                }
            }
        }
    }

    fn register_condo(&mut self) -> MenuResult<()> {
        let name = self.prompt_required("Condo name: ", "name")?;
        let charger_type = self.prompt_required("Charger type (slow/fast): ", "charger type")?;
        let chargers = parse_count(&self.prompt("Number of chargers: ")?, "number of chargers")?;
        let state = self.prompt_required("State: ", "state")?;
        let price = parse_decimal(&self.prompt("Energy price per kWh: ")?, "energy price")?;
        let apartments =
            parse_count(&self.prompt("Number of apartments: ")?, "number of apartments")?;

        let id = self
            .condos
            .register(&name, apartments, chargers, &charger_type, &state, price)?;
        writeln!(self.output, "Condo registered with ID {id}")?;
        Ok(())
    }

    fn import_condos(&mut self) -> MenuResult<()> {
        let path = self.prompt_required("Path to condos TXT file: ", "file")?;
        let created = self.condos.import_from_file(path)?;
        writeln!(self.output, "{created} condo(s) imported.")?;
        Ok(())
    }

    fn register_user(&mut self) -> MenuResult<()> {
        let name = self.prompt_required("Resident name: ", "name")?;
        let apartment = self.prompt_required("Apartment: ", "apartment")?;
        let condo = self.prompt_required("Condo (name): ", "condo")?;
        let plate = self.prompt_required("Plate ending: ", "plate ending")?;
        let vehicle_type = self.prompt_required("Vehicle type (híbrido/elétrico): ", "vehicle type")?;
        let rfid = normalize_rfid(&self.prompt("RFID code (8 hex, e.g. b3950a25): ")?)?;

        let id = self
            .users
            .register(&name, &apartment, &condo, &plate, &vehicle_type, &rfid)?;
        writeln!(self.output, "User registered with ID {id}")?;
        Ok(())
    }

    fn import_users(&mut self) -> MenuResult<()> {
        let path = self.prompt_required("Path to users TXT file: ", "file")?;
        let report = self.users.import_from_file(path)?;
        writeln!(
            self.output,
            "Import finished: {} created, {} failed.",
            report.succeeded, report.failed
        )?;
        if !report.errors.is_empty() {
            writeln!(self.output, "Errors:")?;
            for err in &report.errors {
                writeln!(self.output, " - {err}")?;
            }
        }
        Ok(())
    }

    fn find_user(&mut self) -> MenuResult<()> {
        let by = self.prompt_required("Find by 'id' or 'name': ", "mode")?;
        let value = self.prompt_required("Value: ", "value")?;
        match self.users.get(&by, &value)? {
            Some(user) => writeln!(self.output, "{}", describe_user(&user))?,
            None => writeln!(self.output, "User not found.")?,
        }
        Ok(())
    }

    fn find_condo(&mut self) -> MenuResult<()> {
        let by = self.prompt_required("Find by 'id' or 'name': ", "mode")?;
        let value = self.prompt_required("Value: ", "value")?;
        match self.condos.get(&by, &value)? {
            Some(condo) => writeln!(
                self.output,
                "ID={} | Name={} | Apts={} | Chargers={} ({}) | State={} | Price=R$ {:.3}/kWh",
                condo.id.unwrap_or_default(),
                condo.name,
                condo.apartments_count,
                condo.chargers_count,
                condo.charger_type,
                condo.state,
                condo.energy_price
            )?,
            None => writeln!(self.output, "Condo not found.")?,
        }
        Ok(())
    }

    fn update_user(&mut self) -> MenuResult<()> {
        let id = parse_id(&self.prompt("User ID to update: ")?)?;
        let Some(mut user) = self.users.get_by_id(id)? else {
            writeln!(self.output, "User not found.")?;
            return Ok(());
        };

        user.name = self.prompt_or_keep("Name", &user.name)?;
        user.apartment = self.prompt_or_keep("Apartment", &user.apartment)?;
        user.condo = self.prompt_or_keep("Condo", &user.condo)?;
        user.plate_ending = self.prompt_or_keep("Plate ending", &user.plate_ending)?;
        let vehicle_type = self.prompt_or_keep("Vehicle type", user.vehicle_type.as_str())?;
        user.vehicle_type = normalize_vehicle_type(&vehicle_type)?;
        let rfid = self.prompt_or_keep("RFID", &user.rfid_code)?;
        user.rfid_code = normalize_rfid(&rfid)?;

        self.users.update(&user)?;
        writeln!(self.output, "User updated.")?;
        Ok(())
    }

    fn update_condo(&mut self) -> MenuResult<()> {
        let id = parse_id(&self.prompt("Condo ID to update: ")?)?;
        let Some(mut condo) = self.condos.get_by_id(id)? else {
            writeln!(self.output, "Condo not found.")?;
            return Ok(());
        };

        condo.name = self.prompt_or_keep("Name", &condo.name)?;
        condo.charger_type = self.prompt_or_keep("Charger type", &condo.charger_type)?;
        let chargers = self.prompt_or_keep("Number of chargers", &condo.chargers_count.to_string())?;
        condo.chargers_count = parse_count(&chargers, "number of chargers")?;
        condo.state = self.prompt_or_keep("State", &condo.state)?;
        let price = self.prompt_or_keep("Energy price", &condo.energy_price.to_string())?;
        condo.energy_price = parse_decimal(&price, "energy price")?;
        let apartments =
            self.prompt_or_keep("Number of apartments", &condo.apartments_count.to_string())?;
        condo.apartments_count = parse_count(&apartments, "number of apartments")?;

        self.condos.update(&condo)?;
        writeln!(self.output, "Condo updated.")?;
        Ok(())
    }

    fn measurements(&mut self) -> MenuResult<()> {
        let id = parse_id(&self.prompt("User ID: ")?)?;
        let action = self
            .prompt("Type 'view' to read or 'set' to record a measurement: ")?
            .to_lowercase();
        match action.as_str() {
            "view" => {
                let message = self.users.read_last_measure(id)?;
                writeln!(self.output, "{message}")?;
            }
            "set" => {
                let energy = parse_decimal(&self.prompt("Energy (kWh): ")?, "energy")?;
                let cost = parse_decimal(&self.prompt("Cost (R$): ")?, "cost")?;
                let minutes = parse_decimal(&self.prompt("Time (min): ")?, "time")?;
                self.users.set_last_measure(id, energy, cost, minutes)?;
                writeln!(self.output, "Measurement recorded.")?;
            }
            _ => writeln!(self.output, "Invalid action.")?,
        }
        Ok(())
    }

    fn delete_user(&mut self) -> MenuResult<()> {
        let id = parse_id(&self.prompt("User ID: ")?)?;
        self.users.delete(id)?;
        writeln!(self.output, "User deleted.")?;
        Ok(())
    }

    fn delete_condo(&mut self) -> MenuResult<()> {
        let id = parse_id(&self.prompt("Condo ID: ")?)?;
        let outcome = self.condos.delete(id)?;
        writeln!(self.output, "{}", outcome.message())?;
        Ok(())
    }

    fn list_users(&mut self) -> MenuResult<()> {
        let users = self.users.list()?;
        if users.is_empty() {
            writeln!(self.output, "No users registered.")?;
            return Ok(());
        }
        for user in &users {
            writeln!(self.output, "{}", describe_user(user))?;
        }
        let path = export_users(&self.export_dir, &users)?;
        writeln!(self.output, "Exported to {}", path.display())?;
        Ok(())
    }

    fn list_condos(&mut self) -> MenuResult<()> {
        let condos = self.condos.list()?;
        if condos.is_empty() {
            writeln!(self.output, "No condos registered.")?;
            return Ok(());
        }
        for condo in &condos {
            writeln!(
                self.output,
                "{};{};{};{};{};{};{}",
                condo.id.unwrap_or_default(),
                condo.name,
                condo.apartments_count,
                condo.chargers_count,
                condo.charger_type,
                condo.state,
                condo.energy_price
            )?;
        }
        let path = export_condos(&self.export_dir, &condos)?;
        writeln!(self.output, "Exported to {}", path.display())?;
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> MenuResult<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MenuError::Eof);
        }
        Ok(line.trim().to_string())
    }

    fn prompt_required(&mut self, label: &str, field: &str) -> MenuResult<String> {
        let value = self.prompt(label)?;
        if value.is_empty() {
            return Err(MenuError::Input(format!("{field} must not be empty")));
        }
        Ok(value)
    }

    fn prompt_or_keep(&mut self, label: &str, current: &str) -> MenuResult<String> {
        let value = self.prompt(&format!("{label} [{current}]: "))?;
        if value.is_empty() {
            return Ok(current.to_string());
        }
        Ok(value)
    }
}

fn describe_user(user: &User) -> String {
    format!(
        "ID={} | Name={} | RFID={} | Apt={} | Condo={} | Plate={} | Type={} | Last: energy={} kWh, cost={}, time={} min",
        user.id.unwrap_or_default(),
        user.name,
        user.rfid_code,
        user.apartment,
        user.condo,
        user.plate_ending,
        user.vehicle_type,
        optional(user.last_energy),
        optional(user.last_cost),
        optional(user.last_time_minutes)
    )
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn parse_id(value: &str) -> MenuResult<i64> {
    value
        .parse()
        .map_err(|_| MenuError::Input(format!("ID must be an integer, got `{value}`")))
}

fn parse_count(value: &str, field: &str) -> MenuResult<u32> {
    value
        .parse()
        .map_err(|_| MenuError::Input(format!("{field} must be an integer, got `{value}`")))
}

fn parse_decimal(value: &str, field: &str) -> MenuResult<f64> {
    value
        .replace(',', ".")
        .parse()
        .map_err(|_| MenuError::Input(format!("{field} must be numeric, got `{value}`")))
}
