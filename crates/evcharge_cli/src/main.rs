//! Interactive console entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the database.
//! - Wire SQLite repositories into services and hand them to the menu.

mod menu;

use clap::Parser;
use evcharge_core::{
    init_logging, open_db, AppConfig, CondoService, SqliteCondoRepository, SqliteUserRepository,
    UserService,
};
use log::info;
use menu::Menu;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "evcharge")]
#[command(about = "EV charging management for residential condominiums")]
struct Cli {
    /// TOML configuration file; missing files fall back to env/defaults.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.logging.level, &config.logging.file) {
        eprintln!("logging disabled: {err}");
    }
    info!(
        "event=cli_start module=cli status=ok config={}",
        cli.config.display()
    );

    let conn = match open_db(&config.database.path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!(
                "failed to open database `{}`: {err}",
                config.database.path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let users = UserService::new(
        SqliteUserRepository::new(&conn),
        SqliteCondoRepository::new(&conn),
    );
    let condos = CondoService::new(
        SqliteCondoRepository::new(&conn),
        SqliteUserRepository::new(&conn),
    );

    let stdin = io::stdin();
    let mut menu = Menu::new(
        users,
        condos,
        config.export.dir,
        stdin.lock(),
        io::stdout(),
    );
    match menu.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
