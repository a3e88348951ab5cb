//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `calenkit_core` linkage, config loading and database bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use calenkit_core::db::migrations::current_user_version;
use calenkit_core::{init_logging, open_db, CalendarFacade, CoreConfig, LogEmailDispatcher};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CoreConfig::from_env();

    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("calenkit logging disabled: {err}");
        }
    }

    println!("calenkit_core ping={}", calenkit_core::ping());
    println!("calenkit_core version={}", calenkit_core::core_version());

    match probe_database(&config) {
        Ok(version) => {
            println!("calenkit_core db={}", config.db_path.display());
            println!("calenkit_core schema_version={version}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("calenkit_core db probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_database(config: &CoreConfig) -> Result<u32, calenkit_core::CalendarError> {
    let conn = open_db(&config.db_path)?;
    CalendarFacade::try_new(&conn, LogEmailDispatcher, config)?;
    Ok(current_user_version(&conn)?)
}
