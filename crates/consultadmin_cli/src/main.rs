//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `consultadmin_core` linkage and storage bootstrap.
//! - Print a deterministic summary of the configured database.

use consultadmin_core::db::{open_db, open_db_in_memory};
use consultadmin_core::{
    CoreConfig, SqliteAccountStore, SqliteDirectory, SqliteRoleStore, UserAdmin,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("consultadmin: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_dir.display()))?;
        consultadmin_core::init_logging(config.log_level, log_dir)?;
    }

    println!("consultadmin_core ping={}", consultadmin_core::ping());
    println!("consultadmin_core version={}", consultadmin_core::core_version());

    let conn = match config.db_path.as_ref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;

    let admin = UserAdmin::new(
        SqliteAccountStore::new(&conn),
        SqliteRoleStore::new(&conn),
        SqliteDirectory::new(&conn),
    );
    let users = admin.get_all_users().map_err(|err| err.to_string())?;
    let roles = admin.get_all_roles().map_err(|err| err.to_string())?;
    let activities = admin.get_all_activities().map_err(|err| err.to_string())?;

    log::info!(
        "event=cli_summary module=cli status=ok users={} roles={} activities={}",
        users.len(),
        roles.len(),
        activities.len()
    );
    println!(
        "database={} users={} roles={} activities={}",
        config
            .db_path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string()),
        users.len(),
        roles.len(),
        activities.len()
    );
    Ok(())
}
