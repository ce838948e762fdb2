//! Session construction: resolve flags against the config file, collect
//! credentials, open the driver connection and hand control to the REPL.

use std::path::PathBuf;

use sqlplusplus::config::{expand_config_path, CLIConfiguration};
use sqlplusplus::driver::sqlite::SqliteConnection;
use sqlplusplus::driver::ConnectOptions;
use sqlplusplus::error::{CLIError, Result};
use sqlplusplus::history::{default_history_path, DEFAULT_MAX_HISTORY};
use sqlplusplus::Session;

use crate::args::Cli;

pub fn run(cli: &Cli) -> Result<()> {
    let config = CLIConfiguration::load(&cli.config)?;

    let connection_string = cli
        .connection_string
        .clone()
        .or_else(|| config.connection_string().map(str::to_string))
        .ok_or_else(|| {
            CLIError::Configuration(
                "no connection string given (use -c/--connectionString or the config file)".into(),
            )
        })?;

    let username = cli
        .username
        .clone()
        .or_else(|| config.username().map(str::to_string));
    let password = resolve_password(cli, username.as_deref())?;

    let options = ConnectOptions {
        connection_string: connection_string.clone(),
        username,
        password,
    };
    let conn = SqliteConnection::connect(&options)?;

    let color = !cli.no_color && config.color();
    let history_path: Option<PathBuf> = cli
        .history_file
        .clone()
        .or_else(|| config.history_file().map(|p| p.to_path_buf()))
        .map(|p| expand_config_path(&p))
        .or_else(default_history_path);
    let max_history = cli
        .max_history_size
        .or_else(|| config.max_history_size())
        .unwrap_or(DEFAULT_MAX_HISTORY);

    let mut session = Session::new(conn, connection_string, color);
    session.print_banner();
    session.run_interactive(history_path.as_deref(), max_history)
}

/// Masked prompt for the password when a username was supplied without one.
/// Terminal echo state is restored by `rpassword` on every exit path.
fn resolve_password(cli: &Cli, username: Option<&str>) -> Result<Option<String>> {
    if let Some(password) = &cli.password {
        return Ok(Some(password.clone()));
    }
    if username.is_none() {
        return Ok(None);
    }
    let password = rpassword::prompt_password("Password > ")
        .map_err(|e| CLIError::Readline(format!("failed to read password: {}", e)))?;
    Ok(Some(password))
}
