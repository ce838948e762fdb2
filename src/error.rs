//! Error types
//!
//! One enumeration covers both tiers of §7-style failures; whether an error
//! is statement-scoped (reported, loop continues) or fatal (process exits 1)
//! is decided by where it is caught, not by its variant.

use std::fmt;

use crate::driver::DriverError;

/// Result type for client operations. The error defaults to [`CLIError`];
/// statement-scoped paths name [`DriverError`] explicitly.
pub type Result<T, E = CLIError> = std::result::Result<T, E>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum CLIError {
    /// Error from the database driver, with its context string.
    Driver(DriverError),

    /// Configuration file or flag resolution error.
    Configuration(String),

    /// File I/O error.
    File(String),

    /// Line reader error.
    Readline(String),

    /// History file error.
    History(String),
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::Driver(e) => write!(f, "{}", e),
            CLIError::Configuration(msg) => write!(f, "configuration: {}", msg),
            CLIError::File(msg) => write!(f, "file: {}", msg),
            CLIError::Readline(msg) => write!(f, "input: {}", msg),
            CLIError::History(msg) => write!(f, "history: {}", msg),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<DriverError> for CLIError {
    fn from(err: DriverError) -> Self {
        CLIError::Driver(err)
    }
}

impl From<rustyline::error::ReadlineError> for CLIError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CLIError::Readline(err.to_string())
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::File(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::Configuration(format!("TOML parse error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_keep_their_context() {
        let err = CLIError::from(DriverError::new("execute", "no such table: t"));
        assert_eq!(err.to_string(), "execute: no such table: t");
    }

    #[test]
    fn other_tiers_name_their_source() {
        assert_eq!(
            CLIError::Configuration("bad key".into()).to_string(),
            "configuration: bad key"
        );
        assert_eq!(
            CLIError::History("unwritable".into()).to_string(),
            "history: unwritable"
        );
    }
}
