//! Command classification
//!
//! Distinguishes dot meta-commands from SQL. Classification applies to the
//! trimmed logical line, first match wins; anything that is not a recognized
//! meta-command is handed to the database verbatim.

/// A classified logical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `.exit` — terminate the REPL.
    Exit,
    /// `.it` — continue fetching the active result set.
    ContinueFetch,
    /// `.help` — meta-command summary.
    Help,
    /// `.describe <table>` — column metadata for a table.
    Describe(String),
    /// Anything else: SQL text for the driver.
    Sql(String),
}

pub struct CommandParser;

const DESCRIBE_KEYWORD: &str = ".describe ";

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Classify a non-empty logical line.
    pub fn parse(&self, line: &str) -> Command {
        let trimmed = line.trim();
        if trimmed == ".exit" {
            Command::Exit
        } else if trimmed == ".it" {
            Command::ContinueFetch
        } else if trimmed == ".help" {
            Command::Help
        } else if let Some(table) = trimmed.strip_prefix(DESCRIBE_KEYWORD) {
            Command::Describe(table.trim().to_string())
        } else {
            Command::Sql(trimmed.to_string())
        }
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new()
    }
}
