//! History persistence rules
//!
//! Storage itself belongs to the line reader (load at startup, rewrite at
//! shutdown, capped in-memory length); this module decides where the file
//! lives and which commands are worth keeping.

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::parser::Command;

pub const DEFAULT_MAX_HISTORY: usize = 10_000;

const HISTORY_FILE_NAME: &str = ".sqlplusplus_history";

/// `$HOME/.sqlplusplus_history`, when `HOME` is set.
pub fn default_history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| history_path_in(&home))
}

fn history_path_in(home: &OsStr) -> PathBuf {
    PathBuf::from(home).join(HISTORY_FILE_NAME)
}

/// Submitted SQL and `.describe` lines are persisted; control commands
/// (`.exit`, `.it`, `.help`) are not.
pub fn should_persist(command: &Command) -> bool {
    matches!(command, Command::Sql(_) | Command::Describe(_))
}
