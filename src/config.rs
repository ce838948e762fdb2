//! Configuration file management
//!
//! Optional TOML file supplying defaults that command-line flags override.
//!
//! ```toml
//! [connection]
//! connection_string = "app.db"
//! username = "ada"
//!
//! [ui]
//! color = true
//! history_file = "~/.sqlplusplus_history"
//! max_history_size = 10000
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Configuration loaded from a TOML file; every table and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CLIConfiguration {
    pub connection: Option<ConnectionConfig>,
    pub ui: Option<UIConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub connection_string: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UIConfig {
    #[serde(default = "default_color")]
    pub color: bool,

    pub history_file: Option<PathBuf>,

    pub max_history_size: Option<usize>,
}

fn default_color() -> bool {
    true
}

impl CLIConfiguration {
    /// Load from `path` (with `~` expansion). A missing file is not an
    /// error; it yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = expand_config_path(path);
        if !expanded.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&expanded)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection
            .as_ref()
            .and_then(|c| c.connection_string.as_deref())
    }

    pub fn username(&self) -> Option<&str> {
        self.connection.as_ref().and_then(|c| c.username.as_deref())
    }

    pub fn color(&self) -> bool {
        self.ui.as_ref().map(|ui| ui.color).unwrap_or(true)
    }

    pub fn history_file(&self) -> Option<&Path> {
        self.ui.as_ref().and_then(|ui| ui.history_file.as_deref())
    }

    pub fn max_history_size(&self) -> Option<usize> {
        self.ui.as_ref().and_then(|ui| ui.max_history_size)
    }
}

/// Expand a leading `~` against `HOME`.
pub fn expand_config_path(path: &Path) -> PathBuf {
    expand_with_home(path, std::env::var_os("HOME"))
}

fn expand_with_home(path: &Path, home: Option<OsString>) -> PathBuf {
    if let (Ok(stripped), Some(home)) = (path.strip_prefix("~"), home) {
        PathBuf::from(home).join(stripped)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_configuration() {
        let config: CLIConfiguration = toml::from_str(
            r#"
            [connection]
            connection_string = "app.db"
            username = "ada"

            [ui]
            color = false
            history_file = "/tmp/history"
            max_history_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.connection_string(), Some("app.db"));
        assert_eq!(config.username(), Some("ada"));
        assert!(!config.color());
        assert_eq!(config.history_file(), Some(Path::new("/tmp/history")));
        assert_eq!(config.max_history_size(), Some(50));
    }

    #[test]
    fn missing_tables_fall_back_to_defaults() {
        let config: CLIConfiguration = toml::from_str("").unwrap();
        assert_eq!(config.connection_string(), None);
        assert!(config.color());
        assert_eq!(config.max_history_size(), None);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CLIConfiguration::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.connection_string(), None);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[connection]\nconnection_string = \"x.db\"\n").unwrap();
        let config = CLIConfiguration::load(&path).unwrap();
        assert_eq!(config.connection_string(), Some("x.db"));
    }

    #[test]
    fn tilde_expands_against_home() {
        let expanded = expand_with_home(
            Path::new("~/.sqlplusplus.toml"),
            Some(OsString::from("/home/ada")),
        );
        assert_eq!(expanded, PathBuf::from("/home/ada/.sqlplusplus.toml"));

        let untouched = expand_with_home(Path::new("/etc/sqlpp.toml"), None);
        assert_eq!(untouched, PathBuf::from("/etc/sqlpp.toml"));
    }
}
