use clap::Parser;
use std::path::PathBuf;

/// Interactive SQL terminal with paginated, type-aware results.
#[derive(Parser, Debug)]
#[command(name = "sqlplusplus")]
#[command(version)]
#[command(about = "Interactive SQL terminal", long_about = None)]
pub struct Cli {
    /// Connection string for the target database (a file path or :memory:
    /// for the bundled SQLite driver)
    #[arg(short = 'c', long = "connectionString")]
    pub connection_string: Option<String>,

    /// Username to authenticate with
    #[arg(short = 'u', long = "username")]
    pub username: Option<String>,

    /// Password to authenticate with; when a username is given without
    /// this flag, the password is prompted for with masked input
    #[arg(short = 'p', long = "password")]
    pub password: Option<String>,

    /// History file path (default: $HOME/.sqlplusplus_history)
    #[arg(long = "historyFile")]
    pub history_file: Option<PathBuf>,

    /// Maximum number of history entries kept
    #[arg(long = "maxHistorySize")]
    pub max_history_size: Option<usize>,

    /// Configuration file path
    #[arg(long = "config", default_value = "~/.sqlplusplus.toml")]
    pub config: PathBuf,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
