//! sqlplusplus - interactive SQL terminal
//!
//! ```bash
//! # Interactive session against a SQLite database
//! sqlplusplus -c app.db
//!
//! # Scratch session
//! sqlplusplus -c :memory: --no-color
//! ```
//!
//! Statement-scoped errors are reported at the prompt and the session
//! continues; anything escaping the loop (or failing before it starts) is
//! fatal and ends the process with exit code 1.

use clap::Parser;
use colored::Colorize;

mod args;
mod connect;

use args::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(err) = connect::run(&cli) {
        let message = format!("Fatal error {}", err);
        if cli.no_color {
            eprintln!("{}", message);
        } else {
            eprintln!("{}", message.red());
        }
        std::process::exit(1);
    }
}
