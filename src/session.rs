//! REPL session state management
//!
//! Owns the driver connection and the single active statement, and runs the
//! interactive loop: read a raw line, accumulate continuations, classify the
//! logical line, and route it to a meta-command handler or to statement
//! execution. Statement-scoped failures are reported and the loop continues;
//! anything else propagates out and the process ends with a fatal error.

use std::path::Path;

use colored::Colorize;
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::driver::{Connection, DriverError, Statement};
use crate::error::{CLIError, Result};
use crate::formatter::OutputFormatter;
use crate::history::should_persist;
use crate::input::{InputAccumulator, LineOutcome};
use crate::pager::{ResultPager, PAGE_SIZE};
use crate::parser::{Command, CommandParser};

/// Lifecycle of the session's one statement slot. `Active` holds a pager
/// whose result set still has (or may have) unfetched rows; every other
/// situation, including any execution-phase failure, is `Idle`.
enum StatementState<S> {
    Idle,
    Active(ResultPager<S>),
}

/// Interactive client session over one driver connection.
pub struct Session<C: Connection> {
    conn: C,
    parser: CommandParser,
    formatter: OutputFormatter,
    accumulator: InputAccumulator,
    statement: StatementState<C::Statement>,
    color: bool,
    connection_label: String,
}

impl<C: Connection> Session<C> {
    pub fn new(conn: C, connection_label: String, color: bool) -> Self {
        Self {
            conn,
            parser: CommandParser::new(),
            formatter: OutputFormatter::new(color),
            accumulator: InputAccumulator::new(),
            statement: StatementState::Idle,
            color,
            connection_label,
        }
    }

    /// True while a statement with unfetched rows is active.
    pub fn has_active_statement(&self) -> bool {
        matches!(self.statement, StatementState::Active(_))
    }

    /// Run the interactive loop until `.exit` or end of input. History is
    /// loaded before the first prompt and rewritten on the way out.
    pub fn run_interactive(
        &mut self,
        history_path: Option<&Path>,
        max_history: usize,
    ) -> Result<()> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(max_history)
            .map_err(|e| CLIError::Readline(e.to_string()))?
            .build();
        let mut rl = DefaultEditor::with_config(config)?;
        if let Some(path) = history_path {
            // First session has no file yet.
            let _ = rl.load_history(path);
        }

        loop {
            let prompt = if self.accumulator.is_continuing() {
                self.continuation_prompt()
            } else {
                self.primary_prompt()
            };

            let line = match rl.readline(&prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    if self.accumulator.is_continuing() {
                        self.accumulator.reset();
                        println!("{}", self.styled_warn("Input cancelled"));
                    } else {
                        println!("Type .exit to quit");
                    }
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };

            let Some(logical) = self.complete_logical_line(&line) else {
                continue;
            };

            let command = self.parser.parse(&logical);
            if command == Command::Exit {
                break;
            }
            let record_worthy = self.dispatch(&command);
            if record_worthy && should_persist(&command) {
                let _ = rl.add_history_entry(&logical);
            }
        }

        if let Some(path) = history_path {
            if let Err(e) = rl.save_history(path) {
                eprintln!("Warning: failed to save history: {}", e);
            }
        }
        Ok(())
    }

    /// Accumulate one raw line; a trimmed logical line comes back once the
    /// continuation is satisfied. Blank input yields nothing and never
    /// reaches dispatch.
    fn complete_logical_line(&mut self, raw: &str) -> Option<String> {
        match self.accumulator.push_line(raw) {
            LineOutcome::Pending => None,
            LineOutcome::Complete(logical) => {
                let logical = logical.trim().to_string();
                if logical.is_empty() {
                    None
                } else {
                    Some(logical)
                }
            }
        }
    }

    /// Route one classified command. Returns whether the line is worth
    /// recording in history: SQL counts only when prepare and execute both
    /// succeeded; everything else always does (the persistence predicate
    /// filters control commands separately).
    fn dispatch(&mut self, command: &Command) -> bool {
        match command {
            Command::Exit => true,
            Command::Help => {
                self.print_help();
                true
            }
            Command::ContinueFetch => {
                if let Err(e) = self.continue_fetch() {
                    self.report_statement_error(&e);
                }
                true
            }
            Command::Describe(table) => {
                if let Err(e) = self.describe(table) {
                    self.report_statement_error(&e);
                }
                true
            }
            Command::Sql(sql) => match self.begin_statement(sql) {
                Ok(pager) => {
                    if let Err(e) = self.show_page(pager, PAGE_SIZE, true) {
                        self.report_statement_error(&e);
                    }
                    true
                }
                Err(e) => {
                    self.report_statement_error(&e);
                    false
                }
            },
        }
    }

    /// Prepare and execute a fresh statement, superseding the active one.
    /// On failure the statement slot stays `Idle`.
    fn begin_statement(&mut self, sql: &str) -> Result<ResultPager<C::Statement>, DriverError> {
        self.statement = StatementState::Idle;
        let mut stmt = self.conn.prepare(sql)?;
        stmt.execute()?;
        Ok(ResultPager::new(stmt))
    }

    /// `.describe <table>`: the driver's fixed catalog query with the table
    /// name bound at position 1, rendered through the ordinary statement
    /// path with an unbounded page size.
    fn describe(&mut self, table: &str) -> Result<(), DriverError> {
        self.statement = StatementState::Idle;
        let sql = self.conn.catalog_query().to_string();
        let mut stmt = self.conn.prepare(&sql)?;
        stmt.bind_text(1, table)?;
        stmt.execute()?;
        let pager = ResultPager::new(stmt);
        self.show_page(pager, usize::MAX, true)
    }

    /// `.it`: next page of the active statement, if any.
    fn continue_fetch(&mut self) -> Result<(), DriverError> {
        match std::mem::replace(&mut self.statement, StatementState::Idle) {
            StatementState::Idle => {
                println!("No active statement");
                Ok(())
            }
            StatementState::Active(pager) => self.show_page(pager, PAGE_SIZE, false),
        }
    }

    /// Fetch and print one page. The pager is moved back into the statement
    /// slot only on a successful, non-exhausted page, so error paths and
    /// exhaustion both leave the session `Idle` without further bookkeeping.
    fn show_page(
        &mut self,
        mut pager: ResultPager<C::Statement>,
        max_rows: usize,
        first_page: bool,
    ) -> Result<(), DriverError> {
        let page = pager.fetch_page(max_rows)?;
        if first_page && page.rows.is_empty() {
            println!("No rows returned");
            return Ok(());
        }
        println!("{}", self.formatter.render_page(pager.columns(), &page));
        println!("Fetched {} rows", page.rows.len());
        if !page.was_exhausted {
            self.statement = StatementState::Active(pager);
        }
        Ok(())
    }

    pub fn print_banner(&self) {
        println!();
        if self.color {
            println!("{}", "SQL++ interactive terminal".bright_blue().bold());
            println!("Connected to {}", self.connection_label.cyan());
        } else {
            println!("SQL++ interactive terminal");
            println!("Connected to {}", self.connection_label);
        }
        println!("Type .help for commands, .exit to quit");
        println!();
    }

    fn print_help(&self) {
        println!("Available commands:");
        println!("  .exit              end the session");
        println!(
            "  .it                fetch the next {} rows of the active statement",
            PAGE_SIZE
        );
        println!("  .describe <table>  show column metadata for a table");
        println!("  .help              this summary");
        println!("A trailing \\ continues the statement on the next line.");
    }

    fn primary_prompt(&self) -> String {
        if self.color {
            format!("{} > ", "SQL++".bright_blue().bold())
        } else {
            "SQL++ > ".to_string()
        }
    }

    fn continuation_prompt(&self) -> String {
        if self.color {
            format!("{} > ", "SQL++ (cont.)".dimmed())
        } else {
            "SQL++ (cont.) > ".to_string()
        }
    }

    fn styled_warn(&self, message: &str) -> String {
        if self.color {
            message.yellow().to_string()
        } else {
            message.to_string()
        }
    }

    fn report_statement_error(&self, err: &DriverError) {
        let message = format!("Error {}", err);
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{}", message);
        }
    }
}
