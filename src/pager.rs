//! Result pagination
//!
//! A [`ResultPager`] owns one executed statement and doles its rows out in
//! pages. Cell values are formatted the moment they are read; only the
//! display strings survive the fetch.
//!
//! Exhaustion is defined per invocation: a page is exhausted when the row
//! cursor ended at or before the page bound. Detecting "ended exactly at
//! the bound" takes one look-ahead advance once a page is full; a row the
//! look-ahead produces is carried into the next page, so the last page that
//! actually holds data is the one flagged exhausted.

use std::collections::BTreeSet;

use crate::driver::{ColumnDescriptor, DriverError, Statement};
use crate::formatter::format_cell;

/// Interactive page size for the first fetch and each `.it`.
pub const PAGE_SIZE: usize = 20;

/// One bounded batch of formatted rows, plus the indices of columns that
/// were null in at least one row of the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub rows: Vec<Vec<String>>,
    pub null_columns: BTreeSet<usize>,
    pub was_exhausted: bool,
}

struct FormattedRow {
    cells: Vec<String>,
    nulls: Vec<usize>,
}

/// Paginates one executed statement's result set.
pub struct ResultPager<S> {
    stmt: S,
    columns: Vec<ColumnDescriptor>,
    carried: Option<FormattedRow>,
    exhausted: bool,
}

impl<S: Statement> ResultPager<S> {
    /// Take over an executed statement. Column descriptors are captured here
    /// and fixed for the statement's lifetime.
    pub fn new(stmt: S) -> Self {
        let columns = stmt.columns().to_vec();
        Self {
            stmt,
            columns,
            carried: None,
            exhausted: false,
        }
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Collect up to `max_rows` rows into a page. See the module docs for
    /// the exhaustion rule.
    pub fn fetch_page(&mut self, max_rows: usize) -> Result<ResultPage, DriverError> {
        let mut page = ResultPage {
            rows: Vec::new(),
            null_columns: BTreeSet::new(),
            was_exhausted: false,
        };

        if self.exhausted {
            page.was_exhausted = true;
            return Ok(page);
        }

        if let Some(row) = self.carried.take() {
            page.null_columns.extend(row.nulls.iter().copied());
            page.rows.push(row.cells);
        }

        while page.rows.len() < max_rows {
            match self.next_row()? {
                Some(row) => {
                    page.null_columns.extend(row.nulls.iter().copied());
                    page.rows.push(row.cells);
                }
                None => {
                    self.exhausted = true;
                    page.was_exhausted = true;
                    return Ok(page);
                }
            }
        }

        // Page full: look one row ahead so a result set ending exactly here
        // reports exhaustion on this page rather than on an empty follow-up.
        match self.next_row()? {
            Some(row) => self.carried = Some(row),
            None => {
                self.exhausted = true;
                page.was_exhausted = true;
            }
        }

        Ok(page)
    }

    fn next_row(&mut self) -> Result<Option<FormattedRow>, DriverError> {
        if !self.stmt.fetch()? {
            return Ok(None);
        }
        let mut cells = Vec::with_capacity(self.columns.len());
        let mut nulls = Vec::new();
        for pos in 1..=self.columns.len() {
            let value = self.stmt.value(pos as u32)?;
            if value.is_null() {
                nulls.push(pos - 1);
            }
            cells.push(format_cell(&value));
        }
        Ok(Some(FormattedRow { cells, nulls }))
    }
}
