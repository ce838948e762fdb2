//! Scripted driver for tests: serves a fixed result set for every prepared
//! statement, records prepared SQL and bound parameters, and can be told to
//! fail at a chosen point in the statement lifecycle.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use super::{CellValue, ColumnDescriptor, Connection, DriverError, NativeType, Statement};

/// Where a scripted statement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Never,
    Prepare,
    Execute,
    /// Fail on the nth row advance, 1-based.
    Fetch(usize),
}

pub struct MockConnection {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<CellValue>>,
    fail_at: FailAt,
    pub prepared: RefCell<Vec<String>>,
    pub binds: Rc<RefCell<Vec<(u32, String)>>>,
}

impl MockConnection {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            fail_at: FailAt::Never,
            prepared: RefCell::new(Vec::new()),
            binds: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn with_failure(mut self, fail_at: FailAt) -> Self {
        self.fail_at = fail_at;
        self
    }
}

impl Connection for MockConnection {
    type Statement = MockStatement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, DriverError> {
        if self.fail_at == FailAt::Prepare {
            return Err(DriverError::new("prepare", "scripted prepare failure"));
        }
        self.prepared.borrow_mut().push(sql.to_string());
        Ok(MockStatement {
            columns: self.columns.clone(),
            rows: self.rows.clone().into(),
            fail_at: self.fail_at,
            fetches: 0,
            current: None,
            binds: Rc::clone(&self.binds),
        })
    }

    fn catalog_query(&self) -> &str {
        "select \"Name\", \"Null?\", \"Type\" from catalog_columns where table_name = ?1"
    }
}

pub struct MockStatement {
    columns: Vec<ColumnDescriptor>,
    rows: VecDeque<Vec<CellValue>>,
    fail_at: FailAt,
    fetches: usize,
    current: Option<Vec<CellValue>>,
    binds: Rc<RefCell<Vec<(u32, String)>>>,
}

impl Statement for MockStatement {
    fn bind_text(&mut self, pos: u32, value: &str) -> Result<(), DriverError> {
        self.binds.borrow_mut().push((pos, value.to_string()));
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        if self.fail_at == FailAt::Execute {
            return Err(DriverError::new("execute", "scripted execute failure"));
        }
        Ok(())
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn fetch(&mut self) -> Result<bool, DriverError> {
        self.fetches += 1;
        if self.fail_at == FailAt::Fetch(self.fetches) {
            return Err(DriverError::new("fetch", "scripted fetch failure"));
        }
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn value(&self, pos: u32) -> Result<CellValue, DriverError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| DriverError::new("column read", "no current row"))?;
        row.get(pos as usize - 1)
            .cloned()
            .ok_or_else(|| DriverError::new("column read", format!("column {pos} out of range")))
    }
}

/// One int64 column named `n`.
pub fn int_column() -> Vec<ColumnDescriptor> {
    vec![ColumnDescriptor::new("n", NativeType::Int64)]
}

/// Single-column rows carrying 1..=n.
pub fn int_rows(n: usize) -> Vec<Vec<CellValue>> {
    (1..=n as i64).map(|v| vec![CellValue::int64(v)]).collect()
}
