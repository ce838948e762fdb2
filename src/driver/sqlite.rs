//! SQLite driver adapter
//!
//! Implements the driver contract over `rusqlite`. The adapter materializes
//! a statement's rows when `execute` runs and serves them through the
//! row-advance primitive; the core pages over the primitive and never
//! depends on the buffering.
//!
//! SQLite stores values as one of five storage classes, so column values
//! surface as `Int64`, `Double` or `Bytes`; declared column types refine
//! that where they can (`BOOLEAN` columns render TRUE/FALSE, declared
//! timestamp columns decode `YYYY-MM-DD HH:MM:SS[.f]` text).

use std::collections::VecDeque;
use std::rc::Rc;

use rusqlite::types::{Value, ValueRef};

use super::{
    CellValue, ColumnDescriptor, ConnectOptions, Connection, DriverError, NativeType, Statement,
    TimestampValue,
};

/// Column metadata for `.describe`, shaped like the table listings of the
/// big-iron catalogs: name, nullability flag, declared type.
const CATALOG_QUERY: &str = "select name as \"Name\", \
     case \"notnull\" when 0 then 'Y' else 'N' end as \"Null?\", \
     type as \"Type\" \
     from pragma_table_info(?1)";

/// An open SQLite database.
pub struct SqliteConnection {
    conn: Rc<rusqlite::Connection>,
}

impl SqliteConnection {
    /// Open the database named by the connection string (a path, or
    /// `:memory:`). SQLite files carry no credentials; any username or
    /// password in the options is not consulted.
    pub fn connect(options: &ConnectOptions) -> Result<Self, DriverError> {
        let conn = rusqlite::Connection::open(&options.connection_string)
            .map_err(|e| DriverError::new("connect", e))?;
        Ok(Self { conn: Rc::new(conn) })
    }
}

impl Connection for SqliteConnection {
    type Statement = SqliteStatement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, DriverError> {
        // Surface syntax errors at prepare time, not on execute.
        self.conn
            .prepare(sql)
            .map_err(|e| DriverError::new("prepare", e))?;
        Ok(SqliteStatement {
            conn: Rc::clone(&self.conn),
            sql: sql.to_string(),
            binds: Vec::new(),
            columns: Vec::new(),
            rows: VecDeque::new(),
            current: None,
        })
    }

    fn catalog_query(&self) -> &str {
        CATALOG_QUERY
    }
}

/// A prepared statement over a SQLite connection.
#[derive(Debug)]
pub struct SqliteStatement {
    conn: Rc<rusqlite::Connection>,
    sql: String,
    binds: Vec<(usize, String)>,
    columns: Vec<ColumnDescriptor>,
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl Statement for SqliteStatement {
    fn bind_text(&mut self, pos: u32, value: &str) -> Result<(), DriverError> {
        if pos == 0 {
            return Err(DriverError::new("bind", "parameter positions are 1-based"));
        }
        self.binds.push((pos as usize, value.to_string()));
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        let mut stmt = self
            .conn
            .prepare(&self.sql)
            .map_err(|e| DriverError::new("prepare", e))?;

        let columns: Vec<ColumnDescriptor> = stmt
            .columns()
            .iter()
            .map(|c| ColumnDescriptor::new(c.name(), declared_native_type(c.decl_type())))
            .collect();

        for (pos, value) in &self.binds {
            stmt.raw_bind_parameter(*pos, value)
                .map_err(|e| DriverError::new("bind", e))?;
        }

        let mut buffered = VecDeque::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(|e| DriverError::new("execute", e))? {
            let mut owned = Vec::with_capacity(columns.len());
            for idx in 0..columns.len() {
                let value = match row
                    .get_ref(idx)
                    .map_err(|e| DriverError::new("column read", e))?
                {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Integer(v),
                    ValueRef::Real(v) => Value::Real(v),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::Blob(b.to_vec()),
                };
                owned.push(value);
            }
            buffered.push_back(owned);
        }

        self.columns = columns;
        self.rows = buffered;
        self.current = None;
        Ok(())
    }

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    fn fetch(&mut self) -> Result<bool, DriverError> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn value(&self, pos: u32) -> Result<CellValue, DriverError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| DriverError::new("column read", "no current row"))?;
        let idx = pos as usize;
        if idx == 0 || idx > row.len() {
            return Err(DriverError::new(
                "column read",
                format!("column position {pos} out of range"),
            ));
        }
        Ok(decode_value(&row[idx - 1], self.columns[idx - 1].native_type))
    }
}

/// Map a declared column type to a native tag, SQLite-affinity style:
/// keyword containment, first match wins.
fn declared_native_type(decl: Option<&str>) -> NativeType {
    let Some(decl) = decl else {
        return NativeType::Other;
    };
    let upper = decl.to_ascii_uppercase();
    if upper.contains("BOOL") {
        NativeType::Boolean
    } else if upper.contains("INT") {
        NativeType::Int64
    } else if upper.contains("TIMESTAMP") || upper.contains("DATE") || upper.contains("TIME") {
        NativeType::Timestamp
    } else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
        NativeType::Bytes
    } else if upper.contains("BLOB") {
        NativeType::Bytes
    } else if upper.contains("REAL")
        || upper.contains("FLOA")
        || upper.contains("DOUB")
        || upper.contains("NUMERIC")
        || upper.contains("DECIMAL")
    {
        NativeType::Double
    } else {
        NativeType::Other
    }
}

fn decode_value(value: &Value, column_type: NativeType) -> CellValue {
    match value {
        Value::Null => CellValue::null(column_type),
        Value::Integer(v) => match column_type {
            NativeType::Boolean => CellValue::boolean(*v != 0),
            _ => CellValue::int64(*v),
        },
        Value::Real(v) => CellValue::double(*v),
        Value::Text(text) => {
            if column_type == NativeType::Timestamp {
                if let Some(ts) = parse_timestamp(text) {
                    return CellValue::timestamp(ts);
                }
            }
            CellValue::bytes(text.clone())
        }
        Value::Blob(bytes) => CellValue::bytes(String::from_utf8_lossy(bytes).into_owned()),
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS[.fraction]` (`T` separator accepted). Returns
/// `None` for anything else; the caller falls back to text.
fn parse_timestamp(text: &str) -> Option<TimestampValue> {
    let (date, time) = text.split_once([' ', 'T'])?;
    let mut date_parts = date.splitn(3, '-');
    let year: i16 = date_parts.next()?.parse().ok()?;
    let month: u8 = date_parts.next()?.parse().ok()?;
    let day: u8 = date_parts.next()?.parse().ok()?;

    let (clock, fraction) = match time.split_once('.') {
        Some((clock, fraction)) => (clock, fraction),
        None => (time, ""),
    };
    let mut clock_parts = clock.splitn(3, ':');
    let hour: u8 = clock_parts.next()?.parse().ok()?;
    let minute: u8 = clock_parts.next()?.parse().ok()?;
    let second: u8 = clock_parts.next()?.parse().ok()?;
    let fsecond: u32 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };

    Some(TimestampValue {
        year,
        month,
        day,
        hour,
        minute,
        second,
        fsecond,
        tz_hour_offset: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::CellData;

    fn open_memory() -> SqliteConnection {
        let options = ConnectOptions {
            connection_string: ":memory:".to_string(),
            username: None,
            password: None,
        };
        SqliteConnection::connect(&options).unwrap()
    }

    fn run(conn: &SqliteConnection, sql: &str) {
        let mut stmt = conn.prepare(sql).unwrap();
        stmt.execute().unwrap();
    }

    #[test]
    fn maps_storage_classes() {
        let conn = open_memory();
        run(&conn, "create table t (n integer, x real, s text, b blob)");
        run(&conn, "insert into t values (7, 1.5, 'ab c', x'414243')");

        let mut stmt = conn.prepare("select n, x, s, b from t").unwrap();
        stmt.execute().unwrap();
        assert_eq!(stmt.columns().len(), 4);
        assert_eq!(stmt.columns()[0].name, "n");
        assert_eq!(stmt.columns()[0].native_type, NativeType::Int64);

        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::int64(7));
        assert_eq!(stmt.value(2).unwrap(), CellValue::double(1.5));
        assert_eq!(stmt.value(3).unwrap(), CellValue::bytes("ab c"));
        assert_eq!(stmt.value(4).unwrap(), CellValue::bytes("ABC"));
        assert!(!stmt.fetch().unwrap());
    }

    #[test]
    fn boolean_declared_column_renders_as_boolean() {
        let conn = open_memory();
        run(&conn, "create table flags (active boolean)");
        run(&conn, "insert into flags values (1), (0)");

        let mut stmt = conn.prepare("select active from flags").unwrap();
        stmt.execute().unwrap();
        assert_eq!(stmt.columns()[0].native_type, NativeType::Boolean);
        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::boolean(true));
        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::boolean(false));
    }

    #[test]
    fn null_carries_column_tag() {
        let conn = open_memory();
        run(&conn, "create table t (n integer)");
        run(&conn, "insert into t values (null)");

        let mut stmt = conn.prepare("select n from t").unwrap();
        stmt.execute().unwrap();
        assert!(stmt.fetch().unwrap());
        let value = stmt.value(1).unwrap();
        assert!(value.is_null());
        assert_eq!(value.native_type(), NativeType::Int64);
    }

    #[test]
    fn timestamp_declared_column_parses_text() {
        let conn = open_memory();
        run(&conn, "create table events (at timestamp)");
        run(&conn, "insert into events values ('2024-3-7 9:5:1.42')");

        let mut stmt = conn.prepare("select at from events").unwrap();
        stmt.execute().unwrap();
        assert!(stmt.fetch().unwrap());
        match stmt.value(1).unwrap().data() {
            Some(CellData::Timestamp(ts)) => {
                assert_eq!((ts.year, ts.month, ts.day), (2024, 3, 7));
                assert_eq!((ts.hour, ts.minute, ts.second), (9, 5, 1));
                assert_eq!(ts.fsecond, 42);
                assert_eq!(ts.tz_hour_offset, 0);
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_timestamp_text_falls_back_to_bytes() {
        let conn = open_memory();
        run(&conn, "create table events (at timestamp)");
        run(&conn, "insert into events values ('yesterday-ish')");

        let mut stmt = conn.prepare("select at from events").unwrap();
        stmt.execute().unwrap();
        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::bytes("yesterday-ish"));
    }

    #[test]
    fn catalog_query_lists_table_columns() {
        let conn = open_memory();
        run(
            &conn,
            "create table people (id INTEGER not null, name VARCHAR(20))",
        );

        let mut stmt = conn.prepare(conn.catalog_query()).unwrap();
        stmt.bind_text(1, "people").unwrap();
        stmt.execute().unwrap();

        let names: Vec<String> = stmt.columns().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, ["Name", "Null?", "Type"]);

        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::bytes("id"));
        assert_eq!(stmt.value(2).unwrap(), CellValue::bytes("N"));
        assert_eq!(stmt.value(3).unwrap(), CellValue::bytes("INTEGER"));

        assert!(stmt.fetch().unwrap());
        assert_eq!(stmt.value(1).unwrap(), CellValue::bytes("name"));
        assert_eq!(stmt.value(2).unwrap(), CellValue::bytes("Y"));
        assert_eq!(stmt.value(3).unwrap(), CellValue::bytes("VARCHAR(20)"));

        assert!(!stmt.fetch().unwrap());
    }

    #[test]
    fn non_query_statement_yields_no_rows() {
        let conn = open_memory();
        run(&conn, "create table t (n integer)");

        let mut stmt = conn.prepare("insert into t values (1)").unwrap();
        stmt.execute().unwrap();
        assert!(stmt.columns().is_empty());
        assert!(!stmt.fetch().unwrap());
    }

    #[test]
    fn prepare_reports_syntax_errors() {
        let conn = open_memory();
        let err = conn.prepare("selec 1").unwrap_err();
        assert_eq!(err.context, "prepare");
    }

    #[test]
    fn value_before_fetch_is_an_error() {
        let conn = open_memory();
        run(&conn, "create table t (n integer)");
        let mut stmt = conn.prepare("select n from t").unwrap();
        stmt.execute().unwrap();
        let err = stmt.value(1).unwrap_err();
        assert_eq!(err.context, "column read");
    }
}
