//! Result formatting
//!
//! Two layers: [`format_cell`] turns one typed column value into display
//! text (the per-type rules are a closed match over the driver's tag set),
//! and [`OutputFormatter`] assembles formatted pages into a table for the
//! terminal.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::driver::{CellData, CellValue, ColumnDescriptor};
use crate::pager::ResultPage;

/// Rendering of a null cell, any type.
pub const NULL_LITERAL: &str = "<null>";

/// Decode a typed, possibly-null column value into display text. The null
/// check short-circuits type-specific rendering; unsigned values are never
/// rendered with a sign; timestamps print their components verbatim with no
/// zero-padding.
pub fn format_cell(value: &CellValue) -> String {
    let Some(data) = value.data() else {
        return NULL_LITERAL.to_string();
    };
    match data {
        CellData::Boolean(true) => "TRUE".to_string(),
        CellData::Boolean(false) => "FALSE".to_string(),
        CellData::Bytes(text) => format!("\"{}\"", text),
        CellData::Double(v) => v.to_string(),
        CellData::Float(v) => v.to_string(),
        CellData::Int64(v) => v.to_string(),
        CellData::Uint64(v) => v.to_string(),
        CellData::Timestamp(ts) => format!(
            "{}-{}-{} {}:{}:{}.{} Z{}",
            ts.year, ts.month, ts.day, ts.hour, ts.minute, ts.second, ts.fsecond, ts.tz_hour_offset
        ),
        CellData::Unsupported => "unsupported type".to_string(),
    }
}

/// Renders pages of formatted cells as tables.
pub struct OutputFormatter {
    color: bool,
}

impl OutputFormatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Lay out one page under its column headers. The header row is bold and
    /// null cells are italic when color is enabled; null styling applies to
    /// the columns the page flagged as having held a null.
    pub fn render_page(&self, columns: &[ColumnDescriptor], page: &ResultPage) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let header: Vec<Cell> = columns
            .iter()
            .map(|column| {
                let cell = Cell::new(&column.name);
                if self.color {
                    cell.add_attribute(Attribute::Bold)
                } else {
                    cell
                }
            })
            .collect();
        table.set_header(header);

        for row in &page.rows {
            let cells: Vec<Cell> = row
                .iter()
                .enumerate()
                .map(|(idx, text)| {
                    let cell = Cell::new(text);
                    if self.color && text == NULL_LITERAL && page.null_columns.contains(&idx) {
                        cell.add_attribute(Attribute::Italic)
                    } else {
                        cell
                    }
                })
                .collect();
            table.add_row(cells);
        }

        table.to_string()
    }
}
