//! XLSX reading into untyped cell grids.
//!
//! The rest of the pipeline only sees [`RawSheet`]; this module is the one
//! place that touches the workbook format.

use calamine::{Data, Reader, Xlsx, open_workbook};
use std::path::Path;
use tracing::debug;

use crate::error::PipelineError;

/// A single spreadsheet cell, reduced to the closed set of value kinds the
/// pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text content, if this cell holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The cell rendered as a header label: text is trimmed, numbers are
    /// formatted, everything else is the empty string.
    pub fn label(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

/// An untyped grid of cells as read from one worksheet. Row 0 is the first
/// row of the sheet; header offsets are applied by the normalizer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<CellValue>>,
}

impl RawSheet {
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        RawSheet { rows }
    }
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Error cells carry no usable value; downstream coercion maps
        // empty cells to zero anyway.
        Data::Error(_) => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// Reads one worksheet from an xlsx workbook into a [`RawSheet`].
///
/// When `sheet_name` is `None` the first sheet in the workbook is used.
pub fn read_sheet(path: &Path, sheet_name: Option<&str>) -> Result<RawSheet, PipelineError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| PipelineError::SheetNotFound(format!("{}: workbook has no sheets", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|_| PipelineError::SheetNotFound(format!("{} in {}", name, path.display())))?;

    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    debug!(path = %path.display(), sheet = %name, rows = rows.len(), "Sheet read");

    Ok(RawSheet { rows })
}
