//! Sheet normalization: untyped grids into typed records.
//!
//! The source spreadsheets are irregular: the header sits several rows down,
//! the identifying column has a blank header, blank separator rows and
//! footnotes are interleaved with data, and numeric cells are sometimes
//! formatted as text. Normalization resolves all of that into one of the
//! closed record schemas, using explicit per-kind column contracts.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::PipelineError;
use crate::records::{
    Category, MANUFACTURER_SEGMENTS, ManufacturerRecord, Month, VehicleClassRecord,
};
use crate::sheet::{CellValue, RawSheet};

/// The identifying column (maker / vehicle class) is always the second
/// column; the source sheets leave its header blank, so it is resolved by
/// position, not by name.
pub const ID_COLUMN_INDEX: usize = 1;

/// A monthly sheet after normalization but before melting: one row per
/// maker, one value column per month present in the source header.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyWide {
    pub year: i32,
    /// Months whose column exists in the source, in column order.
    pub months: Vec<Month>,
    pub rows: Vec<MonthlyWideRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyWideRow {
    pub maker: String,
    /// Aligned with `MonthlyWide::months`.
    pub values: Vec<f64>,
}

/// Coerces a cell to a number. Unparseable or empty cells become 0.0;
/// parse failures never propagate. Digit-grouping commas are accepted since
/// registration exports often format counts as grouped text.
pub fn coerce_numeric(cell: &CellValue) -> f64 {
    match cell {
        CellValue::Number(n) => *n,
        CellValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        CellValue::Text(s) => s.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
        CellValue::Empty => 0.0,
    }
}

/// Reads and trims the header row. Fails with `Schema` if the offset is out
/// of range or the row is too short to contain the identifying column.
fn header_labels(raw: &RawSheet, header_row: usize) -> Result<Vec<String>, PipelineError> {
    let row = raw.rows.get(header_row).ok_or_else(|| {
        PipelineError::Schema(format!(
            "header row {} is beyond the sheet ({} rows)",
            header_row,
            raw.rows.len()
        ))
    })?;

    if row.len() <= ID_COLUMN_INDEX {
        return Err(PipelineError::Schema(format!(
            "header row {} has {} columns, identifying column {} cannot be resolved",
            header_row,
            row.len(),
            ID_COLUMN_INDEX
        )));
    }

    Ok(row.iter().map(CellValue::label).collect())
}

fn find_column(labels: &[String], name: &str) -> Option<usize> {
    labels.iter().position(|l| l == name)
}

fn require_column(labels: &[String], name: &str) -> Result<usize, PipelineError> {
    find_column(labels, name)
        .ok_or_else(|| PipelineError::InputShape(format!("required column {name} is missing")))
}

/// The trimmed identifying value of a data row, or `None` for blank
/// separator rows and footnote rows that must be dropped. Only emptiness
/// drops a row; an identifier the sheet typed as a number is still an
/// identifier.
fn id_value(row: &[CellValue]) -> Option<String> {
    let text = row.get(ID_COLUMN_INDEX)?.label();
    if text.is_empty() { None } else { Some(text) }
}

fn cell_at(row: &[CellValue], index: usize) -> f64 {
    row.get(index).map(coerce_numeric).unwrap_or(0.0)
}

/// Normalizes a manufacturer-year sheet: one record per maker, with the
/// fixed manufacturer segment columns and the authoritative TOTAL.
pub fn normalize_manufacturer(
    raw: &RawSheet,
    header_row: usize,
    year: i32,
) -> Result<Vec<ManufacturerRecord>, PipelineError> {
    let labels = header_labels(raw, header_row)?;

    let segment_cols: Vec<(&str, usize)> = MANUFACTURER_SEGMENTS
        .iter()
        .map(|name| require_column(&labels, name).map(|i| (*name, i)))
        .collect::<Result<_, _>>()?;
    let total_col = require_column(&labels, "TOTAL")?;

    let mut records = Vec::new();
    for row in &raw.rows[header_row + 1..] {
        let Some(maker) = id_value(row) else {
            continue;
        };

        let segment_totals: BTreeMap<String, f64> = segment_cols
            .iter()
            .map(|(name, idx)| (name.to_string(), cell_at(row, *idx)))
            .collect();

        records.push(ManufacturerRecord {
            maker,
            year,
            segment_totals,
            total: cell_at(row, total_col),
        });
    }

    debug!(year, records = records.len(), "Manufacturer sheet normalized");
    Ok(records)
}

/// Normalizes a vehicle-class sheet for one category: only that category's
/// segment columns are selected, everything else in the sheet is ignored.
pub fn normalize_vehicle_class(
    raw: &RawSheet,
    header_row: usize,
    year: i32,
    category: Category,
) -> Result<Vec<VehicleClassRecord>, PipelineError> {
    let labels = header_labels(raw, header_row)?;

    let segment_cols: Vec<(&str, usize)> = category
        .segment_codes()
        .iter()
        .map(|name| require_column(&labels, name).map(|i| (*name, i)))
        .collect::<Result<_, _>>()?;
    let total_col = require_column(&labels, "TOTAL")?;

    let mut records = Vec::new();
    for row in &raw.rows[header_row + 1..] {
        let Some(vehicle_class) = id_value(row) else {
            continue;
        };

        let segment_totals: BTreeMap<String, f64> = segment_cols
            .iter()
            .map(|(name, idx)| (name.to_string(), cell_at(row, *idx)))
            .collect();

        records.push(VehicleClassRecord {
            vehicle_class,
            year,
            category,
            segment_totals,
            total: cell_at(row, total_col),
        });
    }

    debug!(year, %category, records = records.len(), "Vehicle-class sheet normalized");
    Ok(records)
}

/// Normalizes a wide monthly sheet: one row per maker, one column per month
/// present in the header. A `TOTAL` column is redundant and dropped; months
/// absent from the header are simply not represented (not zero-filled).
pub fn normalize_monthly(
    raw: &RawSheet,
    header_row: usize,
    year: i32,
) -> Result<MonthlyWide, PipelineError> {
    let labels = header_labels(raw, header_row)?;

    let month_cols: Vec<(Month, usize)> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| Month::from_code(label).map(|m| (m, i)))
        .collect();

    if month_cols.is_empty() {
        return Err(PipelineError::InputShape(
            "monthly sheet has no month columns".to_string(),
        ));
    }

    let months: Vec<Month> = month_cols.iter().map(|(m, _)| *m).collect();

    let mut rows = Vec::new();
    for row in &raw.rows[header_row + 1..] {
        let Some(maker) = id_value(row) else {
            continue;
        };

        let values = month_cols.iter().map(|(_, idx)| cell_at(row, *idx)).collect();
        rows.push(MonthlyWideRow { maker, values });
    }

    debug!(year, months = months.len(), rows = rows.len(), "Monthly sheet normalized");
    Ok(MonthlyWide { year, months, rows })
}
