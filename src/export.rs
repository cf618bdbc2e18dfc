//! CSV exports: the headline summary table and the QoQ series.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::metrics::qoq::QoqRow;
use crate::records::Category;
use crate::report::Report;

/// One row of the exported summary table. Column order is fixed:
/// Metric, Value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
}

fn row(metric: &str, value: String) -> SummaryRow {
    SummaryRow {
        metric: metric.to_string(),
        value,
    }
}

/// Rounds to a whole count and inserts digit-grouping commas.
fn group_digits(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Builds the summary table from a report: the three headline insights
/// followed by the per-category grand totals.
pub fn summary_rows(report: &Report) -> Vec<SummaryRow> {
    let insights = &report.insights;

    let mut rows = vec![
        row("Top Growing Manufacturer", insights.top_maker.clone()),
        row("Top Growth %", format!("{:.2}%", insights.top_growth_pct)),
        row("Lowest Growth Manufacturer", insights.bottom_maker.clone()),
        row(
            "Lowest Growth %",
            format!("{:.2}%", insights.bottom_growth_pct),
        ),
        row(
            "Overall Growth Units",
            format!("{} units", group_digits(insights.overall_delta)),
        ),
        row(
            "Overall Growth %",
            format!("{:.2}%", insights.overall_growth_pct),
        ),
    ];

    for category in Category::ALL {
        let total = report.category_totals.get(&category).copied().unwrap_or(0.0);
        rows.push(row(
            &format!("Total {category} Registered"),
            group_digits(total),
        ));
    }

    rows
}

/// Logs the headline insights as pretty-printed JSON.
pub fn print_insights_json(report: &Report) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(&report.insights)?);
    Ok(())
}

/// Writes the summary table to `path` as CSV.
pub fn write_summary(path: &Path, report: &Report) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for summary_row in summary_rows(report) {
        writer.serialize(summary_row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), "Summary CSV written");
    Ok(())
}

/// Writes the (already filtered) QoQ series to `path` as CSV, carrying the
/// in-memory schema plus the derived growth column. Records with no prior
/// quarter export an empty growth field.
pub fn write_qoq_series(path: &Path, rows: &[QoqRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for qoq_row in rows {
        writer.serialize(qoq_row)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "QoQ CSV written");
    Ok(())
}
