//! Quarter aggregation and quarter-over-quarter growth.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::metrics::pct_change;
use crate::records::{MonthlyRecord, QuarterAggregate};

/// One point of the QoQ time series, chart-ready: the `label` field carries
/// the synthetic `"{year}-Q{quarter}"` category for the x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QoqRow {
    #[serde(rename = "Maker")]
    pub maker: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Quarter")]
    pub quarter: u8,
    #[serde(rename = "Year-Quarter")]
    pub label: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "QoQ Growth %")]
    pub growth_pct: Option<f64>,
}

/// Sums monthly values into quarter aggregates per (maker, year, quarter),
/// returned sorted by that key. A quarter with no monthly rows produces no
/// aggregate rather than a zero one.
pub fn quarter_aggregates(monthly: &[MonthlyRecord]) -> Vec<QuarterAggregate> {
    let mut sums: BTreeMap<(String, i32, u8), f64> = BTreeMap::new();
    for record in monthly {
        *sums
            .entry((record.maker.clone(), record.year, record.month.quarter()))
            .or_insert(0.0) += record.value;
    }

    sums.into_iter()
        .map(|((maker, year, quarter), value)| QuarterAggregate {
            maker,
            year,
            quarter,
            value,
        })
        .collect()
}

/// Computes the QoQ series from quarter aggregates sorted by
/// (maker, year, quarter), as produced by [`quarter_aggregates`].
///
/// Growth is a strict consecutive-record percent change within each maker:
/// the first record per maker has no growth value, and when a maker skips a
/// quarter the prior is whatever record precedes it in sorted order, not a
/// zero-filled gap. A zero prior value takes the same substitute-1
/// denominator as the YoY formula, keeping the result finite.
pub fn qoq_series(aggregates: &[QuarterAggregate]) -> Vec<QoqRow> {
    let mut rows = Vec::with_capacity(aggregates.len());
    let mut prior: Option<&QuarterAggregate> = None;

    for agg in aggregates {
        let growth_pct = match prior {
            Some(p) if p.maker == agg.maker => Some(pct_change(p.value, agg.value)),
            _ => None,
        };

        rows.push(QoqRow {
            maker: agg.maker.clone(),
            year: agg.year,
            quarter: agg.quarter,
            label: format!("{}-Q{}", agg.year, agg.quarter),
            value: agg.value,
            growth_pct,
        });

        prior = Some(agg);
    }

    rows
}
