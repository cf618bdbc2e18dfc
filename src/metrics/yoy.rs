//! Year-over-year growth and the ranking views derived from it.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::metrics::pct_change;
use crate::records::ManufacturerRecord;

/// One row of the YoY pivot: a maker's totals for the two compared years and
/// the resulting growth percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YoyRow {
    pub maker: String,
    pub prior_total: f64,
    pub current_total: f64,
    pub growth_pct: f64,
}

/// Sums totals per (maker, year). Duplicate maker rows within a year are
/// summed rather than rejected.
pub fn totals_by_maker_year(records: &[ManufacturerRecord]) -> BTreeMap<(String, i32), f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals
            .entry((record.maker.clone(), record.year))
            .or_insert(0.0) += record.total;
    }
    totals
}

/// Builds the YoY pivot over the union of makers seen in either year.
///
/// A maker missing from one year contributes 0 for that year rather than
/// being dropped, so every maker in the data appears exactly once. Rows are
/// sorted descending by growth percentage.
pub fn yoy_table(
    records: &[ManufacturerRecord],
    prior_year: i32,
    current_year: i32,
) -> Vec<YoyRow> {
    let totals = totals_by_maker_year(records);

    let makers: BTreeSet<&String> = totals
        .keys()
        .filter(|(_, year)| *year == prior_year || *year == current_year)
        .map(|(maker, _)| maker)
        .collect();

    let mut rows: Vec<YoyRow> = makers
        .into_iter()
        .map(|maker| {
            let prior = totals
                .get(&(maker.clone(), prior_year))
                .copied()
                .unwrap_or(0.0);
            let current = totals
                .get(&(maker.clone(), current_year))
                .copied()
                .unwrap_or(0.0);
            YoyRow {
                maker: maker.clone(),
                prior_total: prior,
                current_total: current,
                growth_pct: pct_change(prior, current),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.growth_pct.total_cmp(&a.growth_pct));
    rows
}

/// Selects the `k` rows with the largest absolute growth, then re-sorts the
/// subset ascending by signed growth. The ascending order is a horizontal-bar
/// layout convention: most negative bar first, most positive last.
pub fn top_by_magnitude(rows: &[YoyRow], k: usize) -> Vec<YoyRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| b.growth_pct.abs().total_cmp(&a.growth_pct.abs()));
    ranked.truncate(k);
    ranked.sort_by(|a, b| a.growth_pct.total_cmp(&b.growth_pct));
    ranked
}

/// The top `n` makers by current-year volume, full rows retained. The sort
/// is stable, so ties keep their original relative order.
pub fn top_by_volume(rows: &[YoyRow], n: usize) -> Vec<YoyRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| b.current_total.total_cmp(&a.current_total));
    ranked.truncate(n);
    ranked
}
