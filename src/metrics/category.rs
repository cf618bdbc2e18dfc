//! Category-level aggregation over vehicle-class records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::records::{Category, VehicleClassRecord};

/// Yearly total for one category, for the grouped year-by-category trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrendRow {
    pub year: i32,
    pub category: Category,
    pub total: f64,
}

/// Per-class total, for the class-level breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTotalRow {
    pub vehicle_class: String,
    pub category: Category,
    pub total: f64,
}

/// Grand total per category across all years, for the category-share view.
pub fn category_totals(records: &[VehicleClassRecord]) -> BTreeMap<Category, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.category).or_insert(0.0) += record.total;
    }
    totals
}

/// Totals grouped by (year, category), sorted by that key.
pub fn category_trend(records: &[VehicleClassRecord]) -> Vec<CategoryTrendRow> {
    let mut sums: BTreeMap<(i32, Category), f64> = BTreeMap::new();
    for record in records {
        *sums.entry((record.year, record.category)).or_insert(0.0) += record.total;
    }

    sums.into_iter()
        .map(|((year, category), total)| CategoryTrendRow {
            year,
            category,
            total,
        })
        .collect()
}

/// Per-class rows, optionally restricted to one category. Row order follows
/// the input records.
pub fn class_breakdown(
    records: &[VehicleClassRecord],
    category: Option<Category>,
) -> Vec<ClassTotalRow> {
    records
        .iter()
        .filter(|r| category.is_none_or(|c| r.category == c))
        .map(|r| ClassTotalRow {
            vehicle_class: r.vehicle_class.clone(),
            category: r.category,
            total: r.total,
        })
        .collect()
}
