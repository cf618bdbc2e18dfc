//! Report assembly: load the source sheets, run the metric engine, and
//! bundle every output table one report run needs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::melt::melt_monthly;
use crate::metrics::category::{
    CategoryTrendRow, ClassTotalRow, category_totals, category_trend, class_breakdown,
};
use crate::metrics::qoq::{QoqRow, qoq_series, quarter_aggregates};
use crate::metrics::yoy::{YoyRow, top_by_magnitude, top_by_volume, totals_by_maker_year, yoy_table};
use crate::normalize::{normalize_manufacturer, normalize_monthly, normalize_vehicle_class};
use crate::records::{Category, ManufacturerRecord, MonthlyRecord, VehicleClassRecord};
use crate::sheet::read_sheet;

/// Size of the top-by-magnitude growth view.
pub const TOP_MAGNITUDE_COUNT: usize = 15;
/// Bounds and default for the top-N-by-volume view.
pub const TOP_N_MIN: usize = 5;
pub const TOP_N_MAX: usize = 20;
pub const TOP_N_DEFAULT: usize = 10;
/// Makers shown in the QoQ view when the caller selects none.
const DEFAULT_QOQ_MAKERS: usize = 5;

/// One sheet to read: where it lives, which worksheet, where its header row
/// sits, and the year its rows belong to.
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
    pub header_row: usize,
    pub year: i32,
}

/// The full set of source sheets for one report run.
#[derive(Debug, Clone)]
pub struct SourceManifest {
    pub manufacturers: Vec<SheetSource>,
    pub classes: Vec<(SheetSource, Category)>,
    pub monthly: Vec<SheetSource>,
}

impl SourceManifest {
    /// The standard data-directory layout: two manufacturer-year files,
    /// one class file per category, and two monthly files. Manufacturer and
    /// class sheets keep their header on row 4 of the `reportTable`
    /// worksheet; monthly sheets keep it on row 3 of the first worksheet.
    pub fn from_data_dir(dir: &Path) -> SourceManifest {
        let report_table = |file: &str, year: i32| SheetSource {
            path: dir.join(file),
            sheet: Some("reportTable".to_string()),
            header_row: 4,
            year,
        };
        let monthly = |file: &str, year: i32| SheetSource {
            path: dir.join(file),
            sheet: None,
            header_row: 3,
            year,
        };

        SourceManifest {
            manufacturers: vec![
                report_table("m2024.xlsx", 2024),
                report_table("m2025.xlsx", 2025),
            ],
            classes: vec![
                (report_table("2W.xlsx", 2025), Category::TwoWheeler),
                (report_table("3W.xlsx", 2025), Category::ThreeWheeler),
                (report_table("4W.xlsx", 2025), Category::FourWheeler),
            ],
            monthly: vec![monthly("q2024.xlsx", 2024), monthly("q2025.xlsx", 2025)],
        }
    }
}

/// All normalized records for one run, before any metric is computed.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub manufacturers: Vec<ManufacturerRecord>,
    pub classes: Vec<VehicleClassRecord>,
    pub monthly: Vec<MonthlyRecord>,
}

/// Reads and normalizes every sheet in the manifest. Any schema or shape
/// failure aborts the whole load, with the offending file in the error
/// chain; there is no partial report.
pub fn load_sources(manifest: &SourceManifest) -> Result<SourceData> {
    let mut data = SourceData::default();

    for source in &manifest.manufacturers {
        let raw = read_sheet(&source.path, source.sheet.as_deref())
            .with_context(|| format!("reading {}", source.path.display()))?;
        let records = normalize_manufacturer(&raw, source.header_row, source.year)
            .with_context(|| format!("normalizing manufacturer sheet {}", source.path.display()))?;
        data.manufacturers.extend(records);
    }

    for (source, category) in &manifest.classes {
        let raw = read_sheet(&source.path, source.sheet.as_deref())
            .with_context(|| format!("reading {}", source.path.display()))?;
        let records = normalize_vehicle_class(&raw, source.header_row, source.year, *category)
            .with_context(|| {
                format!(
                    "normalizing {} vehicle-class sheet {}",
                    category,
                    source.path.display()
                )
            })?;
        data.classes.extend(records);
    }

    for source in &manifest.monthly {
        let raw = read_sheet(&source.path, source.sheet.as_deref())
            .with_context(|| format!("reading {}", source.path.display()))?;
        let wide = normalize_monthly(&raw, source.header_row, source.year)
            .with_context(|| format!("normalizing monthly sheet {}", source.path.display()))?;
        data.monthly.extend(melt_monthly(&wide));
    }

    info!(
        manufacturers = data.manufacturers.len(),
        classes = data.classes.len(),
        monthly = data.monthly.len(),
        "Sources loaded"
    );

    Ok(data)
}

/// Caller-supplied view criteria. Filters shape the report tables; headline
/// insights ignore them and always reflect the full dataset.
#[derive(Debug, Clone)]
pub struct ReportFilters {
    /// Inclusive year range applied to the YoY pivot.
    pub year_range: (i32, i32),
    /// Restrict the class breakdown to one category.
    pub category: Option<Category>,
    /// Makers shown in the QoQ series. `None` selects the first few
    /// distinct makers of the maker-sorted series.
    pub makers: Option<Vec<String>>,
    /// Top-N-by-volume count, clamped to [`TOP_N_MIN`]..=[`TOP_N_MAX`].
    pub top_n: usize,
}

impl Default for ReportFilters {
    fn default() -> Self {
        ReportFilters {
            year_range: (i32::MIN, i32::MAX),
            category: None,
            makers: None,
            top_n: TOP_N_DEFAULT,
        }
    }
}

/// The three headline numbers shown above the tables, always computed over
/// the unfiltered YoY data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub top_maker: String,
    pub top_growth_pct: f64,
    pub bottom_maker: String,
    pub bottom_growth_pct: f64,
    /// Overall growth in absolute registration units.
    pub overall_delta: f64,
    pub overall_growth_pct: f64,
}

/// Every presentation-ready dataset for one report run.
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// The (prior, current) year pair the YoY views compare.
    pub period: (i32, i32),
    pub yoy: Vec<YoyRow>,
    pub yoy_top_magnitude: Vec<YoyRow>,
    pub top_volume: Vec<YoyRow>,
    pub qoq: Vec<QoqRow>,
    pub category_totals: BTreeMap<Category, f64>,
    pub category_trend: Vec<CategoryTrendRow>,
    pub class_breakdown: Vec<ClassTotalRow>,
    /// (maker, year) -> total, the line-chart dataset behind the pivot.
    pub maker_year_totals: BTreeMap<(String, i32), f64>,
    pub insights: Insights,
}

fn year_span(records: &[ManufacturerRecord]) -> Option<(i32, i32)> {
    let min = records.iter().map(|r| r.year).min()?;
    let max = records.iter().map(|r| r.year).max()?;
    Some((min, max))
}

fn insights_over(data: &SourceData, prior_year: i32, current_year: i32) -> Result<Insights> {
    let full = yoy_table(&data.manufacturers, prior_year, current_year);
    let (Some(top), Some(bottom)) = (full.first(), full.last()) else {
        bail!("no makers present in years {prior_year} or {current_year}");
    };

    let total_prior: f64 = data
        .manufacturers
        .iter()
        .filter(|r| r.year == prior_year)
        .map(|r| r.total)
        .sum();
    let total_current: f64 = data
        .manufacturers
        .iter()
        .filter(|r| r.year == current_year)
        .map(|r| r.total)
        .sum();

    let overall_delta = total_current - total_prior;
    let overall_growth_pct = if total_prior != 0.0 {
        overall_delta / total_prior * 100.0
    } else {
        0.0
    };

    Ok(Insights {
        top_maker: top.maker.clone(),
        top_growth_pct: top.growth_pct,
        bottom_maker: bottom.maker.clone(),
        bottom_growth_pct: bottom.growth_pct,
        overall_delta,
        overall_growth_pct,
    })
}

fn qoq_maker_filter(filters: &ReportFilters, series: &[QoqRow]) -> Vec<String> {
    if let Some(makers) = &filters.makers {
        return makers.clone();
    }

    // Default selection: first few distinct makers of the series, which is
    // sorted by maker, so this is the alphabetically-first set.
    let mut defaults = Vec::new();
    for row in series {
        if !defaults.contains(&row.maker) {
            defaults.push(row.maker.clone());
            if defaults.len() == DEFAULT_QOQ_MAKERS {
                break;
            }
        }
    }
    defaults
}

/// Assembles the full report. Input tables are borrowed and never mutated,
/// so callers can assemble several filtered views from one load.
pub fn assemble(data: &SourceData, filters: &ReportFilters) -> Result<Report> {
    let Some((prior_year, current_year)) = year_span(&data.manufacturers) else {
        bail!("no manufacturer records loaded");
    };

    // Insights are pinned to the unfiltered data regardless of view state.
    let insights = insights_over(data, prior_year, current_year)?;

    let (from, to) = filters.year_range;
    let in_range: Vec<ManufacturerRecord> = data
        .manufacturers
        .iter()
        .filter(|r| r.year >= from && r.year <= to)
        .cloned()
        .collect();
    let (pivot_prior, pivot_current) = year_span(&in_range).unwrap_or((prior_year, current_year));

    let yoy = yoy_table(&in_range, pivot_prior, pivot_current);
    let yoy_top_magnitude = top_by_magnitude(&yoy, TOP_MAGNITUDE_COUNT);
    let top_n = filters.top_n.clamp(TOP_N_MIN, TOP_N_MAX);
    let top_volume = top_by_volume(&yoy, top_n);

    let series = qoq_series(&quarter_aggregates(&data.monthly));
    let selected = qoq_maker_filter(filters, &series);
    let qoq: Vec<QoqRow> = series
        .into_iter()
        .filter(|row| selected.iter().any(|m| m == &row.maker))
        .collect();

    Ok(Report {
        generated_at: Utc::now(),
        period: (pivot_prior, pivot_current),
        yoy,
        yoy_top_magnitude,
        top_volume,
        qoq,
        category_totals: category_totals(&data.classes),
        category_trend: category_trend(&data.classes),
        class_breakdown: class_breakdown(&data.classes, filters.category),
        maker_year_totals: totals_by_maker_year(&in_range),
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Month;
    use std::collections::BTreeMap;

    fn maker(name: &str, year: i32, total: f64) -> ManufacturerRecord {
        ManufacturerRecord {
            maker: name.to_string(),
            year,
            segment_totals: BTreeMap::new(),
            total,
        }
    }

    fn class(name: &str, year: i32, category: Category, total: f64) -> VehicleClassRecord {
        VehicleClassRecord {
            vehicle_class: name.to_string(),
            year,
            category,
            segment_totals: BTreeMap::new(),
            total,
        }
    }

    fn monthly(name: &str, year: i32, month: Month, value: f64) -> MonthlyRecord {
        MonthlyRecord {
            maker: name.to_string(),
            year,
            month,
            value,
        }
    }

    fn sample_data() -> SourceData {
        SourceData {
            manufacturers: vec![
                maker("A", 2024, 100.0),
                maker("A", 2025, 150.0),
                maker("B", 2024, 200.0),
                maker("B", 2025, 100.0),
            ],
            classes: vec![
                class("SCOOTER", 2025, Category::TwoWheeler, 300.0),
                class("MOTOR CAR", 2025, Category::FourWheeler, 120.0),
            ],
            monthly: vec![
                monthly("A", 2024, Month::Jan, 10.0),
                monthly("A", 2024, Month::Apr, 20.0),
                monthly("B", 2024, Month::Jan, 5.0),
            ],
        }
    }

    #[test]
    fn test_yoy_pivot_end_to_end() {
        let report = assemble(&sample_data(), &ReportFilters::default()).unwrap();

        assert_eq!(report.period, (2024, 2025));
        let a = report.yoy.iter().find(|r| r.maker == "A").unwrap();
        assert_eq!(a.prior_total, 100.0);
        assert_eq!(a.current_total, 150.0);
        assert_eq!(a.growth_pct, 50.0);

        // sorted descending: A (+50%) before B (-50%)
        assert_eq!(report.yoy[0].maker, "A");
        assert_eq!(report.yoy[1].maker, "B");
    }

    #[test]
    fn test_insights_over_full_data() {
        let report = assemble(&sample_data(), &ReportFilters::default()).unwrap();

        assert_eq!(report.insights.top_maker, "A");
        assert_eq!(report.insights.top_growth_pct, 50.0);
        assert_eq!(report.insights.bottom_maker, "B");
        assert_eq!(report.insights.bottom_growth_pct, -50.0);
        // totals: 300 -> 250
        assert_eq!(report.insights.overall_delta, -50.0);
        assert!((report.insights.overall_growth_pct - (-50.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_insights_ignore_filters() {
        let filters = ReportFilters {
            makers: Some(vec!["A".to_string()]),
            category: Some(Category::TwoWheeler),
            ..ReportFilters::default()
        };
        let report = assemble(&sample_data(), &filters).unwrap();

        assert_eq!(report.insights.bottom_maker, "B");
    }

    #[test]
    fn test_qoq_maker_selection() {
        let filters = ReportFilters {
            makers: Some(vec!["B".to_string()]),
            ..ReportFilters::default()
        };
        let report = assemble(&sample_data(), &filters).unwrap();

        assert_eq!(report.qoq.len(), 1);
        assert_eq!(report.qoq[0].maker, "B");
        assert_eq!(report.qoq[0].label, "2024-Q1");
    }

    #[test]
    fn test_qoq_default_selection() {
        let report = assemble(&sample_data(), &ReportFilters::default()).unwrap();
        // both makers fit the default selection; A's two quarters plus B's one
        assert_eq!(report.qoq.len(), 3);
    }

    #[test]
    fn test_qoq_default_selection_takes_first_five_sorted_makers() {
        let mut data = sample_data();
        data.monthly = ["F", "E", "D", "C", "B", "A"]
            .iter()
            .map(|name| monthly(name, 2024, Month::Jan, 1.0))
            .collect();

        let report = assemble(&data, &ReportFilters::default()).unwrap();

        let makers: Vec<&str> = report.qoq.iter().map(|r| r.maker.as_str()).collect();
        assert_eq!(makers, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn test_category_filter_shapes_breakdown_only() {
        let filters = ReportFilters {
            category: Some(Category::FourWheeler),
            ..ReportFilters::default()
        };
        let report = assemble(&sample_data(), &filters).unwrap();

        assert_eq!(report.class_breakdown.len(), 1);
        assert_eq!(report.class_breakdown[0].vehicle_class, "MOTOR CAR");
        // totals and trend stay unfiltered
        assert_eq!(report.category_totals.len(), 2);
    }

    #[test]
    fn test_top_n_clamped() {
        let filters = ReportFilters {
            top_n: 100,
            ..ReportFilters::default()
        };
        let report = assemble(&sample_data(), &filters).unwrap();
        // clamp to 20, only 2 makers available
        assert_eq!(report.top_volume.len(), 2);
        assert_eq!(report.top_volume[0].maker, "A");
    }

    #[test]
    fn test_empty_data_fails() {
        let err = assemble(&SourceData::default(), &ReportFilters::default());
        assert!(err.is_err());
    }

    #[test]
    fn test_inputs_not_mutated() {
        let data = sample_data();
        let before = data.manufacturers.clone();
        let _ = assemble(&data, &ReportFilters::default()).unwrap();
        let _ = assemble(&data, &ReportFilters::default()).unwrap();
        assert_eq!(data.manufacturers, before);
    }
}
