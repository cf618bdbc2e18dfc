//! Core record types and the fixed month/category vocabularies.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Calendar months in the code vocabulary used by the monthly sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Column label as it appears in the source sheets.
    pub fn code(&self) -> &'static str {
        match self {
            Month::Jan => "JAN",
            Month::Feb => "FEB",
            Month::Mar => "MAR",
            Month::Apr => "APR",
            Month::May => "MAY",
            Month::Jun => "JUN",
            Month::Jul => "JUL",
            Month::Aug => "AUG",
            Month::Sep => "SEP",
            Month::Oct => "OCT",
            Month::Nov => "NOV",
            Month::Dec => "DEC",
        }
    }

    /// Resolves a header label (case-insensitive, surrounding whitespace
    /// ignored) to a month, or `None` if the label is not a month code.
    pub fn from_code(label: &str) -> Option<Month> {
        let code = label.trim().to_ascii_uppercase();
        Month::ALL.into_iter().find(|m| m.code() == code)
    }

    /// 1-based ordinal within the year.
    pub fn index(&self) -> u8 {
        *self as u8 + 1
    }

    /// Fixed month-to-quarter mapping: JAN-MAR -> 1, ..., OCT-DEC -> 4.
    pub fn quarter(&self) -> u8 {
        (self.index() - 1) / 3 + 1
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Vehicle category. Determines which segment columns a class sheet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    TwoWheeler,
    ThreeWheeler,
    FourWheeler,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::TwoWheeler,
        Category::ThreeWheeler,
        Category::FourWheeler,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Category::TwoWheeler => "2W",
            Category::ThreeWheeler => "3W",
            Category::FourWheeler => "4W",
        }
    }

    pub fn from_code(label: &str) -> Option<Category> {
        let code = label.trim().to_ascii_uppercase();
        Category::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Segment columns valid for this category's class sheets.
    pub fn segment_codes(&self) -> &'static [&'static str] {
        match self {
            Category::TwoWheeler => &["2WIC", "2WN", "2WT"],
            Category::ThreeWheeler => &["3WN", "3WT"],
            Category::FourWheeler => &["LMV", "MMV", "HMV"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_code(s).ok_or_else(|| format!("unknown vehicle category: {s}"))
    }
}

/// Segment columns carried by the manufacturer-year sheets.
pub const MANUFACTURER_SEGMENTS: &[&str] = &["4WIC", "LMV", "MMV", "HMV"];

/// One manufacturer's yearly totals. Unique per (maker, year). `total` is
/// authoritative for reporting; `segment_totals` are supplementary and may
/// not sum to it in the source data.
#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturerRecord {
    pub maker: String,
    pub year: i32,
    pub segment_totals: BTreeMap<String, f64>,
    pub total: f64,
}

/// One vehicle class's yearly totals for a given category. The category
/// decides which segment codes appear in `segment_totals`.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleClassRecord {
    pub vehicle_class: String,
    pub year: i32,
    pub category: Category,
    pub segment_totals: BTreeMap<String, f64>,
    pub total: f64,
}

/// One melted (maker, year, month) observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRecord {
    pub maker: String,
    pub year: i32,
    pub month: Month,
    pub value: f64,
}

/// Sum of the (up to three) monthly values falling in one quarter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuarterAggregate {
    pub maker: String,
    pub year: i32,
    pub quarter: u8,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_quarter_mapping() {
        assert_eq!(Month::Jan.quarter(), 1);
        assert_eq!(Month::Mar.quarter(), 1);
        assert_eq!(Month::Apr.quarter(), 2);
        assert_eq!(Month::Sep.quarter(), 3);
        assert_eq!(Month::Oct.quarter(), 4);
        assert_eq!(Month::Dec.quarter(), 4);
    }

    #[test]
    fn test_month_from_code() {
        assert_eq!(Month::from_code("JAN"), Some(Month::Jan));
        assert_eq!(Month::from_code("  dec "), Some(Month::Dec));
        assert_eq!(Month::from_code("TOTAL"), None);
        assert_eq!(Month::from_code(""), None);
    }

    #[test]
    fn test_month_index_order() {
        assert_eq!(Month::Jan.index(), 1);
        assert_eq!(Month::Dec.index(), 12);
        assert!(Month::Feb < Month::Nov);
    }

    #[test]
    fn test_category_segments() {
        assert_eq!(
            Category::TwoWheeler.segment_codes(),
            &["2WIC", "2WN", "2WT"]
        );
        assert_eq!(Category::ThreeWheeler.segment_codes(), &["3WN", "3WT"]);
        assert_eq!(Category::FourWheeler.segment_codes(), &["LMV", "MMV", "HMV"]);
    }

    #[test]
    fn test_category_from_code() {
        assert_eq!(Category::from_code("2w"), Some(Category::TwoWheeler));
        assert_eq!(Category::from_code("4W"), Some(Category::FourWheeler));
        assert_eq!(Category::from_code("5W"), None);
    }
}
