//! Wide-to-long transformation for monthly data.

use crate::normalize::MonthlyWide;
use crate::records::MonthlyRecord;

/// Melts a wide monthly table into one [`MonthlyRecord`] per (maker, month)
/// pair present in the source. Months absent from the source header produce
/// no row at all: downstream percent-change treats a gap as "no prior data",
/// not as a zero value.
///
/// Output is sorted by (maker, year, month index) so that consecutive-period
/// growth is computed against the immediately preceding period.
pub fn melt_monthly(wide: &MonthlyWide) -> Vec<MonthlyRecord> {
    let mut records: Vec<MonthlyRecord> = wide
        .rows
        .iter()
        .flat_map(|row| {
            wide.months
                .iter()
                .zip(&row.values)
                .map(move |(month, value)| MonthlyRecord {
                    maker: row.maker.clone(),
                    year: wide.year,
                    month: *month,
                    value: *value,
                })
        })
        .collect();

    records.sort_by(|a, b| {
        a.maker
            .cmp(&b.maker)
            .then(a.year.cmp(&b.year))
            .then(a.month.index().cmp(&b.month.index()))
    });

    records
}
