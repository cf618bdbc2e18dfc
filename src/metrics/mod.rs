//! Derived metrics over normalized records.
//!
//! Growth, quarter aggregation, ranking, and category shares. Nothing here
//! errors on missing data: absent periods are substituted with 0, a zero
//! denominator is substituted with 1, and a missing prior record yields no
//! growth value at all.

pub mod category;
pub mod qoq;
pub mod yoy;

/// Percent change from `prior` to `current`.
///
/// A zero prior is substituted with 1 before dividing, so growth from 0 to N
/// reads as N x 100% instead of dividing by zero. The result is always
/// finite.
pub fn pct_change(prior: f64, current: f64) -> f64 {
    let base = if prior == 0.0 { 1.0 } else { prior };
    (current - prior) / base * 100.0
}
