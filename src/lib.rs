pub mod error;
pub mod export;
pub mod melt;
pub mod metrics;
pub mod normalize;
pub mod records;
pub mod report;
pub mod sheet;
