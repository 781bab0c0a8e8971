//! Historical capability trends.
//!
//! [`TrendService`] groups stored analysis runs by plant-local calendar
//! date. Cp, Pp and Ppk on a trend line are estimates derived from Cpk with
//! fixed [`TrendRatios`]; query the engine per period for exact values.

mod range;
mod service;

pub use range::TimeRange;
pub use service::{ImprovementSummary, TrendPoint, TrendRatios, TrendService};
