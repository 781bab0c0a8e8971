//! Raw measurement values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single measured value and the instant it was taken.
///
/// Values must already be numeric; parsing of upstream strings is the
/// caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    pub fn new(value: f64, timestamp: DateTime<Utc>) -> Self {
        Self { value, timestamp }
    }
}

/// Extracts the values of a series in order.
pub(crate) fn values_of(series: &[Measurement]) -> Vec<f64> {
    series.iter().map(|m| m.value).collect()
}
