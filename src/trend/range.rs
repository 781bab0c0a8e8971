use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpcError;
use crate::time::{step_instant, TimeUnit};

/// Look-back window of a trend query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
    #[serde(rename = "90days")]
    NinetyDays,
    #[serde(rename = "1year")]
    OneYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::SevenDays,
        TimeRange::ThirtyDays,
        TimeRange::NinetyDays,
        TimeRange::OneYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7days",
            TimeRange::ThirtyDays => "30days",
            TimeRange::NinetyDays => "90days",
            TimeRange::OneYear => "1year",
        }
    }

    /// Concrete `[start, now)` window ending at `now`.
    ///
    /// `1year` steps back twelve calendar months rather than 365 days.
    pub fn resolve(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let (unit, amount) = match self {
            TimeRange::SevenDays => (TimeUnit::Day, 7),
            TimeRange::ThirtyDays => (TimeUnit::Day, 30),
            TimeRange::NinetyDays => (TimeUnit::Day, 90),
            TimeRange::OneYear => (TimeUnit::Month, 12),
        };
        let start = step_instant(now, unit, -amount).unwrap_or(DateTime::<Utc>::MIN_UTC);
        (start, now)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = SpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| SpcError::UnknownTimeRange(s.to_string()))
    }
}
