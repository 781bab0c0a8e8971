//! Time units and instant stepping.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpcError;

/// Granularity of a sampling interval or reporting window.
///
/// Ordered from coarsest to finest, which is also the order in which
/// [`suggest_interval`](crate::sampling::suggest_interval) considers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
}

impl TimeUnit {
    /// All units, coarsest first.
    pub const ALL: [TimeUnit; 7] = [
        TimeUnit::Year,
        TimeUnit::Month,
        TimeUnit::Week,
        TimeUnit::Day,
        TimeUnit::Hour,
        TimeUnit::Minute,
        TimeUnit::Second,
    ];

    /// Lowercase name as stored by plan administration.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Month => "month",
            TimeUnit::Week => "week",
            TimeUnit::Day => "day",
            TimeUnit::Hour => "hour",
            TimeUnit::Minute => "minute",
            TimeUnit::Second => "second",
        }
    }

    /// Whether stepping by this unit follows the calendar instead of a
    /// fixed number of seconds.
    pub fn is_calendar(self) -> bool {
        matches!(self, TimeUnit::Year | TimeUnit::Month)
    }

    /// Fixed length in seconds for linear units, `None` for month and year.
    pub fn fixed_seconds(self) -> Option<i64> {
        match self {
            TimeUnit::Year | TimeUnit::Month => None,
            TimeUnit::Week => Some(7 * 86_400),
            TimeUnit::Day => Some(86_400),
            TimeUnit::Hour => Some(3_600),
            TimeUnit::Minute => Some(60),
            TimeUnit::Second => Some(1),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = SpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeUnit::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| SpcError::UnknownTimeUnit(s.to_string()))
    }
}

/// Moves `instant` by `amount` units (negative amounts step backwards).
///
/// Month and year steps use calendar months. When the target month is
/// shorter than the source day, the result is clamped to the last day of
/// that month (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year); the
/// time of day is preserved. Week, day, hour, minute and second steps are
/// linear.
///
/// Returns `None` only when the result is outside chrono's representable
/// range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_spc::time::{step_instant, TimeUnit};
///
/// let jan31 = Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).unwrap();
/// let feb = step_instant(jan31, TimeUnit::Month, 1).unwrap();
/// assert_eq!(feb, Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap());
///
/// let later = step_instant(jan31, TimeUnit::Hour, 36).unwrap();
/// assert_eq!(later, Utc.with_ymd_and_hms(2025, 2, 1, 20, 0, 0).unwrap());
/// ```
pub fn step_instant(instant: DateTime<Utc>, unit: TimeUnit, amount: i64) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Year => step_months(instant, amount.checked_mul(12)?),
        TimeUnit::Month => step_months(instant, amount),
        linear => {
            let per_unit = linear.fixed_seconds()?;
            let delta = TimeDelta::try_seconds(amount.checked_mul(per_unit)?)?;
            instant.checked_add_signed(delta)
        }
    }
}

fn step_months(instant: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        instant.checked_add_months(magnitude)
    } else {
        instant.checked_sub_months(magnitude)
    }
}
