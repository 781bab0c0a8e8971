//! Automatic interval selection.
//!
//! Picks the coarsest unit whose bucket still fits the requested number of
//! points into a window, then rounds the per-point step up so the schedule
//! never runs more than one point over the target.

use chrono::{DateTime, Utc};

use super::schedule::Interval;
use crate::time::TimeUnit;

/// Target number of schedule points when the caller has no preference.
pub const DEFAULT_DESIRED_SAMPLE_COUNT: usize = 20;

/// Days counted as one year bucket.
pub const DAYS_PER_YEAR_BUCKET: i64 = 365;
/// Days counted as one month bucket.
pub const DAYS_PER_MONTH_BUCKET: i64 = 30;
/// Days counted as one week bucket.
pub const DAYS_PER_WEEK_BUCKET: i64 = 7;

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Bucket widths in seconds, coarsest first.
const BUCKETS: [(TimeUnit, i64); 6] = [
    (TimeUnit::Year, DAYS_PER_YEAR_BUCKET * SECONDS_PER_DAY),
    (TimeUnit::Month, DAYS_PER_MONTH_BUCKET * SECONDS_PER_DAY),
    (TimeUnit::Week, DAYS_PER_WEEK_BUCKET * SECONDS_PER_DAY),
    (TimeUnit::Day, SECONDS_PER_DAY),
    (TimeUnit::Hour, SECONDS_PER_HOUR),
    (TimeUnit::Minute, SECONDS_PER_MINUTE),
];

/// Suggests an interval that spreads about `desired_count` points over
/// `[start, end]`.
///
/// A unit is chosen when the span covers at least `desired_count` of its
/// buckets; the value is `ceil(span / (bucket * desired_count))`. Spans too
/// short for whole minutes fall through to seconds. A `desired_count` of 0
/// is treated as 1 and an empty or inverted window yields one second.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_spc::sampling::suggest_interval;
/// use u_spc::time::TimeUnit;
///
/// let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let interval = suggest_interval(start, start + Duration::days(10), 10);
/// assert_eq!(interval.value.get(), 1);
/// assert_eq!(interval.unit, TimeUnit::Day);
/// ```
pub fn suggest_interval(start: DateTime<Utc>, end: DateTime<Utc>, desired_count: usize) -> Interval {
    let finest = Interval {
        value: std::num::NonZeroU32::MIN,
        unit: TimeUnit::Second,
    };
    if start >= end {
        return finest;
    }

    let span = i128::from((end - start).num_seconds());
    let count = i128::try_from(desired_count.max(1)).unwrap_or(i128::MAX);

    let (unit, bucket) = BUCKETS
        .iter()
        .copied()
        .find(|&(_, bucket)| span >= i128::from(bucket).saturating_mul(count))
        .unwrap_or((TimeUnit::Second, 1));

    let per_point = i128::from(bucket).saturating_mul(count);
    let value = ceil_div(span, per_point).max(1);
    let value = u32::try_from(value).unwrap_or(u32::MAX);
    Interval::new(value, unit).unwrap_or(finest)
}

fn ceil_div(a: i128, b: i128) -> i128 {
    (a + b - 1) / b
}
