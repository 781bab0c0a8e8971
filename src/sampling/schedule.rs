//! Sampling schedules.
//!
//! A schedule is never stored; it is regenerated from `(start, end,
//! interval)` whenever it is needed. Element `k` is `start` stepped by
//! `k * interval`, measured from `start` each time so that calendar clamping
//! (Jan 31 -> Feb 28) does not accumulate into later elements.

use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{step_instant, TimeUnit};

/// A positive step of `value` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub value: NonZeroU32,
    pub unit: TimeUnit,
}

impl Interval {
    /// Returns `None` for a zero value, which would never advance.
    pub fn new(value: u32, unit: TimeUnit) -> Option<Self> {
        NonZeroU32::new(value).map(|value| Self { value, unit })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Target sample instants over `[start, end]`.
///
/// The schedule is lazy and restartable: every call to [`iter`](Self::iter)
/// starts again from `start`. It is empty when `start > end`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use u_spc::sampling::{Interval, SamplingSchedule};
/// use u_spc::time::TimeUnit;
///
/// let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2025, 1, 1, 2, 0, 0).unwrap();
/// let every_30_min = Interval::new(30, TimeUnit::Minute).unwrap();
///
/// let schedule = SamplingSchedule::new(start, end, every_30_min);
/// assert_eq!(schedule.len(), 5);
/// assert_eq!(schedule.iter().last(), Some(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingSchedule {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Interval,
}

impl SamplingSchedule {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, interval: Interval) -> Self {
        Self {
            start,
            end,
            interval,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Iterates the scheduled instants in increasing order.
    pub fn iter(&self) -> ScheduleIter {
        ScheduleIter {
            schedule: *self,
            step: 0,
            done: self.start > self.end,
        }
    }

    /// Number of scheduled instants.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Materializes the schedule.
    pub fn to_vec(&self) -> Vec<DateTime<Utc>> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a SamplingSchedule {
    type Item = DateTime<Utc>;
    type IntoIter = ScheduleIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`SamplingSchedule`].
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: SamplingSchedule,
    step: i64,
    done: bool,
}

impl Iterator for ScheduleIter {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Interval { value, unit } = self.schedule.interval;
        let amount = self.step.checked_mul(i64::from(value.get()));
        let next = amount.and_then(|a| step_instant(self.schedule.start, unit, a));
        match next {
            Some(instant) if instant <= self.schedule.end => {
                self.step += 1;
                Some(instant)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for ScheduleIter {}

/// Builds the schedule from `start` to `end` (inclusive) every `interval`.
pub fn build_schedule(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Interval,
) -> SamplingSchedule {
    SamplingSchedule::new(start, end, interval)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn unit_strategy() -> impl Strategy<Value = TimeUnit> {
        prop::sample::select(TimeUnit::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn monotonic_and_within_bounds(
            start_secs in 1_600_000_000_i64..1_700_000_000,
            span_secs in 0_i64..400 * 86_400,
            value in 1_u32..50,
            unit in unit_strategy(),
        ) {
            let start = Utc.timestamp_opt(start_secs, 0).unwrap();
            let end = Utc.timestamp_opt(start_secs + span_secs, 0).unwrap();
            let interval = Interval::new(value, unit).unwrap();
            let points = build_schedule(start, end, interval).to_vec();

            prop_assert_eq!(points.first().copied(), Some(start));
            for pair in points.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for p in &points {
                prop_assert!(*p >= start && *p <= end);
            }
        }

        #[test]
        fn terminates_within_step_bound(
            start_secs in 1_600_000_000_i64..1_700_000_000,
            span_secs in 0_i64..30 * 86_400,
            value in 1_u32..120,
        ) {
            let start = Utc.timestamp_opt(start_secs, 0).unwrap();
            let end = Utc.timestamp_opt(start_secs + span_secs, 0).unwrap();
            let interval = Interval::new(value, TimeUnit::Minute).unwrap();
            let step = i64::from(value) * 60;
            let bound = (span_secs + step - 1) / step + 1;
            prop_assert!(build_schedule(start, end, interval).len() as i64 <= bound);
        }
    }
}
