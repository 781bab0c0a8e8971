//! Period types, shifts and the windows they cover.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpcError;
use crate::time::PlantCalendar;

/// Granularity of a period summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Shift,
    Day,
    Week,
    Month,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Shift,
        PeriodType::Day,
        PeriodType::Week,
        PeriodType::Month,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodType::Shift => "shift",
            PeriodType::Day => "day",
            PeriodType::Week => "week",
            PeriodType::Month => "month",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = SpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SpcError::UnknownPeriodType(s.to_string()))
    }
}

/// Working shift of the plant day.
///
/// | Shift | Local window |
/// |---|---|
/// | morning | 06:00 - 14:00 |
/// | afternoon | 14:00 - 22:00 |
/// | night | 22:00 - 06:00 next day |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

/// Length of every shift in hours.
pub const SHIFT_HOURS: u32 = 8;

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Afternoon, Shift::Night];

    /// Local hour at which the shift starts.
    pub fn start_hour(self) -> u32 {
        match self {
            Shift::Morning => 6,
            Shift::Afternoon => 14,
            Shift::Night => 22,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Shift::Morning => "morning",
            Shift::Afternoon => "afternoon",
            Shift::Night => "night",
        }
    }

    /// The shift covering local `hour` and the local date on which that
    /// shift started. Hours before 06:00 belong to the night shift of the
    /// previous date.
    pub fn at_local(date: NaiveDate, hour: u32) -> (Shift, NaiveDate) {
        match hour {
            6..=13 => (Shift::Morning, date),
            14..=21 => (Shift::Afternoon, date),
            h if h >= 22 => (Shift::Night, date),
            _ => (Shift::Night, date.pred_opt().unwrap_or(date)),
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shift {
    type Err = SpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Shift::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| SpcError::UnknownShift(s.to_string()))
    }
}

/// A concrete period instance `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub period_type: PeriodType,
    /// Set for shift periods.
    pub shift: Option<Shift>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    /// The period of `period_type` containing `at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use u_spc::aggregation::{PeriodType, PeriodWindow, Shift};
    /// use u_spc::time::PlantCalendar;
    ///
    /// let cal = PlantCalendar::utc();
    /// let at = Utc.with_ymd_and_hms(2025, 3, 10, 2, 15, 0).unwrap();
    ///
    /// let w = PeriodWindow::containing(PeriodType::Shift, at, &cal);
    /// assert_eq!(w.shift, Some(Shift::Night));
    /// assert_eq!(w.start, Utc.with_ymd_and_hms(2025, 3, 9, 22, 0, 0).unwrap());
    /// assert_eq!(w.end, Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap());
    /// ```
    pub fn containing(period_type: PeriodType, at: DateTime<Utc>, calendar: &PlantCalendar) -> Self {
        let date = calendar.local_date(at);
        match period_type {
            PeriodType::Shift => {
                let (shift, shift_date) = Shift::at_local(date, calendar.local_hour(at));
                Self::shift(shift_date, shift, calendar)
            }
            PeriodType::Day => Self::day(date, calendar),
            PeriodType::Week => Self::week(date, calendar),
            PeriodType::Month => Self::month(date, calendar),
        }
    }

    /// The `shift` that starts on local `date`.
    pub fn shift(date: NaiveDate, shift: Shift, calendar: &PlantCalendar) -> Self {
        let start_hour = shift.start_hour();
        Self {
            period_type: PeriodType::Shift,
            shift: Some(shift),
            start: calendar.at_local_hour(date, start_hour),
            end: calendar.at_local_hour(date, start_hour + SHIFT_HOURS),
        }
    }

    /// The local day `date`.
    pub fn day(date: NaiveDate, calendar: &PlantCalendar) -> Self {
        Self {
            period_type: PeriodType::Day,
            shift: None,
            start: calendar.start_of_day(date),
            end: calendar.start_of_day(next_day(date)),
        }
    }

    /// The Monday-based week containing `date`.
    pub fn week(date: NaiveDate, calendar: &PlantCalendar) -> Self {
        let monday = calendar.week_start(date);
        let next = monday.checked_add_days(Days::new(7)).unwrap_or(monday);
        Self {
            period_type: PeriodType::Week,
            shift: None,
            start: calendar.start_of_day(monday),
            end: calendar.start_of_day(next),
        }
    }

    /// The calendar month containing `date`.
    pub fn month(date: NaiveDate, calendar: &PlantCalendar) -> Self {
        let first = calendar.month_start(date);
        let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
        Self {
            period_type: PeriodType::Month,
            shift: None,
            start: calendar.start_of_day(first),
            end: calendar.start_of_day(next),
        }
    }

    /// Half-open ranges to query for this period.
    ///
    /// A period crossing local midnight is split there, so the night shift
    /// is read as `[22:00, 24:00)` of its start date plus `[00:00, 06:00)`
    /// of the next.
    pub fn query_ranges(&self, calendar: &PlantCalendar) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let midnight = calendar.start_of_day(next_day(calendar.local_date(self.start)));
        if self.period_type == PeriodType::Shift && self.start < midnight && midnight < self.end {
            vec![(self.start, midnight), (midnight, self.end)]
        } else {
            vec![(self.start, self.end)]
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
