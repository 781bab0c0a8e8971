//! Plant-local calendar boundaries.
//!
//! Shifts, days, weeks and months start at local wall-clock times of the
//! plant, while every instant in the crate is carried in UTC. The calendar
//! converts between the two with a fixed offset.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Timelike, Utc,
};

use crate::error::SpcError;

/// Fixed-offset plant calendar.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use u_spc::time::PlantCalendar;
///
/// // UTC+7
/// let cal = PlantCalendar::from_offset_minutes(420).unwrap();
/// let instant = Utc.with_ymd_and_hms(2025, 3, 9, 20, 0, 0).unwrap();
/// assert_eq!(cal.local_date(instant), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
/// assert_eq!(cal.local_hour(instant), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlantCalendar {
    offset: FixedOffset,
}

impl PlantCalendar {
    /// Calendar aligned with UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Calendar at `minutes` east of UTC.
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidUtcOffset`] when the offset is not strictly within
    /// +/-24 hours.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, SpcError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
            .ok_or(SpcError::InvalidUtcOffset(minutes))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Local hour of day (0..24) of `instant`.
    pub fn local_hour(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.offset).hour()
    }

    /// UTC instant of `hour`:00 local time on `date`. Hours past 23 roll
    /// into the following days.
    pub fn at_local_hour(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(hour));
        self.to_utc(local)
    }

    /// UTC instant of local midnight starting `date`.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.at_local_hour(date, 0)
    }

    /// Monday of the ISO week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let back = u64::from(date.weekday().num_days_from_monday());
        date.checked_sub_days(Days::new(back)).unwrap_or(date)
    }

    /// First day of the month containing `date`.
    pub fn month_start(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// Converts a local wall-clock time to UTC.
    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let shift = TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local - shift))
    }
}

impl Default for PlantCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn utc_calendar_round_trips_midnight() {
        let cal = PlantCalendar::utc();
        let start = cal.start_of_day(date(2025, 4, 2));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 4, 2, 0, 0, 0).unwrap());
        assert_eq!(cal.local_date(start), date(2025, 4, 2));
    }

    #[test]
    fn positive_offset_moves_midnight_back() {
        let cal = PlantCalendar::from_offset_minutes(7 * 60).unwrap();
        let start = cal.start_of_day(date(2025, 4, 2));
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 4, 1, 17, 0, 0).unwrap());
        assert_eq!(cal.local_hour(start), 0);
    }

    #[test]
    fn hours_past_midnight_roll_over() {
        let cal = PlantCalendar::utc();
        assert_eq!(
            cal.at_local_hour(date(2025, 4, 2), 30),
            Utc.with_ymd_and_hms(2025, 4, 3, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn week_starts_on_monday() {
        let cal = PlantCalendar::utc();
        // 2025-03-09 is a Sunday.
        assert_eq!(cal.week_start(date(2025, 3, 9)), date(2025, 3, 3));
        assert_eq!(cal.week_start(date(2025, 3, 3)), date(2025, 3, 3));
    }

    #[test]
    fn month_start() {
        let cal = PlantCalendar::utc();
        assert_eq!(cal.month_start(date(2024, 2, 29)), date(2024, 2, 1));
    }

    #[test]
    fn rejects_out_of_range_offset() {
        assert!(matches!(
            PlantCalendar::from_offset_minutes(24 * 60),
            Err(SpcError::InvalidUtcOffset(1440))
        ));
        assert!(PlantCalendar::from_offset_minutes(-(23 * 60 + 59)).is_ok());
    }
}
