//! Trend and comparison queries over analysis history.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::range::TimeRange;
use crate::aggregation::average;
use crate::source::{AnalysisRun, AnalysisSource, RunScope};
use crate::time::PlantCalendar;

/// Multipliers deriving Cp, Pp and Ppk from Cpk on trend lines.
///
/// These are display estimates; exact indices come from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendRatios {
    pub cp_ratio: f64,
    pub pp_ratio: f64,
    pub ppk_ratio: f64,
}

impl Default for TrendRatios {
    fn default() -> Self {
        Self {
            cp_ratio: 1.05,
            pp_ratio: 1.02,
            ppk_ratio: 0.98,
        }
    }
}

/// One calendar-date bucket of a trend line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub cpk: Option<f64>,
    pub cp: Option<f64>,
    pub pp: Option<f64>,
    pub ppk: Option<f64>,
    pub min_cpk: Option<f64>,
    pub max_cpk: Option<f64>,
    /// Runs in the bucket.
    pub count: usize,
    pub ca: Option<f64>,
    pub cr: Option<f64>,
}

/// Average Cpk of the first half of a window against the second half.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSummary {
    pub first_period_cpk: f64,
    pub second_period_cpk: f64,
    pub change: f64,
    /// Relative change in percent; 0 when the first half averaged 0.
    pub change_percent: f64,
    pub improved: bool,
    pub first_period_count: usize,
    pub second_period_count: usize,
    pub period_start: DateTime<Utc>,
    pub midpoint: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

/// Read-only trend queries for dashboards.
///
/// Source failures are logged and answered with `[]` or `None`.
pub struct TrendService {
    source: Arc<dyn AnalysisSource>,
    calendar: PlantCalendar,
    ratios: TrendRatios,
}

impl TrendService {
    pub fn new(source: Arc<dyn AnalysisSource>, calendar: PlantCalendar) -> Self {
        Self {
            source,
            calendar,
            ratios: TrendRatios::default(),
        }
    }

    pub fn with_ratios(mut self, ratios: TrendRatios) -> Self {
        self.ratios = ratios;
        self
    }

    /// Per-date trend of `scope` over `range` ending at `now`, oldest date
    /// first. Dates without runs are absent.
    pub fn trend(&self, scope: RunScope, range: TimeRange, now: DateTime<Utc>) -> Vec<TrendPoint> {
        let (start, end) = range.resolve(now);
        let runs = match self.source.runs(scope, start, end) {
            Ok(runs) => runs,
            Err(e) => {
                error!("failed to load {} trend of {}: {}", range, scope, e);
                return Vec::new();
            }
        };

        let mut buckets: BTreeMap<NaiveDate, Vec<AnalysisRun>> = BTreeMap::new();
        for run in runs {
            buckets.entry(self.calendar.local_date(run.recorded_at)).or_default().push(run);
        }
        debug!("{} trend of {}: {} dates", range, scope, buckets.len());

        buckets
            .into_iter()
            .map(|(date, runs)| self.point(date, &runs))
            .collect()
    }

    /// Trend points for explicit local dates, in the order given. Dates
    /// without runs are omitted.
    pub fn comparison_by_dates(&self, scope: RunScope, dates: &[NaiveDate]) -> Vec<TrendPoint> {
        let mut points = Vec::with_capacity(dates.len());
        for &date in dates {
            let start = self.calendar.start_of_day(date);
            let end = self.calendar.start_of_day(date.succ_opt().unwrap_or(date));
            match self.source.runs(scope, start, end) {
                Ok(runs) if runs.is_empty() => {}
                Ok(runs) => points.push(self.point(date, &runs)),
                Err(e) => {
                    error!("failed to load date comparison of {}: {}", scope, e);
                    return Vec::new();
                }
            }
        }
        points
    }

    /// Splits the resolved window at its midpoint and compares average Cpk
    /// of the two halves. A half without any Cpk averages 0.
    pub fn improvement_summary(
        &self,
        scope: RunScope,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Option<ImprovementSummary> {
        let (start, end) = range.resolve(now);
        let midpoint = start + (end - start) / 2;

        let halves = self
            .source
            .runs(scope, start, midpoint)
            .and_then(|first| Ok((first, self.source.runs(scope, midpoint, end)?)));
        let (first, second) = match halves {
            Ok(halves) => halves,
            Err(e) => {
                error!("failed to load {} improvement summary of {}: {}", range, scope, e);
                return None;
            }
        };

        let first_cpk = half_cpk(&first);
        let second_cpk = half_cpk(&second);
        let change = second_cpk - first_cpk;
        let change_percent = if first_cpk == 0.0 { 0.0 } else { change / first_cpk * 100.0 };

        Some(ImprovementSummary {
            first_period_cpk: first_cpk,
            second_period_cpk: second_cpk,
            change,
            change_percent,
            improved: change > 0.0,
            first_period_count: first.len(),
            second_period_count: second.len(),
            period_start: start,
            midpoint,
            period_end: end,
        })
    }

    fn point(&self, date: NaiveDate, runs: &[AnalysisRun]) -> TrendPoint {
        let cpks: Vec<f64> = runs.iter().filter_map(|r| r.cpk).collect();
        let cpk = average(cpks.iter().copied());
        let derive = |ratio: f64| cpk.map(|c| c * ratio);
        TrendPoint {
            date,
            cpk,
            cp: derive(self.ratios.cp_ratio),
            pp: derive(self.ratios.pp_ratio),
            ppk: derive(self.ratios.ppk_ratio),
            min_cpk: cpks.iter().copied().reduce(f64::min),
            max_cpk: cpks.iter().copied().reduce(f64::max),
            count: runs.len(),
            ca: average(runs.iter().filter_map(|r| r.ca)),
            cr: average(runs.iter().filter_map(|r| r.cr)),
        }
    }
}

fn half_cpk(runs: &[AnalysisRun]) -> f64 {
    average(runs.iter().filter_map(|r| r.cpk)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InMemoryStore, LineId, PlanId};
    use chrono::{Days, Duration, TimeZone};

    fn run(recorded_at: DateTime<Utc>, cpk: Option<f64>) -> AnalysisRun {
        AnalysisRun {
            plan_id: PlanId(1),
            line_id: Some(LineId(4)),
            recorded_at,
            sample_count: 5,
            mean: 10.0,
            std_dev: 0.1,
            min: 9.8,
            max: 10.2,
            ucl: 10.3,
            lcl: 9.7,
            cp: cpk.map(|c| c + 0.05),
            cpk,
            pp: None,
            ppk: None,
            ca: Some(0.1),
            cr: Some(0.7),
            violation_count: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 18, 0, 0).unwrap()
    }

    fn service(store: &Arc<InMemoryStore>) -> TrendService {
        TrendService::new(store.clone(), PlantCalendar::utc())
    }

    #[test]
    fn seven_day_trend_with_constant_cpk() {
        let store = Arc::new(InMemoryStore::new());
        let today_noon = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        for back in 0..7 {
            store.record_run(run(today_noon - Duration::days(back), Some(1.50)));
        }
        // Outside the window.
        store.record_run(run(today_noon - Duration::days(7), Some(0.5)));

        let points = service(&store).trend(RunScope::Plan(PlanId(1)), TimeRange::SevenDays, now());
        assert_eq!(points.len(), 7);
        for p in &points {
            assert!((p.cpk.unwrap() - 1.50).abs() < 1e-12);
            assert!((p.cp.unwrap() - 1.575).abs() < 1e-9);
            assert!((p.pp.unwrap() - 1.53).abs() < 1e-9);
            assert!((p.ppk.unwrap() - 1.47).abs() < 1e-9);
            assert_eq!(p.count, 1);
            assert!((p.cr.unwrap() - 0.7).abs() < 1e-12);
        }
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
    }

    #[test]
    fn buckets_by_plant_local_date() {
        let store = Arc::new(InMemoryStore::new());
        // 23:30 UTC is already the next day at UTC+9.
        store.record_run(run(Utc.with_ymd_and_hms(2025, 6, 13, 23, 30, 0).unwrap(), Some(1.2)));
        store.record_run(run(Utc.with_ymd_and_hms(2025, 6, 14, 2, 0, 0).unwrap(), Some(1.6)));

        let svc = TrendService::new(store.clone(), PlantCalendar::from_offset_minutes(9 * 60).unwrap());
        let points = svc.trend(RunScope::Line(LineId(4)), TimeRange::SevenDays, now());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_eq!(points[0].count, 2);
        assert_eq!(points[0].min_cpk, Some(1.2));
        assert_eq!(points[0].max_cpk, Some(1.6));
    }

    #[test]
    fn runs_without_cpk_still_count() {
        let store = Arc::new(InMemoryStore::new());
        store.record_run(run(now() - Duration::hours(3), None));
        let points = service(&store).trend(RunScope::Plan(PlanId(1)), TimeRange::SevenDays, now());
        assert_eq!(points[0].count, 1);
        assert_eq!(points[0].cpk, None);
        assert_eq!(points[0].cp, None);
    }

    #[test]
    fn custom_ratios() {
        let store = Arc::new(InMemoryStore::new());
        store.record_run(run(now() - Duration::hours(3), Some(2.0)));
        let ratios = TrendRatios {
            cp_ratio: 1.1,
            pp_ratio: 1.0,
            ppk_ratio: 0.9,
        };
        let points = service(&store)
            .with_ratios(ratios)
            .trend(RunScope::Plan(PlanId(1)), TimeRange::SevenDays, now());
        assert!((points[0].cp.unwrap() - 2.2).abs() < 1e-12);
        assert!((points[0].ppk.unwrap() - 1.8).abs() < 1e-12);
    }

    #[test]
    fn comparison_skips_empty_dates() {
        let store = Arc::new(InMemoryStore::new());
        let d1 = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let d2 = d1.checked_add_days(Days::new(1)).unwrap();
        let d3 = d1.checked_add_days(Days::new(2)).unwrap();
        store.record_run(run(Utc.with_ymd_and_hms(2025, 6, 3, 8, 0, 0).unwrap(), Some(1.1)));
        store.record_run(run(Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(), Some(1.3)));

        let points = service(&store).comparison_by_dates(RunScope::Plan(PlanId(1)), &[d3, d2, d1]);
        let dates: Vec<_> = points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d3, d1]);
    }

    #[test]
    fn improvement_between_halves() {
        let store = Arc::new(InMemoryStore::new());
        let (start, _) = TimeRange::ThirtyDays.resolve(now());
        store.record_run(run(start + Duration::days(2), Some(1.0)));
        store.record_run(run(start + Duration::days(5), Some(1.2)));
        store.record_run(run(start + Duration::days(20), Some(1.5)));

        let summary = service(&store)
            .improvement_summary(RunScope::Plan(PlanId(1)), TimeRange::ThirtyDays, now())
            .unwrap();
        assert!((summary.first_period_cpk - 1.1).abs() < 1e-12);
        assert!((summary.second_period_cpk - 1.5).abs() < 1e-12);
        assert!((summary.change - 0.4).abs() < 1e-12);
        assert!((summary.change_percent - 0.4 / 1.1 * 100.0).abs() < 1e-9);
        assert!(summary.improved);
        assert_eq!((summary.first_period_count, summary.second_period_count), (2, 1));
        assert_eq!(summary.midpoint, start + Duration::days(15));
        assert_eq!(summary.period_end, now());
    }

    #[test]
    fn empty_first_half_has_zero_change_percent() {
        let store = Arc::new(InMemoryStore::new());
        store.record_run(run(now() - Duration::days(1), Some(1.4)));

        let summary = service(&store)
            .improvement_summary(RunScope::Plan(PlanId(1)), TimeRange::SevenDays, now())
            .unwrap();
        assert_eq!(summary.first_period_cpk, 0.0);
        assert_eq!(summary.change_percent, 0.0);
        assert!(!summary.change_percent.is_nan());
        assert!(summary.improved);
    }

    #[test]
    fn unavailable_source_yields_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.record_run(run(now() - Duration::days(1), Some(1.4)));
        store.set_available(false);
        let svc = service(&store);
        let scope = RunScope::Plan(PlanId(1));

        assert!(svc.trend(scope, TimeRange::NinetyDays, now()).is_empty());
        assert!(svc.comparison_by_dates(scope, &[now().date_naive()]).is_empty());
        assert!(svc.improvement_summary(scope, TimeRange::OneYear, now()).is_none());
    }
}
