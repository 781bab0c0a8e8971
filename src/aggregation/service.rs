//! Period aggregation service.

use std::sync::Arc;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::period::{PeriodType, PeriodWindow, Shift};
use super::summary::{average, PeriodSummary, SummaryKey};
use crate::error::SourceError;
use crate::source::{AnalysisRun, AnalysisSource, PlanId, PlanInfo, RunScope, SummaryStore};
use crate::time::PlantCalendar;

/// Result of aggregating one period instance.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    /// The summary was computed and stored.
    Written(PeriodSummary),
    /// The period holds no runs; nothing was stored.
    NoData,
    /// The source or store failed; the failure has been logged.
    Unavailable,
}

impl AggregateOutcome {
    pub fn summary(&self) -> Option<&PeriodSummary> {
        match self {
            AggregateOutcome::Written(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_summary(self) -> Option<PeriodSummary> {
        match self {
            AggregateOutcome::Written(s) => Some(s),
            _ => None,
        }
    }
}

/// Counts of a backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillReport {
    pub periods: usize,
    pub written: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Cpk statistics of one shift across several periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftStats {
    pub shift: Shift,
    pub average_cpk: Option<f64>,
    pub min_cpk: Option<f64>,
    pub max_cpk: Option<f64>,
    pub period_count: usize,
    pub sample_count: usize,
}

/// Shift-by-shift comparison over a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftComparison {
    pub shifts: Vec<ShiftStats>,
    pub best: Option<Shift>,
    pub worst: Option<Shift>,
}

/// Rolls analysis runs up into shift, day, week and month summaries.
///
/// Every aggregation is an upsert keyed by `(plan, period type, period
/// start)`, so re-running any operation replaces summaries instead of
/// duplicating them. Source failures are logged once and degrade to an
/// empty result.
pub struct AggregationService {
    source: Arc<dyn AnalysisSource>,
    store: Arc<dyn SummaryStore>,
    calendar: PlantCalendar,
}

impl AggregationService {
    pub fn new(
        source: Arc<dyn AnalysisSource>,
        store: Arc<dyn SummaryStore>,
        calendar: PlantCalendar,
    ) -> Self {
        Self {
            source,
            store,
            calendar,
        }
    }

    pub fn calendar(&self) -> &PlantCalendar {
        &self.calendar
    }

    /// Aggregates the period of `period_type` containing `at`.
    pub fn aggregate(&self, plan_id: PlanId, period_type: PeriodType, at: DateTime<Utc>) -> AggregateOutcome {
        let window = PeriodWindow::containing(period_type, at, &self.calendar);
        self.aggregate_window(plan_id, &window)
    }

    /// Aggregates one concrete period instance.
    ///
    /// A period that no longer holds any runs has its stored summary
    /// removed, so re-aggregation always reflects the current history.
    pub fn aggregate_window(&self, plan_id: PlanId, window: &PeriodWindow) -> AggregateOutcome {
        let (plan, runs) = match self.load(plan_id, window) {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("failed to load runs of {} for {} {}: {}", plan_id, window.period_type, window.start, e);
                return AggregateOutcome::Unavailable;
            }
        };

        let spec = plan.as_ref().and_then(|p| p.capability());
        let Some(summary) = PeriodSummary::from_runs(plan_id, window, &runs, spec.as_ref()) else {
            debug!("no runs of {} in {} {}..{}", plan_id, window.period_type, window.start, window.end);
            let key = SummaryKey {
                plan_id,
                period_type: window.period_type,
                period_start: window.start,
            };
            return match self.store.remove(&key) {
                Ok(()) => AggregateOutcome::NoData,
                Err(e) => {
                    error!("failed to clear {} summary of {}: {}", window.period_type, plan_id, e);
                    AggregateOutcome::Unavailable
                }
            };
        };

        match self.store.upsert(summary.clone()) {
            Ok(()) => {
                info!(
                    "stored {} summary of {} at {}: {} runs, cpk {:?}",
                    window.period_type, plan_id, window.start, summary.run_count, summary.cpk
                );
                AggregateOutcome::Written(summary)
            }
            Err(e) => {
                error!("failed to store {} summary of {}: {}", window.period_type, plan_id, e);
                AggregateOutcome::Unavailable
            }
        }
    }

    fn load(
        &self,
        plan_id: PlanId,
        window: &PeriodWindow,
    ) -> Result<(Option<PlanInfo>, Vec<AnalysisRun>), SourceError> {
        let plan = self.source.plan(plan_id)?;
        let mut runs = Vec::new();
        for (start, end) in window.query_ranges(&self.calendar) {
            runs.extend(self.source.runs(RunScope::Plan(plan_id), start, end)?);
        }
        runs.sort_by_key(|r| r.recorded_at);
        Ok((plan, runs))
    }

    /// Aggregates every period instance of `period_type` starting on local
    /// dates `from..=to`. Shifts are processed three per day.
    ///
    /// Each instance is an independent upsert, so the loop can be stopped
    /// between iterations and re-run safely.
    pub fn backfill(&self, plan_id: PlanId, period_type: PeriodType, from: NaiveDate, to: NaiveDate) -> BackfillReport {
        let mut report = BackfillReport::default();
        for window in self.windows_between(period_type, from, to) {
            report.periods += 1;
            match self.aggregate_window(plan_id, &window) {
                AggregateOutcome::Written(_) => report.written += 1,
                AggregateOutcome::NoData => report.empty += 1,
                AggregateOutcome::Unavailable => report.failed += 1,
            }
        }
        info!(
            "backfilled {} {} periods of {} ({} written, {} empty, {} failed)",
            report.periods, period_type, plan_id, report.written, report.empty, report.failed
        );
        report
    }

    fn windows_between(&self, period_type: PeriodType, from: NaiveDate, to: NaiveDate) -> Vec<PeriodWindow> {
        let cal = &self.calendar;
        let mut windows = Vec::new();
        let mut date = match period_type {
            PeriodType::Shift | PeriodType::Day => from,
            PeriodType::Week => cal.week_start(from),
            PeriodType::Month => cal.month_start(from),
        };
        while date <= to {
            match period_type {
                PeriodType::Shift => windows.extend(Shift::ALL.map(|s| PeriodWindow::shift(date, s, cal))),
                PeriodType::Day => windows.push(PeriodWindow::day(date, cal)),
                PeriodType::Week => windows.push(PeriodWindow::week(date, cal)),
                PeriodType::Month => windows.push(PeriodWindow::month(date, cal)),
            }
            let next = match period_type {
                PeriodType::Shift | PeriodType::Day => date.checked_add_days(Days::new(1)),
                PeriodType::Week => date.checked_add_days(Days::new(7)),
                PeriodType::Month => date.checked_add_months(Months::new(1)),
            };
            match next {
                Some(next) => date = next,
                None => break,
            }
        }
        windows
    }

    /// Aggregates the period of `period_type` containing `at` for every
    /// active plan. This is the entry point for scheduled jobs.
    ///
    /// When the plan list cannot be read the failure is logged once and an
    /// empty report is returned.
    pub fn aggregate_active_plans(&self, period_type: PeriodType, at: DateTime<Utc>) -> BackfillReport {
        let plans = match self.source.active_plans() {
            Ok(plans) => plans,
            Err(e) => {
                error!("failed to list active plans for {} aggregation: {}", period_type, e);
                return BackfillReport::default();
            }
        };

        let mut report = BackfillReport::default();
        for plan in &plans {
            report.periods += 1;
            match self.aggregate(plan.id, period_type, at) {
                AggregateOutcome::Written(_) => report.written += 1,
                AggregateOutcome::NoData => report.empty += 1,
                AggregateOutcome::Unavailable => report.failed += 1,
            }
        }
        info!(
            "aggregated {} of {} active plans ({} written, {} empty, {} failed)",
            period_type, report.periods, report.written, report.empty, report.failed
        );
        report
    }

    /// Refreshes the shift, day, week and month containing `at`. Returns
    /// the summaries written.
    pub fn aggregate_all_periods(&self, plan_id: PlanId, at: DateTime<Utc>) -> Vec<PeriodSummary> {
        PeriodType::ALL
            .into_iter()
            .filter_map(|p| self.aggregate(plan_id, p, at).into_summary())
            .collect()
    }

    /// Most recent stored summary of `period_type`, `None` if there is none
    /// or the store is unavailable.
    pub fn latest_summary(&self, plan_id: PlanId, period_type: PeriodType) -> Option<PeriodSummary> {
        self.summaries_between(plan_id, period_type, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .pop()
    }

    /// Stored summaries starting within `[from, to)`, oldest first.
    pub fn summaries_between(
        &self,
        plan_id: PlanId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<PeriodSummary> {
        match self.store.list(plan_id, period_type, from, to) {
            Ok(summaries) => summaries,
            Err(e) => {
                error!("failed to list {} summaries of {}: {}", period_type, plan_id, e);
                Vec::new()
            }
        }
    }

    /// Compares stored shift summaries starting within `[from, to)`.
    ///
    /// Best and worst are ranked by average Cpk; shifts without any Cpk are
    /// listed but not ranked.
    pub fn compare_shifts(&self, plan_id: PlanId, from: DateTime<Utc>, to: DateTime<Utc>) -> ShiftComparison {
        let summaries = self.summaries_between(plan_id, PeriodType::Shift, from, to);

        let shifts: Vec<ShiftStats> = Shift::ALL
            .into_iter()
            .map(|shift| {
                let of_shift: Vec<&PeriodSummary> =
                    summaries.iter().filter(|s| s.shift == Some(shift)).collect();
                let cpks: Vec<f64> = of_shift.iter().filter_map(|s| s.cpk).collect();
                ShiftStats {
                    shift,
                    average_cpk: average(cpks.iter().copied()),
                    min_cpk: cpks.iter().copied().reduce(f64::min),
                    max_cpk: cpks.iter().copied().reduce(f64::max),
                    period_count: of_shift.len(),
                    sample_count: of_shift.iter().map(|s| s.sample_count).sum(),
                }
            })
            .collect();

        let ranked = || shifts.iter().filter_map(|s| s.average_cpk.map(|c| (s.shift, c)));
        let best = ranked().reduce(|a, b| if b.1 > a.1 { b } else { a }).map(|(s, _)| s);
        let worst = ranked().reduce(|a, b| if b.1 < a.1 { b } else { a }).map(|(s, _)| s);

        ShiftComparison { shifts, best, worst }
    }
}
