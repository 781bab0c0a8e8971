use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::run::{AnalysisRun, PlanId, PlanInfo, RunScope};
use super::{AnalysisSource, SummaryStore};
use crate::aggregation::{PeriodSummary, PeriodType, SummaryKey};
use crate::error::SourceError;

#[derive(Default)]
struct Tables {
    plans: HashMap<PlanId, PlanInfo>,
    runs: Vec<AnalysisRun>,
    summaries: BTreeMap<SummaryKey, PeriodSummary>,
}

/// In-process store implementing both [`AnalysisSource`] and
/// [`SummaryStore`].
///
/// [`set_available`](Self::set_available) simulates an outage: while it is
/// off every port call fails with [`SourceError::Unavailable`].
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    available: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }

    pub fn insert_plan(&self, plan: PlanInfo) {
        if let Ok(mut guard) = self.tables.lock() {
            guard.plans.insert(plan.id, plan);
        }
    }

    pub fn record_run(&self, run: AnalysisRun) {
        if let Ok(mut guard) = self.tables.lock() {
            guard.runs.push(run);
        }
    }

    /// Drops every recorded run of `plan_id`.
    pub fn delete_runs(&self, plan_id: PlanId) {
        if let Ok(mut guard) = self.tables.lock() {
            guard.runs.retain(|r| r.plan_id != plan_id);
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn summary_count(&self) -> usize {
        self.tables.lock().map(|g| g.summaries.len()).unwrap_or(0)
    }

    fn open(&self) -> Result<MutexGuard<'_, Tables>, SourceError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("in-memory store switched off".into()));
        }
        self.tables
            .lock()
            .map_err(|_| SourceError::Unavailable("in-memory store poisoned".into()))
    }
}

impl AnalysisSource for InMemoryStore {
    fn plan(&self, plan_id: PlanId) -> Result<Option<PlanInfo>, SourceError> {
        Ok(self.open()?.plans.get(&plan_id).cloned())
    }

    fn runs(
        &self,
        scope: RunScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AnalysisRun>, SourceError> {
        let tables = self.open()?;
        let mut runs: Vec<AnalysisRun> = tables
            .runs
            .iter()
            .filter(|r| scope.matches(r) && start <= r.recorded_at && r.recorded_at < end)
            .cloned()
            .collect();
        runs.sort_by_key(|r| r.recorded_at);
        Ok(runs)
    }

    fn active_plans(&self) -> Result<Vec<PlanInfo>, SourceError> {
        let tables = self.open()?;
        let mut plans: Vec<PlanInfo> = tables.plans.values().filter(|p| p.active).cloned().collect();
        plans.sort_by_key(|p| p.id);
        Ok(plans)
    }
}

impl SummaryStore for InMemoryStore {
    fn upsert(&self, summary: PeriodSummary) -> Result<(), SourceError> {
        self.open()?.summaries.insert(summary.key(), summary);
        Ok(())
    }

    fn get(&self, key: &SummaryKey) -> Result<Option<PeriodSummary>, SourceError> {
        Ok(self.open()?.summaries.get(key).cloned())
    }

    fn remove(&self, key: &SummaryKey) -> Result<(), SourceError> {
        self.open()?.summaries.remove(key);
        Ok(())
    }

    fn list(
        &self,
        plan_id: PlanId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PeriodSummary>, SourceError> {
        let tables = self.open()?;
        Ok(tables
            .summaries
            .values()
            .filter(|s| s.plan_id == plan_id && s.period_type == period_type)
            .filter(|s| from <= s.period_start && s.period_start < to)
            .cloned()
            .collect())
    }
}
