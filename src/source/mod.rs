//! Ports to the surrounding application's data layer.
//!
//! The aggregation and trend services never talk to a database directly.
//! They read plans and per-run history through [`AnalysisSource`] and write
//! period summaries through [`SummaryStore`]. [`InMemoryStore`] implements
//! both for tests and embedded use.

mod memory;
mod run;

pub use memory::InMemoryStore;
pub use run::{AnalysisRun, LineId, PlanId, PlanInfo, RunScope};

use chrono::{DateTime, Utc};

use crate::aggregation::{PeriodSummary, PeriodType, SummaryKey};
use crate::error::SourceError;

/// Read access to plans and analysis history.
pub trait AnalysisSource: Send + Sync {
    /// Looks up a plan. `Ok(None)` when it does not exist.
    fn plan(&self, plan_id: PlanId) -> Result<Option<PlanInfo>, SourceError>;

    /// Runs in `scope` recorded within `[start, end)`, ordered by time.
    fn runs(
        &self,
        scope: RunScope,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AnalysisRun>, SourceError>;

    /// Plans flagged active, ordered by id.
    fn active_plans(&self) -> Result<Vec<PlanInfo>, SourceError>;
}

/// Persistence of period summaries, keyed by plan, period type and period
/// start.
pub trait SummaryStore: Send + Sync {
    /// Inserts the summary or replaces the one with the same key.
    fn upsert(&self, summary: PeriodSummary) -> Result<(), SourceError>;

    fn get(&self, key: &SummaryKey) -> Result<Option<PeriodSummary>, SourceError>;

    /// Deletes the summary with `key`, if any.
    fn remove(&self, key: &SummaryKey) -> Result<(), SourceError>;

    /// Summaries whose period starts within `[from, to)`, ordered by start.
    fn list(
        &self,
        plan_id: PlanId,
        period_type: PeriodType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PeriodSummary>, SourceError>;
}
