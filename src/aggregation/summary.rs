//! Period summaries and how runs are rolled up into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::period::{PeriodType, PeriodWindow, Shift};
use crate::capability::{CapabilityStatus, ProcessCapability};
use crate::source::{AnalysisRun, PlanId};

/// Upsert key of a [`PeriodSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryKey {
    pub plan_id: PlanId,
    pub period_type: PeriodType,
    pub period_start: DateTime<Utc>,
}

/// Roll-up of every analysis run of a plan within one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub plan_id: PlanId,
    pub period_type: PeriodType,
    pub shift: Option<Shift>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    /// Average Cpk of the runs.
    pub cpk: Option<f64>,
    /// Average Cp of the runs.
    pub cp: Option<f64>,
    /// Pp from the plan limits and the pooled standard deviation.
    pub pp: Option<f64>,
    /// Ppk from the plan limits and the pooled standard deviation.
    pub ppk: Option<f64>,
    /// Sample-weighted grand mean.
    pub mean: f64,
    /// Pooled overall standard deviation of all underlying samples.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sample_count: usize,
    pub run_count: usize,
    pub out_of_control_count: usize,
    pub status: CapabilityStatus,
}

impl PeriodSummary {
    pub fn key(&self) -> SummaryKey {
        SummaryKey {
            plan_id: self.plan_id,
            period_type: self.period_type,
            period_start: self.period_start,
        }
    }

    /// Summarizes `runs` for `window`. Returns `None` when no run carries
    /// samples.
    pub fn from_runs(
        plan_id: PlanId,
        window: &PeriodWindow,
        runs: &[AnalysisRun],
        spec: Option<&ProcessCapability>,
    ) -> Option<Self> {
        let pooled = Pooled::of(runs)?;

        let cpk = average(runs.iter().filter_map(|r| r.cpk));
        let cp = average(runs.iter().filter_map(|r| r.cp));
        let overall = spec.and_then(|s| s.from_moments(pooled.mean, pooled.std_dev, pooled.std_dev));

        Some(Self {
            plan_id,
            period_type: window.period_type,
            shift: window.shift,
            period_start: window.start,
            period_end: window.end,
            cpk,
            cp,
            pp: overall.as_ref().and_then(|ix| ix.pp),
            ppk: overall.as_ref().and_then(|ix| ix.ppk),
            mean: pooled.mean,
            std_dev: pooled.std_dev,
            min: pooled.min,
            max: pooled.max,
            sample_count: pooled.count,
            run_count: runs.len(),
            out_of_control_count: runs.iter().filter(|r| r.is_out_of_control()).count(),
            status: CapabilityStatus::from_cpk(cpk),
        })
    }
}

/// Mean of the values, `None` when there are none.
pub(crate) fn average(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Combined moments of several runs.
///
/// The pooled variance is exact for the union of the underlying samples:
/// `SS = sum((n_i - 1) * s_i^2 + n_i * (m_i - M)^2)`, `var = SS / (N - 1)`.
struct Pooled {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl Pooled {
    fn of(runs: &[AnalysisRun]) -> Option<Self> {
        let runs: Vec<&AnalysisRun> = runs.iter().filter(|r| r.sample_count > 0).collect();
        let count: usize = runs.iter().map(|r| r.sample_count).sum();
        if count == 0 {
            return None;
        }

        let total = count as f64;
        let mean = runs.iter().map(|r| r.sample_count as f64 * r.mean).sum::<f64>() / total;
        let ss: f64 = runs
            .iter()
            .map(|r| {
                let n = r.sample_count as f64;
                (n - 1.0) * r.std_dev * r.std_dev + n * (r.mean - mean).powi(2)
            })
            .sum();
        let std_dev = if count > 1 { (ss / (total - 1.0)).max(0.0).sqrt() } else { 0.0 };

        let min = runs.iter().map(|r| r.min).fold(f64::INFINITY, f64::min);
        let max = runs.iter().map(|r| r.max).fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}
