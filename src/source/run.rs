//! Plan and history records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::ProcessCapability;
use crate::spc::SpcResult;

/// Identifier of an inspection plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(pub u64);

/// Identifier of a production line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plan#{}", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line#{}", self.0)
    }
}

/// Which runs a history query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunScope {
    Plan(PlanId),
    Line(LineId),
}

impl RunScope {
    pub fn matches(&self, run: &AnalysisRun) -> bool {
        match *self {
            RunScope::Plan(id) => run.plan_id == id,
            RunScope::Line(id) => run.line_id == Some(id),
        }
    }
}

impl fmt::Display for RunScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunScope::Plan(id) => id.fmt(f),
            RunScope::Line(id) => id.fmt(f),
        }
    }
}

/// Inspection plan as seen by the services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub id: PlanId,
    pub name: String,
    pub line_id: Option<LineId>,
    pub usl: Option<f64>,
    pub lsl: Option<f64>,
    pub target: Option<f64>,
    /// Whether scheduled aggregation should pick the plan up.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl PlanInfo {
    /// Capability specification, or `None` when the stored limits cannot
    /// define one.
    pub fn capability(&self) -> Option<ProcessCapability> {
        let spec = ProcessCapability::new(self.usl, self.lsl).ok()?;
        Some(match self.target {
            Some(t) => spec.with_target(t),
            None => spec,
        })
    }
}

/// One stored analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRun {
    pub plan_id: PlanId,
    pub line_id: Option<LineId>,
    pub recorded_at: DateTime<Utc>,
    pub sample_count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub ucl: f64,
    pub lcl: f64,
    pub cp: Option<f64>,
    pub cpk: Option<f64>,
    pub pp: Option<f64>,
    pub ppk: Option<f64>,
    pub ca: Option<f64>,
    /// Capability ratio, `1 / Cp`.
    pub cr: Option<f64>,
    pub violation_count: usize,
}

impl AnalysisRun {
    /// History record of an engine result.
    pub fn from_result(
        plan_id: PlanId,
        line_id: Option<LineId>,
        recorded_at: DateTime<Utc>,
        result: &SpcResult,
    ) -> Self {
        Self {
            plan_id,
            line_id,
            recorded_at,
            sample_count: result.sample_count,
            mean: result.mean,
            std_dev: result.std_dev,
            min: result.min,
            max: result.max,
            ucl: result.ucl,
            lcl: result.lcl,
            cp: result.cp,
            cpk: result.cpk,
            pp: result.pp,
            ppk: result.ppk,
            ca: result.ca,
            cr: result.cp.filter(|&cp| cp > 0.0).map(|cp| 1.0 / cp),
            violation_count: result.violations.len(),
        }
    }

    /// Whether the run signalled a special cause.
    pub fn is_out_of_control(&self) -> bool {
        self.violation_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::Measurement;
    use crate::spc::analyze;
    use chrono::{Duration, TimeZone};
    use std::num::NonZeroUsize;

    #[test]
    fn run_from_result() {
        let t0 = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let series: Vec<_> = [9.9, 10.1, 10.0, 10.2, 9.8, 10.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Measurement::new(v, t0 + Duration::minutes(i as i64)))
            .collect();
        let spec = ProcessCapability::new(Some(11.0), Some(9.0)).unwrap();
        let result = analyze(&series, NonZeroUsize::new(2).unwrap(), Some(&spec));

        let run = AnalysisRun::from_result(PlanId(7), Some(LineId(2)), t0, &result);
        assert_eq!(run.sample_count, 6);
        assert_eq!(run.cpk, result.cpk);
        assert!((run.cr.unwrap() * result.cp.unwrap() - 1.0).abs() < 1e-12);
        assert!(RunScope::Plan(PlanId(7)).matches(&run));
        assert!(RunScope::Line(LineId(2)).matches(&run));
        assert!(!RunScope::Line(LineId(3)).matches(&run));
    }

    #[test]
    fn plan_capability_requires_valid_limits() {
        let mut plan = PlanInfo {
            id: PlanId(1),
            name: "bore diameter".into(),
            line_id: None,
            usl: Some(10.5),
            lsl: Some(9.5),
            target: Some(10.1),
            active: true,
        };
        let spec = plan.capability().unwrap();
        assert_eq!(spec.target(), Some(10.1));

        plan.usl = None;
        plan.lsl = None;
        assert!(plan.capability().is_none());
    }

    #[test]
    fn plans_default_to_active() {
        let plan: PlanInfo = serde_json::from_str(r#"{"id": 4, "name": "gap", "lineId": null, "usl": 1.0, "lsl": 0.0, "target": null}"#).unwrap();
        assert!(plan.active);
    }

    #[test]
    fn ids_serialize_as_numbers() {
        assert_eq!(serde_json::to_string(&PlanId(12)).unwrap(), "12");
        assert_eq!(PlanId(12).to_string(), "plan#12");
    }
}
