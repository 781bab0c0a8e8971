//! Per-run analysis output.

use serde::{Deserialize, Serialize};

use super::chart::{RangePoint, RuleViolation, XBarPoint};
use crate::capability::CapabilityStatus;

/// Quality of the data behind an [`SpcResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisCondition {
    /// Statistics and indices are meaningful.
    #[default]
    Normal,
    /// Too few points: no data at all, a single point, or fewer points than
    /// the sampling plan requires.
    InsufficientData,
    /// Zero dispersion where capability indices were requested; every index
    /// is `None`.
    DegenerateDistribution,
}

/// Statistics of one analysis run over a fixed window.
///
/// Field names serialize in camelCase (`xBarData`, `uclR`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpcResult {
    pub sample_count: usize,
    pub subgroup_size: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1) of all values.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    /// Mean subgroup range (R-bar).
    pub mean_range: f64,
    /// Within-subgroup sigma: R-bar / d2 when tabulated, otherwise `std_dev`.
    pub sigma_within: f64,
    pub cp: Option<f64>,
    pub cpk: Option<f64>,
    pub cpu: Option<f64>,
    pub cpl: Option<f64>,
    pub pp: Option<f64>,
    pub ppk: Option<f64>,
    pub ca: Option<f64>,
    /// X-bar chart upper limit, `mean + 3 * std_dev / sqrt(n)`.
    pub ucl: f64,
    /// X-bar chart lower limit, `mean - 3 * std_dev / sqrt(n)`.
    pub lcl: f64,
    /// R chart upper limit, `None` outside subgroup sizes 2..=25.
    pub ucl_r: Option<f64>,
    pub lcl_r: Option<f64>,
    pub x_bar_data: Vec<XBarPoint>,
    pub range_data: Vec<RangePoint>,
    pub violations: Vec<RuleViolation>,
    pub status: CapabilityStatus,
    pub condition: AnalysisCondition,
}

impl SpcResult {
    /// A zeroed result for a window without data.
    pub fn empty(subgroup_size: usize) -> Self {
        Self {
            sample_count: 0,
            subgroup_size,
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            range: 0.0,
            mean_range: 0.0,
            sigma_within: 0.0,
            cp: None,
            cpk: None,
            cpu: None,
            cpl: None,
            pp: None,
            ppk: None,
            ca: None,
            ucl: 0.0,
            lcl: 0.0,
            ucl_r: None,
            lcl_r: None,
            x_bar_data: Vec::new(),
            range_data: Vec::new(),
            violations: Vec::new(),
            status: CapabilityStatus::NotAvailable,
            condition: AnalysisCondition::InsufficientData,
        }
    }

    /// True when no run rule fired.
    pub fn is_in_control(&self) -> bool {
        self.violations.is_empty()
    }

    /// Clears every capability index, as for degenerate data.
    pub(crate) fn clear_indices(&mut self) {
        self.cp = None;
        self.cpk = None;
        self.cpu = None;
        self.cpl = None;
        self.pp = None;
        self.ppk = None;
        self.status = CapabilityStatus::NotAvailable;
    }
}
