//! Core control chart types.
//!
//! Control limits, chart points and the run-rule violations reported on
//! them.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Control limits for a chart.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Upper control limit (UCL = CL + 3 sigma).
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit (LCL = CL - 3 sigma).
    pub lcl: f64,
}

impl ControlLimits {
    /// Limits at `cl +/- 3 * sigma`.
    pub fn three_sigma(cl: f64, sigma: f64) -> Self {
        Self {
            ucl: cl + 3.0 * sigma,
            cl,
            lcl: cl - 3.0 * sigma,
        }
    }

    /// One zone width, `(UCL - CL) / 3`.
    pub fn zone_sigma(&self) -> f64 {
        (self.ucl - self.cl) / 3.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lcl && value <= self.ucl
    }
}

/// One subgroup mean on the X-bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XBarPoint {
    /// 1-based position of the subgroup.
    pub index: usize,
    pub value: f64,
    /// Timestamp of the subgroup's first member.
    pub timestamp: DateTime<Utc>,
}

/// One subgroup range on the R chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePoint {
    /// 1-based position of the subgroup.
    pub index: usize,
    pub value: f64,
}

/// Nelson's eight tests for special causes.
///
/// # Reference
///
/// Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
/// *Journal of Quality Technology* 16(4), pp. 237-239.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NelsonRule {
    /// Rule 1: a point beyond the 3-sigma limits.
    BeyondLimits,
    /// Rule 2: 9 points in a row on the same side of the center line.
    NineOneSide,
    /// Rule 3: 6 points in a row steadily increasing or decreasing.
    SixTrend,
    /// Rule 4: 14 points in a row alternating up and down.
    FourteenAlternating,
    /// Rule 5: 2 of 3 points beyond 2 sigma on the same side.
    TwoOfThreeBeyond2Sigma,
    /// Rule 6: 4 of 5 points beyond 1 sigma on the same side.
    FourOfFiveBeyond1Sigma,
    /// Rule 7: 15 points in a row within 1 sigma.
    FifteenWithin1Sigma,
    /// Rule 8: 8 points in a row beyond 1 sigma on either side.
    EightBeyond1Sigma,
}

impl NelsonRule {
    pub const ALL: [NelsonRule; 8] = [
        NelsonRule::BeyondLimits,
        NelsonRule::NineOneSide,
        NelsonRule::SixTrend,
        NelsonRule::FourteenAlternating,
        NelsonRule::TwoOfThreeBeyond2Sigma,
        NelsonRule::FourOfFiveBeyond1Sigma,
        NelsonRule::FifteenWithin1Sigma,
        NelsonRule::EightBeyond1Sigma,
    ];

    /// Rule number, 1..=8.
    pub fn number(self) -> u8 {
        match self {
            NelsonRule::BeyondLimits => 1,
            NelsonRule::NineOneSide => 2,
            NelsonRule::SixTrend => 3,
            NelsonRule::FourteenAlternating => 4,
            NelsonRule::TwoOfThreeBeyond2Sigma => 5,
            NelsonRule::FourOfFiveBeyond1Sigma => 6,
            NelsonRule::FifteenWithin1Sigma => 7,
            NelsonRule::EightBeyond1Sigma => 8,
        }
    }
}

impl fmt::Display for NelsonRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}", self.number())
    }
}

/// A rule triggered at an X-bar chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: NelsonRule,
    /// 1-based chart index of the point completing the pattern.
    pub index: usize,
}
