//! Statistical Process Control (SPC): X-bar/R analysis of a sampled series.
//!
//! [`analyze`] turns a sampled measurement series into an [`SpcResult`]:
//! overall statistics, X-bar and R chart points and limits, capability
//! indices, run-rule violations and a capability status.
//!
//! # Control Chart Factors
//!
//! d2, D3 and D4 for subgroup sizes 2..=25 are sourced from ASTM E2587.
//!
//! # Run Rules
//!
//! - [`RuleSet::ALL`] — Nelson's 8 rules
//! - [`RuleSet::western_electric`] — rules 1, 2, 5 and 6
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.

mod analysis;
mod chart;
pub mod factors;
mod result;
mod rules;

pub use analysis::{analyze, analyze_with_rules};
pub use chart::{ControlLimits, NelsonRule, RangePoint, RuleViolation, XBarPoint};
pub use result::{AnalysisCondition, SpcResult};
pub use rules::RuleSet;
