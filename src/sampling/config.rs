//! Sampling plan configuration and validation.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::schedule::Interval;
use crate::time::TimeUnit;

/// Sampling configuration as entered by plan administration.
///
/// Fields are kept raw so that an invalid configuration can still be
/// loaded, shown and reported on. Use [`validate`](Self::validate) to list
/// the problems or [`into_plan`](Self::into_plan) to obtain a checked
/// [`SamplingPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SamplingConfig {
    pub time_unit: String,
    pub sample_size: i64,
    pub subgroup_size: i64,
    pub interval_value: i64,
    pub interval_unit: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Hour.as_str().to_string(),
            sample_size: 5,
            subgroup_size: 5,
            interval_value: 30,
            interval_unit: TimeUnit::Minute.as_str().to_string(),
        }
    }
}

/// Outcome of [`SamplingConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// A validated sampling plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingPlan {
    pub time_unit: TimeUnit,
    /// Minimum number of sampled points for an analysis to count as
    /// sufficient.
    pub sample_size: NonZeroUsize,
    pub subgroup_size: NonZeroUsize,
    pub interval: Interval,
}

impl SamplingConfig {
    /// Checks every field and collects all problems found.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_spc::sampling::SamplingConfig;
    ///
    /// let config = SamplingConfig {
    ///     sample_size: 0,
    ///     interval_unit: "fortnight".into(),
    ///     ..SamplingConfig::default()
    /// };
    /// let report = config.validate();
    /// assert!(!report.valid);
    /// assert_eq!(report.errors.len(), 2);
    /// ```
    pub fn validate(&self) -> ValidationReport {
        let mut errors = Vec::new();

        if self.sample_size < 1 {
            errors.push(format!("sampleSize must be at least 1 (got {})", self.sample_size));
        }
        if self.subgroup_size < 1 {
            errors.push(format!("subgroupSize must be at least 1 (got {})", self.subgroup_size));
        }
        if self.interval_value < 1 {
            errors.push(format!("intervalValue must be at least 1 (got {})", self.interval_value));
        } else if u32::try_from(self.interval_value).is_err() {
            errors.push(format!("intervalValue is too large (got {})", self.interval_value));
        }
        if self.time_unit.parse::<TimeUnit>().is_err() {
            errors.push(format!("timeUnit {:?} is not a supported unit", self.time_unit));
        }
        if self.interval_unit.parse::<TimeUnit>().is_err() {
            errors.push(format!("intervalUnit {:?} is not a supported unit", self.interval_unit));
        }

        ValidationReport::from_errors(errors)
    }

    /// Converts into a typed plan, or returns the validation report when
    /// the configuration is invalid.
    pub fn into_plan(self) -> Result<SamplingPlan, ValidationReport> {
        let report = self.validate();
        if !report.valid {
            return Err(report);
        }

        let checked = (|| {
            Some(SamplingPlan {
                time_unit: self.time_unit.parse().ok()?,
                sample_size: NonZeroUsize::new(usize::try_from(self.sample_size).ok()?)?,
                subgroup_size: NonZeroUsize::new(usize::try_from(self.subgroup_size).ok()?)?,
                interval: Interval::new(
                    u32::try_from(self.interval_value).ok()?,
                    self.interval_unit.parse().ok()?,
                )?,
            })
        })();

        checked.ok_or_else(|| ValidationReport::from_errors(vec!["configuration out of range".to_string()]))
    }
}
