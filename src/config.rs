//! Engine configuration loaded from TOML.
//!
//! Every section and field is optional; missing values fall back to the
//! built-in defaults.
//!
//! ```toml
//! [sampling]
//! desired_sample_count = 20
//! match_tolerance_ms = 60000
//! default_subgroup_size = 5
//!
//! [plant]
//! utc_offset_minutes = 540
//!
//! [trend]
//! cp_ratio = 1.05
//! pp_ratio = 1.02
//! ppk_ratio = 0.98
//! ```

use std::num::NonZeroUsize;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpcError;
use crate::sampling::{
    suggest_interval, SamplingPlan, DEFAULT_DESIRED_SAMPLE_COUNT, DEFAULT_TOLERANCE_MS,
};
use crate::time::PlantCalendar;
use crate::trend::TrendRatios;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sampling: SamplingSettings,
    #[serde(default)]
    pub plant: PlantSettings,
    #[serde(default)]
    pub trend: TrendRatios,
}

/// Defaults for schedule suggestion and matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingSettings {
    #[serde(default = "default_desired_sample_count")]
    pub desired_sample_count: usize,
    /// Matcher tolerance in milliseconds (strict).
    #[serde(default = "default_match_tolerance_ms")]
    pub match_tolerance_ms: i64,
    #[serde(default = "default_subgroup_size")]
    pub default_subgroup_size: NonZeroUsize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            desired_sample_count: default_desired_sample_count(),
            match_tolerance_ms: default_match_tolerance_ms(),
            default_subgroup_size: default_subgroup_size(),
        }
    }
}

fn default_desired_sample_count() -> usize {
    DEFAULT_DESIRED_SAMPLE_COUNT
}

fn default_match_tolerance_ms() -> i64 {
    DEFAULT_TOLERANCE_MS
}

fn default_subgroup_size() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN)
}

/// Plant-local time settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantSettings {
    /// Offset of plant-local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, SpcError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpcError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Sampling plan for `[start, end]` built from the configured defaults:
    /// the interval comes from [`suggest_interval`] with
    /// `desired_sample_count`, which also becomes the plan's sample size.
    pub fn suggest_plan(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> SamplingPlan {
        let interval = suggest_interval(start, end, self.sampling.desired_sample_count);
        SamplingPlan {
            time_unit: interval.unit,
            sample_size: NonZeroUsize::new(self.sampling.desired_sample_count).unwrap_or(NonZeroUsize::MIN),
            subgroup_size: self.sampling.default_subgroup_size,
            interval,
        }
    }

    /// Plant calendar for the configured offset.
    pub fn calendar(&self) -> Result<PlantCalendar, SpcError> {
        PlantCalendar::from_offset_minutes(self.plant.utc_offset_minutes)
    }
}
