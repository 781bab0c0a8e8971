//! Sampling: plan validation, schedules, interval selection and matching.
//!
//! A sampling run turns a raw measurement stream into the subset that is
//! actually analyzed:
//!
//! 1. [`SamplingConfig::validate`] / [`SamplingConfig::into_plan`] check the
//!    administrator's configuration and produce a typed [`SamplingPlan`].
//! 2. [`SamplingSchedule`] lists the target instants across a window, using
//!    the plan's interval or one picked by [`suggest_interval`].
//! 3. [`match_to_schedule`] snaps measurements onto those instants.

mod config;
mod interval;
mod matcher;
mod schedule;

pub use config::{SamplingConfig, SamplingPlan, ValidationReport};
pub use interval::{
    suggest_interval, DAYS_PER_MONTH_BUCKET, DAYS_PER_WEEK_BUCKET, DAYS_PER_YEAR_BUCKET,
    DEFAULT_DESIRED_SAMPLE_COUNT,
};
pub use matcher::{match_to_schedule, DEFAULT_TOLERANCE_MS};
pub use schedule::{build_schedule, Interval, SamplingSchedule, ScheduleIter};
