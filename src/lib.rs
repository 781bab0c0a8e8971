//! # u-spc
//!
//! Statistical process control for inspection plans: sampling schedules,
//! X̄-R capability analysis, and shift/day/week/month roll-ups of the
//! analysis history.
//!
//! The computational core (scheduling, matching, subgrouping, capability
//! indices) is pure and operates on explicit inputs. The aggregation and
//! trend services read history through the ports in [`source`] and never
//! fail outward on a data-source outage; they log and return empty results.
//!
//! ## Modules
//!
//! - [`time`] — Calendar-aware time units and plant-local dates
//! - [`sampling`] — Sampling configuration, schedules, interval suggestion, matching
//! - [`subgroup`] — Rational subgroups and their mean/range
//! - [`capability`] — Capability indices (Cp, Cpk, Pp, Ppk, Ca) and status grading
//! - [`spc`] — X̄-R control limits, run rules, and [`SpcResult`]
//! - [`pipeline`] — Schedule → match → subgroup → analyze in one call
//! - [`aggregation`] — Period windows, period summaries, backfill, shift comparison
//! - [`trend`] — Per-date trends, date comparison, improvement summary
//! - [`source`] — Data-source and summary-store ports plus an in-memory store
//! - [`config`] — TOML engine configuration
//!
//! ## Example
//!
//! ```
//! use std::num::NonZeroUsize;
//! use chrono::{Duration, TimeZone, Utc};
//! use u_spc::{analyze, CapabilityStatus, Measurement, ProcessCapability};
//!
//! let t0 = Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap();
//! let series: Vec<Measurement> = [1.40, 1.42, 1.38, 1.45]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &v)| Measurement::new(v, t0 + Duration::hours(i as i64)))
//!     .collect();
//!
//! let spec = ProcessCapability::new(Some(1.6), Some(1.2)).unwrap();
//! let result = analyze(&series, NonZeroUsize::new(2).unwrap(), Some(&spec));
//!
//! assert!((result.mean - 1.4125).abs() < 1e-12);
//! assert_eq!(result.x_bar_data.len(), 2);
//! assert_ne!(result.status, CapabilityStatus::NotAvailable);
//! ```

pub mod aggregation;
pub mod capability;
pub mod config;
pub mod error;
pub mod measurement;
pub mod pipeline;
pub mod sampling;
pub mod source;
pub mod spc;
pub mod subgroup;
pub mod time;
pub mod trend;

pub use capability::{CapabilityIndices, CapabilityStatus, ProcessCapability};
pub use config::EngineConfig;
pub use error::{SourceError, SpcError};
pub use measurement::Measurement;
pub use pipeline::analyze_window;
pub use sampling::{SamplingConfig, SamplingPlan, SamplingSchedule};
pub use spc::{analyze, AnalysisCondition, SpcResult};
pub use time::{PlantCalendar, TimeUnit};
