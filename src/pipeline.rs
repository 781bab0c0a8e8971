//! One-call analysis of a measurement window.

use chrono::{DateTime, Utc};

use crate::capability::ProcessCapability;
use crate::measurement::Measurement;
use crate::sampling::{build_schedule, match_to_schedule, SamplingPlan};
use crate::spc::{analyze, AnalysisCondition, SpcResult};

/// Samples `data` on the plan's schedule over `[start, end]` and analyzes
/// the matched points.
///
/// A result that would otherwise be [`AnalysisCondition::Normal`] is
/// downgraded to [`AnalysisCondition::InsufficientData`] when fewer points
/// matched than the plan's `sample_size`. The descriptive statistics are
/// still filled in from what did match, but the capability indices and
/// status are cleared. A degenerate result keeps its own condition.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_spc::measurement::Measurement;
/// use u_spc::pipeline::analyze_window;
/// use u_spc::sampling::SamplingConfig;
///
/// let plan = SamplingConfig::default().into_plan().unwrap(); // every 30 minutes
/// let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
/// let data: Vec<_> = (0..120)
///     .map(|m| Measurement::new(10.0 + (m % 5) as f64 * 0.1, start + Duration::minutes(m)))
///     .collect();
///
/// let result = analyze_window(&data, &plan, start, start + Duration::hours(2), None, 60_000);
/// assert_eq!(result.sample_count, 4);
/// ```
pub fn analyze_window(
    data: &[Measurement],
    plan: &SamplingPlan,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    spec: Option<&ProcessCapability>,
    tolerance_ms: i64,
) -> SpcResult {
    let schedule = build_schedule(start, end, plan.interval).to_vec();
    let sampled = match_to_schedule(data, &schedule, tolerance_ms);
    let mut result = analyze(&sampled, plan.subgroup_size, spec);
    if sampled.len() < plan.sample_size.get() && result.condition == AnalysisCondition::Normal {
        result.condition = AnalysisCondition::InsufficientData;
        result.clear_indices();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityStatus;
    use crate::sampling::SamplingConfig;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
    }

    fn minute_data(count: i64) -> Vec<Measurement> {
        (0..count)
            .map(|m| Measurement::new(10.0 + (m % 7) as f64 * 0.05, start() + Duration::minutes(m)))
            .collect()
    }

    #[test]
    fn samples_on_the_schedule() {
        let plan = SamplingConfig {
            sample_size: 3,
            subgroup_size: 2,
            interval_value: 10,
            interval_unit: "minute".into(),
            ..SamplingConfig::default()
        }
        .into_plan()
        .unwrap();
        let data = minute_data(60);
        let spec = ProcessCapability::new(Some(10.5), Some(9.8)).unwrap();

        let r = analyze_window(&data, &plan, start(), start() + Duration::minutes(50), Some(&spec), 60_000);
        assert_eq!(r.sample_count, 6);
        assert_eq!(r.x_bar_data.len(), 3);
        assert_eq!(r.x_bar_data[1].timestamp, start() + Duration::minutes(20));
        assert_eq!(r.condition, AnalysisCondition::Normal);
        assert!(r.cpk.is_some());
    }

    #[test]
    fn too_few_matches_is_insufficient() {
        let plan = SamplingConfig {
            sample_size: 10,
            ..SamplingConfig::default()
        }
        .into_plan()
        .unwrap();
        let data = minute_data(90);

        let r = analyze_window(&data, &plan, start(), start() + Duration::hours(3), None, 60_000);
        // Slots at 0, 30 and 60 minutes match; the last point is a full
        // minute before the 90-minute slot.
        assert_eq!(r.sample_count, 3);
        assert_eq!(r.condition, AnalysisCondition::InsufficientData);
        assert!(r.mean > 0.0);
    }

    #[test]
    fn short_window_clears_indices() {
        let plan = SamplingConfig {
            sample_size: 10,
            ..SamplingConfig::default()
        }
        .into_plan()
        .unwrap();
        let data = minute_data(150);
        let spec = ProcessCapability::new(Some(12.0), Some(8.0)).unwrap();

        let r = analyze_window(&data, &plan, start(), start() + Duration::hours(2), Some(&spec), 60_000);
        assert_eq!(r.sample_count, 5);
        assert_eq!(r.condition, AnalysisCondition::InsufficientData);
        assert!(r.cp.is_none());
        assert!(r.cpk.is_none());
        assert!(r.pp.is_none());
        assert!(r.ppk.is_none());
        assert_eq!(r.status, CapabilityStatus::NotAvailable);
    }

    #[test]
    fn constant_short_window_stays_degenerate() {
        let plan = SamplingConfig {
            sample_size: 10,
            ..SamplingConfig::default()
        }
        .into_plan()
        .unwrap();
        let data: Vec<_> = (0..3)
            .map(|k| Measurement::new(5.0, start() + Duration::minutes(30 * k)))
            .collect();
        let spec = ProcessCapability::new(Some(6.0), Some(4.0)).unwrap();

        let r = analyze_window(&data, &plan, start(), start() + Duration::hours(1), Some(&spec), 60_000);
        assert_eq!(r.sample_count, 3);
        assert_eq!(r.condition, AnalysisCondition::DegenerateDistribution);
        assert!(r.cpk.is_none());
        assert_eq!(r.status, CapabilityStatus::NotAvailable);
    }

    #[test]
    fn no_data_at_all() {
        let plan = SamplingConfig::default().into_plan().unwrap();
        let r = analyze_window(&[], &plan, start(), start() + Duration::hours(1), None, 60_000);
        assert_eq!(r.sample_count, 0);
        assert_eq!(r.condition, AnalysisCondition::InsufficientData);
    }
}
