//! X-bar/R analysis of a sampled series.

use std::num::NonZeroUsize;

use u_numflow::stats;

use super::chart::{ControlLimits, RangePoint, XBarPoint};
use super::factors;
use super::result::{AnalysisCondition, SpcResult};
use super::rules::RuleSet;
use crate::capability::{CapabilityStatus, ProcessCapability};
use crate::measurement::{values_of, Measurement};
use crate::subgroup::{chunk_into_subgroups, subgroup_stats};

/// Analyzes `series` with every run rule enabled.
///
/// See [`analyze_with_rules`].
pub fn analyze(
    series: &[Measurement],
    subgroup_size: NonZeroUsize,
    spec: Option<&ProcessCapability>,
) -> SpcResult {
    analyze_with_rules(series, subgroup_size, spec, RuleSet::ALL)
}

/// Computes the full [`SpcResult`] of one analysis run.
///
/// # Algorithm
///
/// 1. Overall mean, sample standard deviation, min and max of all values.
/// 2. Chunk into subgroups of `subgroup_size` (the last may be short) and
///    compute each subgroup's mean and range.
/// 3. X-bar limits: `mean +/- 3 * std_dev / sqrt(n)`.
/// 4. R limits: `D4 * R-bar` and `D3 * R-bar` for n in 2..=25.
/// 5. `sigma_within = R-bar / d2(n)` for n in 2..=25, otherwise the overall
///    standard deviation. Cp/Cpk use `sigma_within`, Pp/Ppk use `std_dev`.
/// 6. Run rules over the subgroup means.
///
/// Expected data problems never panic: an empty series yields
/// [`SpcResult::empty`], a single point is flagged
/// [`AnalysisCondition::InsufficientData`], and zero dispersion with spec
/// limits is flagged [`AnalysisCondition::DegenerateDistribution`] with
/// every index `None` and run rules skipped.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use chrono::{Duration, TimeZone, Utc};
/// use u_spc::measurement::Measurement;
/// use u_spc::spc::{analyze, AnalysisCondition};
///
/// let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let series: Vec<_> = [1.40, 1.42, 1.38, 1.45]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| Measurement::new(v, t0 + Duration::hours(i as i64)))
///     .collect();
///
/// let result = analyze(&series, NonZeroUsize::new(2).unwrap(), None);
/// assert_eq!(result.condition, AnalysisCondition::Normal);
/// assert!((result.mean - 1.4125).abs() < 1e-12);
/// assert_eq!(result.x_bar_data.len(), 2);
/// assert!(result.cpk.is_none());
/// ```
pub fn analyze_with_rules(
    series: &[Measurement],
    subgroup_size: NonZeroUsize,
    spec: Option<&ProcessCapability>,
    rules: RuleSet,
) -> SpcResult {
    let n = subgroup_size.get();
    let values = values_of(series);
    let Some(mean) = stats::mean(&values).filter(|m| m.is_finite()) else {
        return SpcResult::empty(n);
    };
    let std_dev = stats::std_dev(&values).unwrap_or(0.0);
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    let groups = subgroup_stats(&chunk_into_subgroups(series, subgroup_size));
    let means: Vec<f64> = groups.iter().map(|g| g.mean).collect();
    let ranges: Vec<f64> = groups.iter().map(|g| g.range).collect();
    let mean_range = stats::mean(&ranges).unwrap_or(0.0);

    let sigma_within = factors::d2(n).map_or(std_dev, |d2| mean_range / d2);
    let limits = ControlLimits::three_sigma(mean, std_dev / (n as f64).sqrt());
    let (ucl_r, lcl_r) = match (factors::d4(n), factors::d3(n)) {
        (Some(d4), Some(d3)) => (Some(d4 * mean_range), Some(d3 * mean_range)),
        _ => (None, None),
    };

    let indices = spec.and_then(|s| s.from_moments(mean, sigma_within, std_dev));
    let condition = if values.len() < 2 {
        AnalysisCondition::InsufficientData
    } else if spec.is_some() && indices.is_none() {
        AnalysisCondition::DegenerateDistribution
    } else {
        AnalysisCondition::Normal
    };

    let violations = match condition {
        AnalysisCondition::DegenerateDistribution => Vec::new(),
        _ => rules.check(&means, &limits),
    };

    let mut result = SpcResult {
        sample_count: values.len(),
        subgroup_size: n,
        mean,
        std_dev,
        min,
        max,
        range: max - min,
        mean_range,
        sigma_within,
        cp: None,
        cpk: None,
        cpu: None,
        cpl: None,
        pp: None,
        ppk: None,
        ca: spec.and_then(|s| s.ca(mean)),
        ucl: limits.ucl,
        lcl: limits.lcl,
        ucl_r,
        lcl_r,
        x_bar_data: groups
            .iter()
            .enumerate()
            .map(|(i, g)| XBarPoint {
                index: i + 1,
                value: g.mean,
                timestamp: g.timestamp,
            })
            .collect(),
        range_data: groups
            .iter()
            .enumerate()
            .map(|(i, g)| RangePoint {
                index: i + 1,
                value: g.range,
            })
            .collect(),
        violations,
        status: CapabilityStatus::NotAvailable,
        condition,
    };

    match indices {
        Some(ix) if condition == AnalysisCondition::Normal => {
            result.cp = ix.cp;
            result.cpk = ix.cpk;
            result.cpu = ix.cpu;
            result.cpl = ix.cpl;
            result.pp = ix.pp;
            result.ppk = ix.ppk;
            result.status = CapabilityStatus::from_cpk(ix.cpk);
        }
        _ => result.clear_indices(),
    }
    result
}
