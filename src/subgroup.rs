//! Subgrouping of a sampled series.
//!
//! A subgroup is a run of consecutive measurements treated as one sample
//! for within-group variation. Chunking never reorders or drops values; the
//! last subgroup may be short.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::measurement::Measurement;

/// Consecutive measurements analyzed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subgroup {
    pub values: Vec<f64>,
    /// Timestamp of the first member.
    pub timestamp: DateTime<Utc>,
}

/// Mean and range of one subgroup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubgroupStats {
    pub mean: f64,
    pub range: f64,
    pub timestamp: DateTime<Utc>,
}

/// Splits `series` into consecutive subgroups of `size` values.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use chrono::{Duration, TimeZone, Utc};
/// use u_spc::measurement::Measurement;
/// use u_spc::subgroup::chunk_into_subgroups;
///
/// let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
/// let series: Vec<_> = [1.40, 1.42, 1.38, 1.45, 1.41]
///     .iter()
///     .enumerate()
///     .map(|(i, &v)| Measurement::new(v, t0 + Duration::hours(i as i64)))
///     .collect();
///
/// let groups = chunk_into_subgroups(&series, NonZeroUsize::new(2).unwrap());
/// assert_eq!(groups.len(), 3);
/// assert_eq!(groups[2].values, vec![1.41]);
/// assert_eq!(groups[1].timestamp, t0 + Duration::hours(2));
/// ```
pub fn chunk_into_subgroups(series: &[Measurement], size: NonZeroUsize) -> Vec<Subgroup> {
    series
        .chunks(size.get())
        .filter_map(|chunk| {
            let first = chunk.first()?;
            Some(Subgroup {
                values: chunk.iter().map(|m| m.value).collect(),
                timestamp: first.timestamp,
            })
        })
        .collect()
}

/// Computes mean and range for each subgroup.
///
/// Empty subgroups (which [`chunk_into_subgroups`] never produces) are
/// skipped.
pub fn subgroup_stats(subgroups: &[Subgroup]) -> Vec<SubgroupStats> {
    subgroups
        .iter()
        .filter_map(|g| {
            Some(SubgroupStats {
                mean: stats::mean(&g.values)?,
                range: range_of(&g.values)?,
                timestamp: g.timestamp,
            })
        })
        .collect()
}

/// `max - min`, or `None` for an empty slice.
pub(crate) fn range_of(values: &[f64]) -> Option<f64> {
    let (&first, rest) = values.split_first()?;
    let (lo, hi) = rest
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(hi - lo)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn chunking_preserves_order_and_elements(
            values in prop::collection::vec(-1e6_f64..1e6, 0..200),
            n in 1_usize..30,
        ) {
            let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
            let data: Vec<_> = values
                .iter()
                .enumerate()
                .map(|(i, &v)| Measurement::new(v, t0 + Duration::seconds(i as i64)))
                .collect();
            let groups = chunk_into_subgroups(&data, NonZeroUsize::new(n).unwrap());

            let flattened: Vec<f64> = groups.iter().flat_map(|g| g.values.iter().copied()).collect();
            prop_assert_eq!(flattened, values.clone());
            for (k, g) in groups.iter().enumerate() {
                prop_assert!(!g.values.is_empty() && g.values.len() <= n);
                if k + 1 < groups.len() {
                    prop_assert_eq!(g.values.len(), n);
                }
                prop_assert_eq!(g.timestamp, data[k * n].timestamp);
            }
        }
    }
}
