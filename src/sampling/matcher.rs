//! Schedule-to-data matching.

use chrono::{DateTime, TimeDelta, Utc};

use crate::measurement::Measurement;

/// Default matching tolerance: one minute.
pub const DEFAULT_TOLERANCE_MS: i64 = 60_000;

/// Snaps measurements onto scheduled instants.
///
/// For every scheduled instant, in schedule order, the measurement closest
/// in time is selected if its distance is strictly below `tolerance_ms`;
/// otherwise the slot is skipped. Among equally close measurements the one
/// appearing first in `data` wins. A measurement may be selected by more
/// than one slot.
///
/// `data` need not be sorted. It is indexed once by timestamp and each
/// slot is resolved by binary search, so the cost is
/// `O((n + m) log n)` rather than `O(n * m)`.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use u_spc::measurement::Measurement;
/// use u_spc::sampling::match_to_schedule;
///
/// let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
/// let data = [
///     Measurement::new(1.0, t0 + Duration::seconds(20)),
///     Measurement::new(2.0, t0 + Duration::minutes(59)),
/// ];
/// let schedule = [t0, t0 + Duration::hours(1), t0 + Duration::hours(2)];
///
/// let matched = match_to_schedule(&data, &schedule, 60_000);
/// assert_eq!(matched.len(), 2);
/// assert_eq!(matched[1].value, 2.0);
/// ```
pub fn match_to_schedule(
    data: &[Measurement],
    schedule: &[DateTime<Utc>],
    tolerance_ms: i64,
) -> Vec<Measurement> {
    if data.is_empty() || tolerance_ms <= 0 {
        return Vec::new();
    }
    let tolerance = TimeDelta::milliseconds(tolerance_ms);

    // Stable sort keeps equal timestamps in input order.
    let mut order: Vec<usize> = (0..data.len()).collect();
    order.sort_by_key(|&i| data[i].timestamp);

    schedule
        .iter()
        .filter_map(|&slot| nearest(data, &order, slot))
        .filter(|&(_, distance)| distance < tolerance)
        .map(|(i, _)| data[i])
        .collect()
}

/// Index in `data` of the measurement closest to `slot`, with its exact
/// distance. Distances are not rounded, so two distinct timestamps on the
/// same side of a slot never tie.
fn nearest(data: &[Measurement], order: &[usize], slot: DateTime<Utc>) -> Option<(usize, TimeDelta)> {
    let split = order.partition_point(|&i| data[i].timestamp < slot);

    // At or after the slot: the first entry is the earliest input among
    // equal timestamps.
    let after = order.get(split).map(|&i| (i, distance(data[i].timestamp, slot)));

    // Before the slot: rewind to the first entry of the closest timestamp.
    let before = split.checked_sub(1).map(|last| {
        let ts = data[order[last]].timestamp;
        let first = order[..last].partition_point(|&i| data[i].timestamp < ts);
        let i = order[first];
        (i, distance(ts, slot))
    });

    match (before, after) {
        (Some(b), Some(a)) => {
            if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (b, a) => b.or(a),
    }
}

fn distance(a: DateTime<Utc>, b: DateTime<Utc>) -> TimeDelta {
    (a - b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn m(value: f64, offset_ms: i64) -> Measurement {
        Measurement::new(value, t0() + Duration::milliseconds(offset_ms))
    }

    /// Reference scan: first-seen minimum.
    fn naive(data: &[Measurement], schedule: &[DateTime<Utc>], tol: i64) -> Vec<Measurement> {
        let tol = TimeDelta::milliseconds(tol);
        let mut out = Vec::new();
        for &slot in schedule {
            let mut best: Option<(usize, TimeDelta)> = None;
            for (i, d) in data.iter().enumerate() {
                let dist = distance(d.timestamp, slot);
                if dist < tol && best.map_or(true, |(_, b)| dist < b) {
                    best = Some((i, dist));
                }
            }
            if let Some((i, _)) = best {
                out.push(data[i]);
            }
        }
        out
    }

    #[test]
    fn skips_slots_without_candidates() {
        let data = [m(1.0, 0), m(2.0, 3_600_000)];
        let schedule = [t0(), t0() + Duration::minutes(30), t0() + Duration::hours(1)];
        let matched = match_to_schedule(&data, &schedule, DEFAULT_TOLERANCE_MS);
        assert_eq!(matched, vec![data[0], data[1]]);
    }

    #[test]
    fn tolerance_is_strict() {
        let data = [m(1.0, 60_000)];
        assert!(match_to_schedule(&data, &[t0()], 60_000).is_empty());
        assert_eq!(match_to_schedule(&data, &[t0()], 60_001).len(), 1);
    }

    #[test]
    fn picks_closest() {
        let data = [m(1.0, -40_000), m(2.0, 10_000), m(3.0, 50_000)];
        let matched = match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS);
        assert_eq!(matched[0].value, 2.0);
    }

    #[test]
    fn equal_distance_prefers_first_seen() {
        // Later in time but earlier in input.
        let data = [m(1.0, 5_000), m(2.0, -5_000)];
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS)[0].value, 1.0);

        let data = [m(2.0, -5_000), m(1.0, 5_000)];
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS)[0].value, 2.0);
    }

    #[test]
    fn duplicate_timestamps_prefer_first_seen() {
        let data = [m(9.0, 40_000), m(1.0, -2_000), m(2.0, -2_000)];
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS)[0].value, 1.0);
    }

    #[test]
    fn sub_millisecond_offsets_pick_the_closest() {
        let at = |value, micros| Measurement::new(value, t0() + Duration::microseconds(micros));
        let data = [at(1.0, 5_900), at(2.0, 5_100)];
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS)[0].value, 2.0);
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS), naive(&data, &[t0()], DEFAULT_TOLERANCE_MS));

        // Same instant to the nanosecond: input order decides.
        let data = [at(1.0, -5_100), at(2.0, -5_100)];
        assert_eq!(match_to_schedule(&data, &[t0()], DEFAULT_TOLERANCE_MS)[0].value, 1.0);
    }

    #[test]
    fn unsorted_input_matches_naive_scan() {
        let data = [m(4.0, 7_200_500), m(1.0, 100), m(3.0, 3_599_000), m(2.0, 1_800_000)];
        let schedule: Vec<_> = (0..5).map(|k| t0() + Duration::minutes(30 * k)).collect();
        assert_eq!(
            match_to_schedule(&data, &schedule, DEFAULT_TOLERANCE_MS),
            naive(&data, &schedule, DEFAULT_TOLERANCE_MS)
        );
    }

    #[test]
    fn empty_inputs() {
        assert!(match_to_schedule(&[], &[t0()], DEFAULT_TOLERANCE_MS).is_empty());
        assert!(match_to_schedule(&[m(1.0, 0)], &[], DEFAULT_TOLERANCE_MS).is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn agrees_with_naive_scan(
                offsets in prop::collection::vec(-600_000_i64..600_000, 0..40),
                slots in prop::collection::vec(-600_000_i64..600_000, 0..20),
                tol in 1_i64..120_000,
            ) {
                // Coarse offsets so that ties actually happen.
                let data: Vec<_> = offsets
                    .iter()
                    .enumerate()
                    .map(|(i, &o)| m(i as f64, o / 10_000 * 10_000))
                    .collect();
                let schedule: Vec<_> = slots
                    .iter()
                    .map(|&o| t0() + Duration::milliseconds(o / 5_000 * 5_000))
                    .collect();

                let fast = match_to_schedule(&data, &schedule, tol);
                prop_assert_eq!(&fast, &naive(&data, &schedule, tol));
                prop_assert!(fast.len() <= schedule.len());
            }

            #[test]
            fn agrees_with_naive_scan_at_microsecond_resolution(
                offsets in prop::collection::vec(-20_000_i64..20_000, 0..30),
                slots in prop::collection::vec(-20_000_i64..20_000, 0..10),
                tol in 1_i64..20,
            ) {
                // Offsets in microseconds, coarsened to tenths of a millisecond.
                let data: Vec<_> = offsets
                    .iter()
                    .enumerate()
                    .map(|(i, &o)| Measurement::new(i as f64, t0() + Duration::microseconds(o / 100 * 100)))
                    .collect();
                let schedule: Vec<_> = slots
                    .iter()
                    .map(|&o| t0() + Duration::microseconds(o / 1_000 * 1_000))
                    .collect();

                prop_assert_eq!(match_to_schedule(&data, &schedule, tol), naive(&data, &schedule, tol));
            }

            #[test]
            fn matches_lie_within_tolerance(
                offsets in prop::collection::vec(-3_600_000_i64..3_600_000, 1..50),
                tol in 1_i64..300_000,
            ) {
                let data: Vec<_> = offsets.iter().map(|&o| m(0.0, o)).collect();
                let schedule: Vec<_> = (-6..=6).map(|k| t0() + Duration::minutes(10 * k)).collect();

                // Matches are emitted in schedule order, one per matched slot.
                let matched = match_to_schedule(&data, &schedule, tol);
                let mut slots = schedule.iter();
                for hit in &matched {
                    let ok = slots.by_ref().any(|&s| distance(hit.timestamp, s) < TimeDelta::milliseconds(tol));
                    prop_assert!(ok);
                }
            }
        }
    }
}
