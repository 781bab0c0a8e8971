//! Run rules for detecting non-random patterns on the X-bar chart.
//!
//! Nelson's eight tests, individually selectable through [`RuleSet`].
//! Zone boundaries are derived from the chart limits with
//! `sigma = (UCL - CL) / 3`.
//!
//! # References
//!
//! - Nelson, L.S. (1984). "The Shewhart Control Chart — Tests for Special Causes",
//!   *Journal of Quality Technology* 16(4), pp. 237-239.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use super::chart::{ControlLimits, NelsonRule, RuleViolation};

/// A selection of Nelson rules.
///
/// # Examples
///
/// ```
/// use u_spc::spc::{ControlLimits, NelsonRule, RuleSet};
///
/// let limits = ControlLimits { ucl: 30.0, cl: 25.0, lcl: 20.0 };
/// let means = [25.0, 31.0, 25.0];
///
/// let violations = RuleSet::default().check(&means, &limits);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].rule, NelsonRule::BeyondLimits);
/// assert_eq!(violations[0].index, 2);
///
/// assert!(RuleSet::NONE.check(&means, &limits).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleSet(u8);

impl RuleSet {
    /// All eight rules.
    pub const ALL: RuleSet = RuleSet(0xFF);
    /// No rules.
    pub const NONE: RuleSet = RuleSet(0);

    /// Rules 1, 2, 5 and 6: the classic Western Electric tests.
    pub fn western_electric() -> Self {
        Self::from_rules([
            NelsonRule::BeyondLimits,
            NelsonRule::NineOneSide,
            NelsonRule::TwoOfThreeBeyond2Sigma,
            NelsonRule::FourOfFiveBeyond1Sigma,
        ])
    }

    pub fn from_rules(rules: impl IntoIterator<Item = NelsonRule>) -> Self {
        rules.into_iter().fold(Self::NONE, Self::with)
    }

    pub fn with(self, rule: NelsonRule) -> Self {
        Self(self.0 | bit(rule))
    }

    pub fn without(self, rule: NelsonRule) -> Self {
        Self(self.0 & !bit(rule))
    }

    pub fn contains(self, rule: NelsonRule) -> bool {
        self.0 & bit(rule) != 0
    }

    /// Enabled rules in rule-number order.
    pub fn rules(self) -> impl Iterator<Item = NelsonRule> {
        NelsonRule::ALL.into_iter().filter(move |&r| self.contains(r))
    }

    /// Checks chart values against the enabled rules.
    ///
    /// Violations carry the 1-based index of the point that completes the
    /// pattern and are ordered by index, then rule. A point may violate
    /// several rules. Nothing is reported when the limits have no width.
    pub fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<RuleViolation> {
        let sigma = limits.zone_sigma();
        if !sigma.is_finite() || sigma <= 0.0 {
            return Vec::new();
        }
        let zones = Zones {
            cl: limits.cl,
            sigma,
        };

        let mut out: Vec<RuleViolation> = self
            .rules()
            .flat_map(|rule| {
                positions(rule, values, limits, &zones)
                    .into_iter()
                    .map(move |p| RuleViolation { rule, index: p + 1 })
            })
            .collect();
        out.sort_by_key(|v| (v.index, v.rule));
        out
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::ALL
    }
}

fn bit(rule: NelsonRule) -> u8 {
    1 << (rule.number() - 1)
}

struct Zones {
    cl: f64,
    sigma: f64,
}

impl Zones {
    fn above(&self, v: f64, k: f64) -> bool {
        v > self.cl + k * self.sigma
    }

    fn below(&self, v: f64, k: f64) -> bool {
        v < self.cl - k * self.sigma
    }
}

/// 0-based positions at which `rule` fires.
fn positions(rule: NelsonRule, values: &[f64], limits: &ControlLimits, z: &Zones) -> Vec<usize> {
    match rule {
        NelsonRule::BeyondLimits => streaks(values.iter().map(|&v| !limits.contains(v)), 1),
        NelsonRule::NineOneSide => {
            let sides: Vec<i8> = values.iter().map(|&v| signum(v - z.cl)).collect();
            sign_streaks(&sides, 9)
        }
        NelsonRule::SixTrend => {
            // Five moves in one direction span six points.
            let moves = directions(values);
            shift(sign_streaks(&moves, 5), 1)
        }
        NelsonRule::FourteenAlternating => {
            // Thirteen alternating moves span fourteen points.
            let moves = directions(values);
            let flips = (0..moves.len()).map(|i| {
                i > 0 && moves[i] != 0 && moves[i - 1] != 0 && moves[i] == -moves[i - 1]
            });
            shift(streaks(flips, 12), 1)
        }
        NelsonRule::TwoOfThreeBeyond2Sigma => k_of_n(values, 3, 2, |v| z.above(v, 2.0), |v| z.below(v, 2.0)),
        NelsonRule::FourOfFiveBeyond1Sigma => k_of_n(values, 5, 4, |v| z.above(v, 1.0), |v| z.below(v, 1.0)),
        NelsonRule::FifteenWithin1Sigma => {
            streaks(values.iter().map(|&v| !z.above(v, 1.0) && !z.below(v, 1.0)), 15)
        }
        NelsonRule::EightBeyond1Sigma => {
            streaks(values.iter().map(|&v| z.above(v, 1.0) || z.below(v, 1.0)), 8)
        }
    }
}

fn signum(d: f64) -> i8 {
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

/// Direction of each consecutive move.
fn directions(values: &[f64]) -> Vec<i8> {
    values.windows(2).map(|w| signum(w[1] - w[0])).collect()
}

/// Positions where at least `min_len` consecutive flags are set.
fn streaks(flags: impl IntoIterator<Item = bool>, min_len: usize) -> Vec<usize> {
    let mut run = 0_usize;
    flags
        .into_iter()
        .enumerate()
        .filter_map(|(i, set)| {
            run = if set { run + 1 } else { 0 };
            (run >= min_len).then_some(i)
        })
        .collect()
}

/// Positions ending a run of at least `min_len` equal non-zero signs.
fn sign_streaks(signs: &[i8], min_len: usize) -> Vec<usize> {
    let mut run = 0_usize;
    let mut prev = 0_i8;
    let mut out = Vec::new();
    for (i, &s) in signs.iter().enumerate() {
        run = match s {
            0 => 0,
            _ if s == prev => run + 1,
            _ => 1,
        };
        prev = s;
        if run >= min_len {
            out.push(i);
        }
    }
    out
}

/// Positions ending a window of `n` points with at least `k` on one side.
fn k_of_n(
    values: &[f64],
    n: usize,
    k: usize,
    high: impl Fn(f64) -> bool,
    low: impl Fn(f64) -> bool,
) -> Vec<usize> {
    values
        .windows(n)
        .enumerate()
        .filter(|(_, w)| {
            w.iter().filter(|&&v| high(v)).count() >= k || w.iter().filter(|&&v| low(v)).count() >= k
        })
        .map(|(start, _)| start + n - 1)
        .collect()
}

fn shift(positions: Vec<usize>, by: usize) -> Vec<usize> {
    positions.into_iter().map(|p| p + by).collect()
}
