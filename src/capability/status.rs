//! Capability status classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lower bound of [`CapabilityStatus::Excellent`].
pub const EXCELLENT_CPK: f64 = 1.67;
/// Lower bound of [`CapabilityStatus::Good`].
pub const GOOD_CPK: f64 = 1.33;
/// Lower bound of [`CapabilityStatus::Acceptable`].
pub const ACCEPTABLE_CPK: f64 = 1.00;
/// Lower bound of [`CapabilityStatus::NeedsImprovement`].
pub const NEEDS_IMPROVEMENT_CPK: f64 = 0.67;

/// Capability band of a Cpk value.
///
/// Variants are ordered from worst to best, with `NotAvailable` below all
/// of them, so a higher Cpk never produces a lower status.
///
/// # Examples
///
/// ```
/// use u_spc::capability::CapabilityStatus;
///
/// assert_eq!(CapabilityStatus::from_cpk(Some(1.40)), CapabilityStatus::Good);
/// assert_eq!(CapabilityStatus::from_cpk(Some(0.5)).label(), "critical");
/// assert_eq!(CapabilityStatus::from_cpk(None).label(), "N/A");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityStatus {
    #[serde(rename = "N/A")]
    NotAvailable,
    Critical,
    NeedsImprovement,
    Acceptable,
    Good,
    Excellent,
}

impl CapabilityStatus {
    /// Classifies a Cpk. `None` and NaN map to [`NotAvailable`](Self::NotAvailable).
    pub fn from_cpk(cpk: Option<f64>) -> Self {
        match cpk {
            Some(v) if v >= EXCELLENT_CPK => Self::Excellent,
            Some(v) if v >= GOOD_CPK => Self::Good,
            Some(v) if v >= ACCEPTABLE_CPK => Self::Acceptable,
            Some(v) if v >= NEEDS_IMPROVEMENT_CPK => Self::NeedsImprovement,
            Some(v) if !v.is_nan() => Self::Critical,
            _ => Self::NotAvailable,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotAvailable => "N/A",
            Self::Critical => "critical",
            Self::NeedsImprovement => "needs_improvement",
            Self::Acceptable => "acceptable",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn monotonic_in_cpk(a in -5.0_f64..5.0, b in -5.0_f64..5.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(CapabilityStatus::from_cpk(Some(lo)) <= CapabilityStatus::from_cpk(Some(hi)));
        }

        #[test]
        fn total_over_finite_values(v in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
            prop_assert_ne!(CapabilityStatus::from_cpk(Some(v)), CapabilityStatus::NotAvailable);
        }
    }
}
