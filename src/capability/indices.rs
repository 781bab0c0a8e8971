//! Process capability indices (Cp, Cpk, Pp, Ppk, Ca).
//!
//! Process capability indices quantify how well a process output fits within
//! specification limits. Short-term indices (Cp, Cpk) use within-subgroup
//! variation, while long-term indices (Pp, Ppk) use overall variation. The
//! two families are computed from different sigmas and never substituted for
//! each other.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use u_numflow::stats;

use crate::error::SpcError;

/// Specification limits for capability analysis.
///
/// At least one limit must be present. An optional target is used for the
/// accuracy index Ca; it defaults to the midpoint of the limits.
///
/// # Examples
///
/// ```
/// use u_spc::capability::ProcessCapability;
///
/// // Two-sided specification: LSL = 9.0, USL = 11.0
/// let spec = ProcessCapability::new(Some(11.0), Some(9.0)).unwrap();
///
/// let data = [9.5, 10.0, 10.2, 9.8, 10.1, 10.3, 9.9, 10.0];
/// let indices = spec.compute(&data, 0.15).unwrap();
/// assert!(indices.cp.is_some());
/// assert!(indices.cpk.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessCapability {
    usl: Option<f64>,
    lsl: Option<f64>,
    target: Option<f64>,
}

/// Computed capability indices.
///
/// Fields are `Option<f64>` because not all indices can be computed for
/// one-sided specifications. For example, Cp requires both USL and LSL.
///
/// | Index | Value | Interpretation |
/// |-------|-------|----------------|
/// | Cp/Pp | >= 1.33 | Process is capable |
/// | Cpk/Ppk | >= 1.33 | Process is capable and centered |
/// | Ca | 0 | Process mean on target |
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityIndices {
    /// Cp = (USL - LSL) / (6 * sigma_within). Requires both limits.
    pub cp: Option<f64>,
    /// Cpk = min(Cpu, Cpl), or the one-sided value.
    pub cpk: Option<f64>,
    /// Cpu = (USL - mean) / (3 * sigma_within).
    pub cpu: Option<f64>,
    /// Cpl = (mean - LSL) / (3 * sigma_within).
    pub cpl: Option<f64>,
    /// Pp = (USL - LSL) / (6 * sigma_overall). Requires both limits.
    pub pp: Option<f64>,
    /// Ppk = min(Ppu, Ppl), or the one-sided value.
    pub ppk: Option<f64>,
    pub ppu: Option<f64>,
    pub ppl: Option<f64>,
    /// Ca = |mean - target| / ((USL - LSL) / 2). Requires both limits.
    pub ca: Option<f64>,
    pub mean: f64,
    /// Short-term (within-subgroup) standard deviation.
    pub sigma_within: f64,
    /// Long-term (overall) standard deviation.
    pub sigma_overall: f64,
}

impl ProcessCapability {
    /// Creates a new process capability specification.
    ///
    /// # Errors
    ///
    /// [`SpcError::InvalidSpecLimits`] if:
    /// - Both `usl` and `lsl` are `None`
    /// - Either limit is non-finite (NaN or infinity)
    /// - `usl <= lsl` when both are provided
    ///
    /// # Examples
    ///
    /// ```
    /// use u_spc::capability::ProcessCapability;
    ///
    /// // Upper limit only
    /// let spec = ProcessCapability::new(Some(10.0), None).unwrap();
    ///
    /// // Error: no limits
    /// assert!(ProcessCapability::new(None, None).is_err());
    ///
    /// // Error: USL <= LSL
    /// assert!(ProcessCapability::new(Some(5.0), Some(10.0)).is_err());
    /// ```
    pub fn new(usl: Option<f64>, lsl: Option<f64>) -> Result<Self, SpcError> {
        if usl.is_none() && lsl.is_none() {
            return Err(SpcError::InvalidSpecLimits(
                "at least one specification limit (USL or LSL) is required",
            ));
        }
        if usl.is_some_and(|u| !u.is_finite()) {
            return Err(SpcError::InvalidSpecLimits("USL must be finite"));
        }
        if lsl.is_some_and(|l| !l.is_finite()) {
            return Err(SpcError::InvalidSpecLimits("LSL must be finite"));
        }
        if let (Some(u), Some(l)) = (usl, lsl) {
            if u <= l {
                return Err(SpcError::InvalidSpecLimits("USL must be greater than LSL"));
            }
        }
        Ok(Self {
            usl,
            lsl,
            target: None,
        })
    }

    /// Sets the target used by Ca. Non-finite targets are ignored.
    pub fn with_target(mut self, target: f64) -> Self {
        if target.is_finite() {
            self.target = Some(target);
        }
        self
    }

    pub fn usl(&self) -> Option<f64> {
        self.usl
    }

    pub fn lsl(&self) -> Option<f64> {
        self.lsl
    }

    /// Explicit target, or the midpoint for a two-sided specification.
    pub fn target(&self) -> Option<f64> {
        self.target.or(match (self.usl, self.lsl) {
            (Some(u), Some(l)) => Some((u + l) / 2.0),
            _ => None,
        })
    }

    /// Accuracy index Ca for a process mean.
    ///
    /// Independent of dispersion, so it stays defined for constant data.
    pub fn ca(&self, mean: f64) -> Option<f64> {
        let (u, l) = (self.usl?, self.lsl?);
        let half_tolerance = (u - l) / 2.0;
        let target = self.target()?;
        Some((mean - target).abs() / half_tolerance)
    }

    /// Computes all indices from raw data and a within-subgroup sigma
    /// (typically R-bar / d2). The overall sigma is the sample standard
    /// deviation of `data`.
    ///
    /// Returns `None` if `data` has fewer than 2 finite values or either
    /// sigma is not positive.
    pub fn compute(&self, data: &[f64], sigma_within: f64) -> Option<CapabilityIndices> {
        let x_bar = stats::mean(data)?;
        let sigma_overall = stats::std_dev(data)?;
        self.from_moments(x_bar, sigma_within, sigma_overall)
    }

    /// Computes indices using the overall sigma for both families, for data
    /// without rational subgroups. Cp == Pp and Cpk == Ppk.
    pub fn compute_overall(&self, data: &[f64]) -> Option<CapabilityIndices> {
        let x_bar = stats::mean(data)?;
        let sigma_overall = stats::std_dev(data)?;
        self.from_moments(x_bar, sigma_overall, sigma_overall)
    }

    /// Computes indices from precomputed moments.
    ///
    /// Returns `None` when either sigma is zero, negative or non-finite:
    /// the distribution is degenerate and every ratio is undefined.
    pub fn from_moments(
        &self,
        mean: f64,
        sigma_within: f64,
        sigma_overall: f64,
    ) -> Option<CapabilityIndices> {
        let usable = |s: f64| s.is_finite() && s > 0.0;
        if !mean.is_finite() || !usable(sigma_within) || !usable(sigma_overall) {
            return None;
        }

        let within = self.family(mean, sigma_within);
        let overall = self.family(mean, sigma_overall);

        Some(CapabilityIndices {
            cp: within.spread,
            cpk: within.worst,
            cpu: within.upper,
            cpl: within.lower,
            pp: overall.spread,
            ppk: overall.worst,
            ppu: overall.upper,
            ppl: overall.lower,
            ca: self.ca(mean),
            mean,
            sigma_within,
            sigma_overall,
        })
    }

    fn family(&self, mean: f64, sigma: f64) -> Family {
        let upper = self.usl.map(|u| (u - mean) / (3.0 * sigma));
        let lower = self.lsl.map(|l| (mean - l) / (3.0 * sigma));
        let spread = match (self.usl, self.lsl) {
            (Some(u), Some(l)) => Some((u - l) / (6.0 * sigma)),
            _ => None,
        };
        let worst = match (upper, lower) {
            (Some(u), Some(l)) => Some(u.min(l)),
            (one, other) => one.or(other),
        };
        Family {
            spread,
            worst,
            upper,
            lower,
        }
    }
}

/// One index family evaluated at a given sigma.
struct Family {
    spread: Option<f64>,
    worst: Option<f64>,
    upper: Option<f64>,
    lower: Option<f64>,
}
