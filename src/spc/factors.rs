//! Control chart factor tables (ASTM E2587) for subgroup sizes n = 2..=25.

// ---------------------------------------------------------------------------
// Tables, index 0 corresponds to n=2.
// ---------------------------------------------------------------------------

/// Smallest subgroup size with tabulated factors.
pub const MIN_FACTOR_SIZE: usize = 2;
/// Largest subgroup size with tabulated factors.
pub const MAX_FACTOR_SIZE: usize = 25;

/// d2 factors (mean of the relative range) for estimating sigma from R-bar.
///
/// sigma-hat = R-bar / d2.
const D2: [f64; 24] = [
    1.128, 1.693, 2.059, 2.326, 2.534, 2.704, 2.847, 2.970, 3.078, 3.173, 3.258, 3.336,
    3.407, 3.472, 3.532, 3.588, 3.640, 3.689, 3.735, 3.778, 3.819, 3.858, 3.895, 3.931,
];

/// D3 factors for the R chart lower control limit.
///
/// LCL_R = D3 * R-bar.
const D3: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.076, 0.136, 0.184, 0.223, 0.256, 0.283, 0.307, 0.328, 0.347,
    0.363, 0.378, 0.391, 0.403, 0.415, 0.425, 0.434, 0.443, 0.451, 0.459,
];

/// D4 factors for the R chart upper control limit.
///
/// UCL_R = D4 * R-bar.
const D4: [f64; 24] = [
    3.267, 2.575, 2.282, 2.114, 2.004, 1.924, 1.864, 1.816, 1.777, 1.744, 1.717, 1.693,
    1.672, 1.653, 1.637, 1.622, 1.608, 1.597, 1.585, 1.575, 1.566, 1.557, 1.548, 1.541,
];

fn lookup(table: &[f64; 24], n: usize) -> Option<f64> {
    n.checked_sub(MIN_FACTOR_SIZE).and_then(|i| table.get(i)).copied()
}

/// d2 for subgroup size `n`, `None` outside 2..=25.
pub fn d2(n: usize) -> Option<f64> {
    lookup(&D2, n)
}

/// D3 for subgroup size `n`, `None` outside 2..=25.
pub fn d3(n: usize) -> Option<f64> {
    lookup(&D3, n)
}

/// D4 for subgroup size `n`, `None` outside 2..=25.
pub fn d4(n: usize) -> Option<f64> {
    lookup(&D4, n)
}
