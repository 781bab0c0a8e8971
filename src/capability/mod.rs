//! Process capability analysis.
//!
//! Computes standard capability indices for assessing how well a process
//! meets specification limits, and classifies Cpk into status bands.
//!
//! # Indices
//!
//! - **Cp**, **Cpk** (Cpu, Cpl): short-term capability from within-subgroup sigma
//! - **Pp**, **Ppk** (Ppu, Ppl): long-term performance from overall sigma
//! - **Ca**: accuracy, the distance of the mean from target in half-tolerances
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;
mod status;

pub use indices::{CapabilityIndices, ProcessCapability};
pub use status::{
    CapabilityStatus, ACCEPTABLE_CPK, EXCELLENT_CPK, GOOD_CPK, NEEDS_IMPROVEMENT_CPK,
};
