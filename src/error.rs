//! Error types.
//!
//! Two families are kept apart:
//!
//! - [`SpcError`] — caller contract violations and configuration problems
//!   (an unrecognized unit string, malformed specification limits, a bad
//!   config file).
//! - [`SourceError`] — failures of the external data source or summary
//!   store. Services convert these into empty results at their boundary.
//!
//! Expected data conditions (zero variance, empty windows, invalid sampling
//! configurations) are *not* errors; they are reported as data.

use thiserror::Error;

/// Contract and configuration errors.
#[derive(Debug, Error)]
pub enum SpcError {
    /// A time unit string outside `year|month|week|day|hour|minute|second`.
    #[error("unknown time unit: {0:?}")]
    UnknownTimeUnit(String),

    /// A period type string outside `shift|day|week|month`.
    #[error("unknown period type: {0:?}")]
    UnknownPeriodType(String),

    /// A shift name outside `morning|afternoon|night`.
    #[error("unknown shift: {0:?}")]
    UnknownShift(String),

    /// A time range string outside `7days|30days|90days|1year`.
    #[error("unknown time range: {0:?}")]
    UnknownTimeRange(String),

    /// Specification limits that cannot define a capability study.
    #[error("invalid specification limits: {0}")]
    InvalidSpecLimits(&'static str),

    /// A plant UTC offset outside +/-24h.
    #[error("invalid UTC offset: {0} minutes")]
    InvalidUtcOffset(i32),

    /// Malformed TOML configuration.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by an [`AnalysisSource`](crate::source::AnalysisSource)
/// or [`SummaryStore`](crate::source::SummaryStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store cannot be reached.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but the query failed.
    #[error("query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = SpcError::UnknownTimeUnit("fortnight".into());
        assert_eq!(err.to_string(), "unknown time unit: \"fortnight\"");

        let err = SourceError::Unavailable("connection refused".into());
        assert_eq!(err.to_string(), "data source unavailable: connection refused");
    }

    #[test]
    fn toml_errors_convert() {
        let parse: Result<toml::Value, _> = toml::from_str("=");
        let err: SpcError = parse.unwrap_err().into();
        assert!(matches!(err, SpcError::Config(_)));
    }
}
