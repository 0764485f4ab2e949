//! Errors raised while ingesting loosely-typed records.
//!
//! Evaluation itself never fails: bad schedule data is reported as
//! violations and conflicts. Only turning raw records into typed
//! constraints can be rejected.

use thiserror::Error;

/// Errors from parsing constraint records and calendar values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    /// The constraint `type` string is not one of the eight known kinds.
    #[error("unknown constraint type '{0}'")]
    UnknownConstraintType(String),

    /// The priority string is not LOW, MEDIUM, HIGH or CRITICAL.
    #[error("unknown priority '{0}'")]
    UnknownPriority(String),

    /// Weight outside the closed interval [0, 1].
    #[error("weight {0} is outside [0, 1]")]
    InvalidWeight(f64),

    /// A time of day that is neither `HH:MM` nor a whole hour.
    #[error("invalid time of day '{0}'")]
    InvalidTime(String),

    /// An unrecognized day-of-week name.
    #[error("unknown day of week '{0}'")]
    UnknownDay(String),

    /// A numeric rule parameter that is negative or zero where a positive
    /// value is required.
    #[error("rule parameter '{key}' must be positive, got {value}")]
    NonPositiveParameter { key: &'static str, value: f64 },
}

/// Result alias for payload ingestion.
pub type Result<T> = std::result::Result<T, PayloadError>;
