//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from cost-matrix and traversal errors.

use chrono::NaiveDate;

use super::{InvalidId, TimeError};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// An identifier failed validation
    #[error(transparent)]
    InvalidId(#[from] InvalidId),

    /// A time or time window failed validation
    #[error(transparent)]
    InvalidTime(#[from] TimeError),

    /// Date range ends before it starts
    #[error("invalid date range: {end} is before {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}
