//! Route cost matrix error types.
//!
//! These are structural failures: they mean the matrix was wired or loaded
//! incorrectly. "No path" is never an error here.

use std::path::PathBuf;

use crate::domain::RouteId;

/// Errors raised while building or querying the route cost matrix.
#[derive(Debug, thiserror::Error)]
pub enum CostError {
    /// Two matrices or rows of different sizes were combined
    #[error("matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A route id was not present in the route index
    #[error("route {0} is not in the route index")]
    UnknownRoute(RouteId),

    /// The cached route index does not match the live route set
    #[error("stale route index cache at {path}: {reason}")]
    StaleIndexCache { path: PathBuf, reason: String },

    /// Reading or writing the route index cache failed
    #[error("route index cache error at {path}: {message}")]
    Cache { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CostError::DimensionMismatch {
            expected: 3,
            actual: 4,
        };
        assert_eq!(
            err.to_string(),
            "matrix dimension mismatch: expected 3, got 4"
        );

        let err = CostError::UnknownRoute(RouteId::new("R9").unwrap());
        assert_eq!(err.to_string(), "route R9 is not in the route index");

        let err = CostError::StaleIndexCache {
            path: PathBuf::from("index.json"),
            reason: "cached 3 routes, live 4".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "stale route index cache at index.json: cached 3 routes, live 4"
        );
    }
}
