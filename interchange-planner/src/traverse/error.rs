//! Traversal error types.

use super::StateKind;
use crate::domain::{ServiceId, StationId};
use crate::graph::{EdgeId, NodeId};
use crate::routes::CostError;

/// Defects found while searching. Finding no journey is not an error.
#[derive(Debug, thiserror::Error)]
pub enum TraversalError {
    /// A state tried to move to a kind it has not registered
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition { from: StateKind, to: StateKind },

    /// A node id is not in the graph
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),

    /// An edge id is not in the graph
    #[error("edge {0:?} is not in the graph")]
    UnknownEdge(EdgeId),

    /// A station id has no station node
    #[error("station {0} is not in the graph")]
    UnknownStation(StationId),

    /// A service node has no calendar
    #[error("service {service} has no calendar")]
    MissingCalendar { service: ServiceId },

    /// The request cannot be searched
    #[error("invalid journey request: {0}")]
    InvalidRequest(String),

    /// The cost repository failed
    #[error(transparent)]
    Cost(#[from] CostError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TraversalError::IllegalTransition {
            from: StateKind::Service,
            to: StateKind::Minute,
        };
        assert_eq!(err.to_string(), "illegal transition from Service to Minute");

        let err = TraversalError::MissingCalendar {
            service: ServiceId::new("SVC1").unwrap(),
        };
        assert_eq!(err.to_string(), "service SVC1 has no calendar");

        let err = TraversalError::UnknownNode(NodeId(4));
        assert_eq!(err.to_string(), "node n4 is not in the graph");
    }
}
