//! Journey search over the transport graph.
//!
//! A search walks the graph depth-first as a state machine: every node
//! visited becomes a traversal state of one [`StateKind`], and moving between
//! kinds is only legal where the [`TransitionTable`] registers it.

mod arena;
mod config;
mod error;
mod journey;
mod kind;
mod rank;
mod search;

pub use arena::{StateArena, StateHandle, Step, TraversalState};
pub use config::SearchConfig;
pub use error::TraversalError;
pub use journey::{Journey, JourneyState, Stage};
pub use kind::{StateKind, TransitionTable};
pub use rank::{deduplicate, dominates, rank_journeys, remove_dominated};
pub use search::{JourneyRequest, SearchResult, Traverser};
