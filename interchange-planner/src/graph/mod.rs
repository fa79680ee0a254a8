//! The transport network graph read by the traversal.

mod edge;
mod network;
mod node;

pub use edge::{Edge, EdgeId, EdgeKind};
pub use network::{GraphError, GraphRecords, TransportGraph};
pub use node::{Node, NodeId};
