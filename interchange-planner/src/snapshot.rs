//! Serialisable bundle of the network data the planner consumes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::availability::{AvailabilityIndex, StopAvailability};
use crate::graph::TransportGraph;
use crate::transport::{TransportData, TransportRecords};
use crate::walkable::{NeighbourRecord, Neighbours};

/// Errors loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Routes, interchanges, stop availability, neighbours and optionally the
/// network graph, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub transport: TransportRecords,
    #[serde(default)]
    pub availability: Vec<StopAvailability>,
    #[serde(default)]
    pub neighbours: Vec<NeighbourRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<TransportGraph>,
}

/// The in-memory collaborators built from a snapshot.
#[derive(Debug)]
pub struct Network {
    pub transport: TransportData,
    pub availability: AvailabilityIndex,
    pub neighbours: Neighbours,
    pub graph: Option<TransportGraph>,
}

impl NetworkSnapshot {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SnapshotError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: Self =
            serde_json::from_str(&contents).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            path = %path.display(),
            routes = snapshot.transport.routes.len(),
            interchanges = snapshot.transport.interchanges.len(),
            graph_nodes = snapshot.graph.as_ref().map_or(0, TransportGraph::node_count),
            "Loaded network snapshot"
        );
        Ok(snapshot)
    }

    pub fn into_network(self) -> Network {
        Network {
            transport: self.transport.into(),
            availability: self.availability.into_iter().collect(),
            neighbours: self.neighbours.into_iter().collect(),
            graph: self.graph,
        }
    }
}
