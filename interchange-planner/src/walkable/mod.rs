//! Walking neighbours between stations.
//!
//! Some stops are close enough to walk between, for example a tram stop and
//! the bus station across the road. A walk between neighbours is treated as a
//! fixed one-change shortcut by the cost repository and as a `Neighbour` edge
//! in the network graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{LocationSet, StationId};

/// Lookup of walking neighbours.
pub trait NeighbourLookup {
    /// Returns true if any station in `a` is a walking neighbour of any
    /// station in `b`.
    fn are_neighbours(&self, a: &LocationSet, b: &LocationSet) -> bool;
}

/// A walkable pair of stations with the walk time in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighbourRecord {
    pub from: StationId,
    pub to: StationId,
    pub minutes: u32,
}

/// A collection of walking neighbours.
///
/// Neighbours are symmetric: if you can walk from A to B, you can walk from B
/// to A in the same time.
#[derive(Debug, Clone, Default)]
pub struct Neighbours {
    /// Stored in both directions for O(1) lookup.
    connections: HashMap<(StationId, StationId), u32>,
}

impl Neighbours {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a walking connection between two stations, stored symmetrically.
    pub fn add(&mut self, from: StationId, to: StationId, minutes: u32) {
        self.connections.insert((from.clone(), to.clone()), minutes);
        self.connections.insert((to, from), minutes);
    }

    /// Get the walk time between two stations, if walkable.
    pub fn get(&self, from: &StationId, to: &StationId) -> Option<u32> {
        self.connections.get(&(from.clone(), to.clone())).copied()
    }

    pub fn is_walkable(&self, from: &StationId, to: &StationId) -> bool {
        self.get(from, to).is_some()
    }

    /// Returns the number of walkable pairs (counting A→B and B→A as one).
    pub fn len(&self) -> usize {
        self.connections.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl FromIterator<NeighbourRecord> for Neighbours {
    fn from_iter<I: IntoIterator<Item = NeighbourRecord>>(iter: I) -> Self {
        let mut neighbours = Neighbours::new();
        for record in iter {
            neighbours.add(record.from, record.to, record.minutes);
        }
        neighbours
    }
}

impl NeighbourLookup for Neighbours {
    fn are_neighbours(&self, a: &LocationSet, b: &LocationSet) -> bool {
        a.iter()
            .any(|from| b.iter().any(|to| from != to && self.is_walkable(from, to)))
    }
}

/// Builder for creating neighbours from string ids.
#[derive(Debug, Default)]
pub struct NeighboursBuilder {
    inner: Neighbours,
}

impl NeighboursBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a walkable connection. Empty ids are ignored.
    pub fn add(mut self, from: &str, to: &str, minutes: u32) -> Self {
        if let (Ok(from), Ok(to)) = (StationId::new(from), StationId::new(to)) {
            self.inner.add(from, to, minutes);
        }
        self
    }

    pub fn build(self) -> Neighbours {
        self.inner
    }
}
