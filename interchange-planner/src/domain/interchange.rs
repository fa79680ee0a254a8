//! Interchange stations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{RouteId, StationId, TransportMode};

/// A station where passengers can change from an arriving route to a
/// departing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeStation {
    pub station: StationId,
    /// Routes that pick passengers up here.
    pub pickup_routes: BTreeSet<RouteId>,
    /// Routes that set passengers down here.
    pub dropoff_routes: BTreeSet<RouteId>,
    #[serde(default)]
    pub pickup_modes: BTreeSet<TransportMode>,
    #[serde(default)]
    pub dropoff_modes: BTreeSet<TransportMode>,
}

impl InterchangeStation {
    pub fn new(station: StationId) -> Self {
        Self {
            station,
            pickup_routes: BTreeSet::new(),
            dropoff_routes: BTreeSet::new(),
            pickup_modes: BTreeSet::new(),
            dropoff_modes: BTreeSet::new(),
        }
    }

    pub fn with_pickup(mut self, route: RouteId, mode: TransportMode) -> Self {
        self.pickup_routes.insert(route);
        self.pickup_modes.insert(mode);
        self
    }

    pub fn with_dropoff(mut self, route: RouteId, mode: TransportMode) -> Self {
        self.dropoff_routes.insert(route);
        self.dropoff_modes.insert(mode);
        self
    }

    /// Returns true when arriving and departing vehicles differ in mode.
    pub fn is_multi_mode(&self) -> bool {
        self.pickup_modes != self.dropoff_modes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_mode_when_modes_differ() {
        let r1 = RouteId::new("R1").unwrap();
        let r2 = RouteId::new("R2").unwrap();
        let station = StationId::new("S").unwrap();

        let single = InterchangeStation::new(station.clone())
            .with_dropoff(r1.clone(), TransportMode::Tram)
            .with_pickup(r2.clone(), TransportMode::Tram);
        assert!(!single.is_multi_mode());

        let multi = InterchangeStation::new(station)
            .with_dropoff(r1, TransportMode::Bus)
            .with_pickup(r2, TransportMode::Tram);
        assert!(multi.is_multi_mode());
    }
}
