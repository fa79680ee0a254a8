//! Stations and sets of locations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{StationId, TransportMode};

/// A stop or station that vehicles call at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub modes: BTreeSet<TransportMode>,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>, modes: &[TransportMode]) -> Self {
        Self {
            id,
            name: name.into(),
            modes: modes.iter().copied().collect(),
        }
    }

    pub fn serves(&self, mode: TransportMode) -> bool {
        self.modes.contains(&mode)
    }
}

/// A set of stations treated together as one end of a journey, for example
/// all stops around a city-centre square.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LocationSet(BTreeSet<StationId>);

impl LocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(station: StationId) -> Self {
        Self(BTreeSet::from([station]))
    }

    pub fn insert(&mut self, station: StationId) -> bool {
        self.0.insert(station)
    }

    pub fn contains(&self, station: &StationId) -> bool {
        self.0.contains(station)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the two sets share a station.
    pub fn intersects(&self, other: &LocationSet) -> bool {
        self.0.iter().any(|s| other.contains(s))
    }
}

impl FromIterator<StationId> for LocationSet {
    fn from_iter<I: IntoIterator<Item = StationId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter().map(StationId::as_str)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> StationId {
        StationId::new(s).unwrap()
    }

    #[test]
    fn station_modes() {
        let station = Station::new(id("PIC"), "Piccadilly", &[TransportMode::Tram, TransportMode::Train]);
        assert!(station.serves(TransportMode::Tram));
        assert!(!station.serves(TransportMode::Bus));
    }

    #[test]
    fn location_set_membership() {
        let set: LocationSet = [id("A"), id("B")].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&id("A")));
        assert!(set.intersects(&LocationSet::singleton(id("B"))));
        assert!(!set.intersects(&LocationSet::singleton(id("C"))));
        assert!(LocationSet::new().is_empty());
        assert_eq!(format!("{set:?}"), "{\"A\", \"B\"}");
    }
}
