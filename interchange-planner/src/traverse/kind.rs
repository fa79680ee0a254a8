//! Traversal state kinds and the transitions allowed between them.
//!
//! The table is built once and shared by reference with every search. Asking
//! it for a transition it does not hold is a defect in the graph or the
//! traversal, never a "no journey" outcome.

use std::fmt;

use super::TraversalError;

/// The stage of a journey a traversal state represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StateKind {
    NotStarted,
    Walking,
    GroupedStation,
    PlatformStation,
    NoPlatformStation,
    TramStation,
    Platform,
    JustBoarded,
    Service,
    Hour,
    Minute,
    RouteStationOnTrip,
    RouteStationEndTrip,
    Destination,
}

const STATIONS: [StateKind; 3] = [
    StateKind::PlatformStation,
    StateKind::NoPlatformStation,
    StateKind::TramStation,
];

impl StateKind {
    pub const ALL: [StateKind; 14] = [
        StateKind::NotStarted,
        StateKind::Walking,
        StateKind::GroupedStation,
        StateKind::PlatformStation,
        StateKind::NoPlatformStation,
        StateKind::TramStation,
        StateKind::Platform,
        StateKind::JustBoarded,
        StateKind::Service,
        StateKind::Hour,
        StateKind::Minute,
        StateKind::RouteStationOnTrip,
        StateKind::RouteStationEndTrip,
        StateKind::Destination,
    ];

    fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Returns true for the three station kinds.
    pub fn is_station(self) -> bool {
        STATIONS.contains(&self)
    }

    /// The standard successors of each kind.
    fn standard_successors(self) -> Vec<StateKind> {
        use StateKind::*;

        let mut next = match self {
            NotStarted => vec![Walking, GroupedStation, Destination],
            Walking => vec![GroupedStation, Destination],
            PlatformStation => vec![Platform, Walking, GroupedStation, Destination],
            NoPlatformStation | TramStation => {
                vec![JustBoarded, Walking, GroupedStation, Destination]
            }
            GroupedStation => vec![Destination],
            Platform => vec![JustBoarded, PlatformStation, Destination],
            JustBoarded => vec![Service],
            Service => vec![Hour],
            Hour => vec![Minute],
            Minute => vec![RouteStationOnTrip, RouteStationEndTrip],
            RouteStationOnTrip => vec![Service, Platform, NoPlatformStation, TramStation, Destination],
            RouteStationEndTrip => vec![Platform, NoPlatformStation, TramStation, Destination],
            Destination => vec![],
        };
        if matches!(
            self,
            NotStarted | Walking | GroupedStation | PlatformStation | NoPlatformStation | TramStation
        ) {
            next.extend(STATIONS);
        }
        next
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The legal `from -> to` transitions between state kinds.
#[derive(Clone, PartialEq, Eq)]
pub struct TransitionTable {
    allowed: [u16; StateKind::ALL.len()],
}

impl TransitionTable {
    /// A table with no transitions.
    pub fn empty() -> Self {
        Self {
            allowed: [0; StateKind::ALL.len()],
        }
    }

    /// The transitions of a complete journey through the network.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for from in StateKind::ALL {
            for to in from.standard_successors() {
                table.register(from, to);
            }
        }
        table
    }

    pub fn register(&mut self, from: StateKind, to: StateKind) {
        self.allowed[from as usize] |= to.bit();
    }

    pub fn allows(&self, from: StateKind, to: StateKind) -> bool {
        self.allowed[from as usize] & to.bit() != 0
    }

    /// Fails with [`TraversalError::IllegalTransition`] unless `from -> to`
    /// is registered.
    pub fn check(&self, from: StateKind, to: StateKind) -> Result<(), TraversalError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(TraversalError::IllegalTransition { from, to })
        }
    }

    pub fn successors(&self, from: StateKind) -> impl Iterator<Item = StateKind> + '_ {
        StateKind::ALL
            .into_iter()
            .filter(move |to| self.allows(from, *to))
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for from in StateKind::ALL {
            map.entry(&from, &self.successors(from).collect::<Vec<_>>());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StateKind::*;

    #[test]
    fn documented_transitions_are_registered() {
        let table = TransitionTable::standard();
        let expected = [
            (NotStarted, Walking),
            (NotStarted, GroupedStation),
            (NotStarted, PlatformStation),
            (NotStarted, NoPlatformStation),
            (Walking, PlatformStation),
            (Walking, NoPlatformStation),
            (Walking, Destination),
            (PlatformStation, NoPlatformStation),
            (TramStation, PlatformStation),
            (PlatformStation, Platform),
            (NoPlatformStation, JustBoarded),
            (TramStation, Walking),
            (TramStation, GroupedStation),
            (Platform, JustBoarded),
            (JustBoarded, Service),
            (Service, Hour),
            (Hour, Minute),
            (Minute, RouteStationOnTrip),
            (Minute, RouteStationEndTrip),
            (RouteStationOnTrip, Platform),
            (RouteStationEndTrip, NoPlatformStation),
            (RouteStationEndTrip, TramStation),
            (RouteStationOnTrip, Destination),
            (RouteStationOnTrip, Service),
        ];
        for (from, to) in expected {
            assert!(table.allows(from, to), "{from} -> {to} should be allowed");
        }
    }

    #[test]
    fn unregistered_transition_fails_every_time() {
        let table = TransitionTable::standard();
        for _ in 0..3 {
            assert!(matches!(
                table.check(Service, Minute),
                Err(TraversalError::IllegalTransition {
                    from: Service,
                    to: Minute
                })
            ));
        }
        assert!(table.check(Platform, Hour).is_err());
        assert!(table.check(RouteStationEndTrip, Service).is_err());
        assert!(table.check(NoPlatformStation, Platform).is_err());
    }

    #[test]
    fn destination_is_terminal() {
        let table = TransitionTable::standard();
        assert_eq!(table.successors(Destination).count(), 0);
        for to in StateKind::ALL {
            assert!(table.check(Destination, to).is_err());
        }
    }

    #[test]
    fn empty_table_rejects_everything() {
        let table = TransitionTable::empty();
        for from in StateKind::ALL {
            for to in StateKind::ALL {
                assert!(!table.allows(from, to));
            }
        }
    }

    #[test]
    fn register_adds_single_transition() {
        let mut table = TransitionTable::empty();
        table.register(Hour, Minute);
        assert!(table.allows(Hour, Minute));
        assert!(!table.allows(Minute, Hour));
        assert_eq!(table.successors(Hour).collect::<Vec<_>>(), vec![Minute]);
    }

    #[test]
    fn station_kinds() {
        assert!(TramStation.is_station());
        assert!(!Platform.is_station());
        assert!(!GroupedStation.is_station());
    }
}
