//! Graph nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Calendar, DateRange, PlatformId, RouteId, ServiceId, ServiceTime, Station, StationId, TripId,
    TransportMode,
};

/// Position of a node in its [`TransportGraph`](super::TransportGraph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A node of the transport network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// A physical stop.
    Station {
        station: Station,
        /// Dates on which the station is closed.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        closed: Vec<DateRange>,
    },

    /// Several nearby stations treated as one place.
    GroupedStation { group: StationId, name: String },

    /// A platform within a station.
    Platform {
        platform: PlatformId,
        station: StationId,
    },

    /// A route calling at a station.
    RouteStation {
        route: RouteId,
        station: StationId,
        mode: TransportMode,
    },

    /// A service running on a route, as seen from one route station.
    Service {
        service: ServiceId,
        route: RouteId,
        /// Missing calendars are a data defect found during traversal.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        calendar: Option<Calendar>,
    },

    /// Departures of a service within one hour.
    Hour { hour: u32 },

    /// A single departure of a trip.
    Minute { time: ServiceTime, trip: TripId },

    /// A location that is not a stop, joined to nearby stations by walks.
    Query { name: String },
}

impl Node {
    /// Short name of the node type, for logs and errors.
    pub fn label(&self) -> &'static str {
        match self {
            Node::Station { .. } => "station",
            Node::GroupedStation { .. } => "grouped station",
            Node::Platform { .. } => "platform",
            Node::RouteStation { .. } => "route station",
            Node::Service { .. } => "service",
            Node::Hour { .. } => "hour",
            Node::Minute { .. } => "minute",
            Node::Query { .. } => "query",
        }
    }

    /// The station this node belongs to, if any.
    pub fn station_id(&self) -> Option<&StationId> {
        match self {
            Node::Station { station, .. } => Some(&station.id),
            Node::Platform { station, .. } | Node::RouteStation { station, .. } => Some(station),
            _ => None,
        }
    }

    /// Returns true if this is a station closed on `date`.
    pub fn is_closed_on(&self, date: chrono::NaiveDate) -> bool {
        match self {
            Node::Station { closed, .. } => closed.iter().any(|range| range.contains(date)),
            _ => false,
        }
    }

    /// Nodes that may appear at most once on a journey's path.
    pub fn is_place(&self) -> bool {
        matches!(
            self,
            Node::Station { .. }
                | Node::Platform { .. }
                | Node::RouteStation { .. }
                | Node::Query { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn station(closed: Vec<DateRange>) -> Node {
        Node::Station {
            station: Station::new(StationId::new("ALT").unwrap(), "Altrincham", &[TransportMode::Tram]),
            closed,
        }
    }

    #[test]
    fn closures_by_date() {
        let node = station(vec![DateRange::new(date(10), date(12)).unwrap()]);
        assert!(node.is_closed_on(date(11)));
        assert!(!node.is_closed_on(date(13)));
        assert!(!station(vec![]).is_closed_on(date(11)));
    }

    #[test]
    fn station_ids() {
        let platform = Node::Platform {
            platform: PlatformId::new("ALT1").unwrap(),
            station: StationId::new("ALT").unwrap(),
        };
        assert_eq!(platform.station_id().unwrap().as_str(), "ALT");
        assert!(Node::Hour { hour: 8 }.station_id().is_none());
        assert!(platform.is_place());
        assert!(!Node::Hour { hour: 8 }.is_place());
    }

    #[test]
    fn serde_tagged() {
        let node = Node::Minute {
            time: ServiceTime::of(8, 15).unwrap(),
            trip: TripId::new("T1").unwrap(),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, r#"{"kind":"minute","time":"08:15","trip":"T1"}"#);
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
