//! Graph edges.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::domain::{DateRange, TransportMode, TripId};

/// Position of an edge in its [`TransportGraph`](super::TransportGraph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub(crate) u32);

impl EdgeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// What an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Station to one of its platforms.
    EnterPlatform,
    /// Platform back to its station.
    LeavePlatform,
    /// Platform or station onto a route.
    Board,
    /// [`EdgeKind::Board`] at an interchange.
    InterchangeBoard,
    /// Route off to a platform or station.
    Depart,
    /// [`EdgeKind::Depart`] at an interchange.
    InterchangeDepart,
    /// A trip travelling from a departure to the next route station.
    GoesTo(TransportMode),
    ToService,
    ToHour,
    ToMinute,
    /// Walk between neighbouring stations.
    Neighbour,
    /// Walk from a query location to a station.
    WalksTo,
    /// Walk from a station to a query location.
    WalksFrom,
    /// Temporary station-to-station link while a route is diverted.
    Diversion,
    GroupedToParent,
    GroupedToChild,
}

impl EdgeKind {
    pub fn is_board(&self) -> bool {
        matches!(self, EdgeKind::Board | EdgeKind::InterchangeBoard)
    }

    pub fn is_depart(&self) -> bool {
        matches!(self, EdgeKind::Depart | EdgeKind::InterchangeDepart)
    }

    /// Edges travelled on foot.
    pub fn is_walk(&self) -> bool {
        matches!(
            self,
            EdgeKind::Neighbour | EdgeKind::WalksTo | EdgeKind::WalksFrom | EdgeKind::Diversion
        )
    }
}

/// A directed edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,

    /// Minutes taken to traverse the edge.
    #[serde(default)]
    pub cost_mins: u32,

    /// Trips using the edge: every trip of a service for `ToService`, the
    /// travelling trip for `GoesTo`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub trips: BTreeSet<TripId>,

    /// Dates on which the edge exists. Always present if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<DateRange>,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, kind: EdgeKind) -> Self {
        Self {
            from,
            to,
            kind,
            cost_mins: 0,
            trips: BTreeSet::new(),
            active: None,
        }
    }

    pub fn cost(mut self, minutes: u32) -> Self {
        self.cost_mins = minutes;
        self
    }

    pub fn trip(mut self, trip: TripId) -> Self {
        self.trips.insert(trip);
        self
    }

    pub fn active(mut self, range: DateRange) -> Self {
        self.active = Some(range);
        self
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active.is_none_or(|range| range.contains(date))
    }

    pub fn carries(&self, trip: &TripId) -> bool {
        self.trips.contains(trip)
    }
}
