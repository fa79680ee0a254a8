//! The transport network graph.
//!
//! Stations connect to platforms, platforms to route stations, and route
//! stations to services, hours and minutes. A departure at a minute node
//! travels to the next route station of its trip. The traversal reads the
//! graph and never mutates it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Edge, EdgeId, EdgeKind, Node, NodeId};
use crate::domain::{
    Calendar, DateRange, PlatformId, RouteId, ServiceId, ServiceTime, Station, StationId,
    TransportMode, TripId,
};

/// Errors from building or loading a graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge refers to a node that does not exist
    #[error("edge refers to unknown node {0}")]
    UnknownNode(NodeId),

    /// A station id has no station node
    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// A route does not call at a station
    #[error("route {route} does not call at {station}")]
    UnknownRouteStation { route: RouteId, station: StationId },

    /// Two station nodes share an id
    #[error("station {0} appears more than once")]
    DuplicateStation(StationId),

    /// A trip needs at least two calls in time order
    #[error("trip {trip} is invalid: {reason}")]
    InvalidTrip { trip: TripId, reason: &'static str },
}

/// Serialisable form of a [`TransportGraph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphRecords {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Adjacency-list graph of the network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRecords", into = "GraphRecords")]
pub struct TransportGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    stations: HashMap<StationId, NodeId>,
    route_stations: HashMap<(RouteId, StationId), NodeId>,
    services: HashMap<(ServiceId, NodeId), NodeId>,
    hours: HashMap<(NodeId, u32), NodeId>,
    queries: HashMap<String, NodeId>,
}

impl TryFrom<GraphRecords> for TransportGraph {
    type Error = GraphError;

    fn try_from(records: GraphRecords) -> Result<Self, Self::Error> {
        let mut graph = TransportGraph::new();
        for node in records.nodes {
            if let Node::Station { station, .. } = &node
                && graph.stations.contains_key(&station.id)
            {
                return Err(GraphError::DuplicateStation(station.id.clone()));
            }
            graph.push_node(node);
        }
        for edge in records.edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

impl From<TransportGraph> for GraphRecords {
    fn from(graph: TransportGraph) -> Self {
        GraphRecords {
            nodes: graph.nodes,
            edges: graph.edges,
        }
    }
}

impl TransportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Outbound edges of `node`, in insertion order.
    pub fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn station_node(&self, station: &StationId) -> Option<NodeId> {
        self.stations.get(station).copied()
    }

    pub fn route_station_node(&self, route: &RouteId, station: &StationId) -> Option<NodeId> {
        self.route_stations
            .get(&(route.clone(), station.clone()))
            .copied()
    }

    pub fn query_node(&self, name: &str) -> Option<NodeId> {
        self.queries.get(name).copied()
    }

    /// Returns true if `node` has platforms to enter.
    pub fn has_platforms(&self, node: NodeId) -> bool {
        self.edges_of_kind(node, EdgeKind::EnterPlatform).next().is_some()
    }

    fn edges_of_kind(&self, node: NodeId, kind: EdgeKind) -> impl Iterator<Item = &Edge> + '_ {
        self.outgoing(node)
            .iter()
            .filter_map(|id| self.edge(*id))
            .filter(move |edge| edge.kind == kind)
    }

    /// Targets of edges of `kind` leaving `node`.
    pub fn targets(&self, node: NodeId, kind: EdgeKind) -> Vec<NodeId> {
        self.edges_of_kind(node, kind).map(|edge| edge.to).collect()
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        match &node {
            Node::Station { station, .. } => {
                self.stations.insert(station.id.clone(), id);
            }
            Node::RouteStation { route, station, .. } => {
                self.route_stations
                    .insert((route.clone(), station.clone()), id);
            }
            Node::Query { name } => {
                self.queries.insert(name.clone(), id);
            }
            _ => {}
        }
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        id
    }

    /// Add an edge between existing nodes.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        for node in [edge.from, edge.to] {
            if node.index() >= self.nodes.len() {
                return Err(GraphError::UnknownNode(node));
            }
        }
        let id = EdgeId(self.edges.len() as u32);
        self.outgoing[edge.from.index()].push(id);
        self.edges.push(edge);
        Ok(id)
    }

    /// Add a station, or return the existing node for its id.
    pub fn add_station(&mut self, station: Station) -> NodeId {
        match self.stations.get(&station.id) {
            Some(&id) => id,
            None => self.push_node(Node::Station {
                station,
                closed: Vec::new(),
            }),
        }
    }

    fn require_station(&self, station: &StationId) -> Result<NodeId, GraphError> {
        self.station_node(station)
            .ok_or_else(|| GraphError::UnknownStation(station.clone()))
    }

    /// Mark a station closed over `range`.
    pub fn close_station(&mut self, station: &StationId, range: DateRange) -> Result<(), GraphError> {
        let id = self.require_station(station)?;
        if let Some(Node::Station { closed, .. }) = self.nodes.get_mut(id.index()) {
            closed.push(range);
        }
        Ok(())
    }

    /// Add a platform to a station, with edges both ways.
    pub fn add_platform(
        &mut self,
        station: &StationId,
        platform: PlatformId,
        walk_mins: u32,
    ) -> Result<NodeId, GraphError> {
        let station_node = self.require_station(station)?;
        let node = self.push_node(Node::Platform {
            platform,
            station: station.clone(),
        });
        self.add_edge(Edge::new(station_node, node, EdgeKind::EnterPlatform).cost(walk_mins))?;
        self.add_edge(Edge::new(node, station_node, EdgeKind::LeavePlatform).cost(walk_mins))?;
        Ok(node)
    }

    /// Add a route calling at a station. Boarding and departing edges join
    /// it to every platform of the station, or to the station itself when it
    /// has none.
    pub fn add_route_station(
        &mut self,
        route: &RouteId,
        station: &StationId,
        mode: TransportMode,
        interchange: bool,
    ) -> Result<NodeId, GraphError> {
        if let Some(existing) = self.route_station_node(route, station) {
            return Ok(existing);
        }
        let station_node = self.require_station(station)?;
        let node = self.push_node(Node::RouteStation {
            route: route.clone(),
            station: station.clone(),
            mode,
        });

        let (board, depart) = if interchange {
            (EdgeKind::InterchangeBoard, EdgeKind::InterchangeDepart)
        } else {
            (EdgeKind::Board, EdgeKind::Depart)
        };
        let mut stops = self.targets(station_node, EdgeKind::EnterPlatform);
        if stops.is_empty() {
            stops.push(station_node);
        }
        for stop in stops {
            self.add_edge(Edge::new(stop, node, board))?;
            self.add_edge(Edge::new(node, stop, depart))?;
        }
        Ok(node)
    }

    /// Add one trip of `service` along `route`, calling at each station in
    /// `calls` at the given departure times. Route stations must exist.
    pub fn add_trip(
        &mut self,
        trip: &TripId,
        service: &ServiceId,
        route: &RouteId,
        calendar: Option<&Calendar>,
        calls: &[(StationId, ServiceTime)],
    ) -> Result<(), GraphError> {
        let invalid = |reason| GraphError::InvalidTrip {
            trip: trip.clone(),
            reason,
        };
        if calls.len() < 2 {
            return Err(invalid("fewer than two calls"));
        }

        let mut stops = Vec::with_capacity(calls.len());
        for (station, _) in calls {
            let node = self.route_station_node(route, station).ok_or_else(|| {
                GraphError::UnknownRouteStation {
                    route: route.clone(),
                    station: station.clone(),
                }
            })?;
            stops.push(node);
        }

        for (leg, pair) in calls.windows(2).enumerate() {
            let ((_, depart), (_, arrive)) = (&pair[0], &pair[1]);
            let travel = arrive
                .minutes_since(*depart)
                .ok_or_else(|| invalid("calls out of time order"))?;
            let (here, next) = (stops[leg], stops[leg + 1]);
            let mode = match self.node(here) {
                Some(Node::RouteStation { mode, .. }) => *mode,
                _ => TransportMode::Bus,
            };

            let service_node = self.service_node(here, service, route, calendar, trip)?;
            let hour_node = self.hour_node(service_node, depart.hour())?;
            let minute = self.push_node(Node::Minute {
                time: *depart,
                trip: trip.clone(),
            });
            self.add_edge(Edge::new(hour_node, minute, EdgeKind::ToMinute))?;
            self.add_edge(
                Edge::new(minute, next, EdgeKind::GoesTo(mode))
                    .cost(travel)
                    .trip(trip.clone()),
            )?;
        }
        Ok(())
    }

    fn service_node(
        &mut self,
        route_station: NodeId,
        service: &ServiceId,
        route: &RouteId,
        calendar: Option<&Calendar>,
        trip: &TripId,
    ) -> Result<NodeId, GraphError> {
        let key = (service.clone(), route_station);
        if let Some(&node) = self.services.get(&key) {
            // Record the trip on the existing ToService edge.
            for id in &self.outgoing[route_station.index()] {
                let edge = &mut self.edges[id.index()];
                if edge.kind == EdgeKind::ToService && edge.to == node {
                    edge.trips.insert(trip.clone());
                }
            }
            return Ok(node);
        }

        let node = self.push_node(Node::Service {
            service: service.clone(),
            route: route.clone(),
            calendar: calendar.cloned(),
        });
        self.services.insert(key, node);
        self.add_edge(Edge::new(route_station, node, EdgeKind::ToService).trip(trip.clone()))?;
        Ok(node)
    }

    fn hour_node(&mut self, service_node: NodeId, hour: u32) -> Result<NodeId, GraphError> {
        if let Some(&node) = self.hours.get(&(service_node, hour)) {
            return Ok(node);
        }
        let node = self.push_node(Node::Hour { hour });
        self.hours.insert((service_node, hour), node);
        self.add_edge(Edge::new(service_node, node, EdgeKind::ToHour))?;
        Ok(node)
    }

    /// Walking link between two stations, both ways.
    pub fn add_neighbours(
        &mut self,
        first: &StationId,
        second: &StationId,
        minutes: u32,
    ) -> Result<(), GraphError> {
        let a = self.require_station(first)?;
        let b = self.require_station(second)?;
        self.add_edge(Edge::new(a, b, EdgeKind::Neighbour).cost(minutes))?;
        self.add_edge(Edge::new(b, a, EdgeKind::Neighbour).cost(minutes))?;
        Ok(())
    }

    /// Add a query location, or return the existing node with that name.
    pub fn add_query(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        match self.queries.get(&name) {
            Some(&id) => id,
            None => self.push_node(Node::Query { name }),
        }
    }

    /// Walk between a query location and a station, both ways.
    pub fn add_walk(&mut self, query: NodeId, station: &StationId, minutes: u32) -> Result<(), GraphError> {
        let station_node = self.require_station(station)?;
        self.add_edge(Edge::new(query, station_node, EdgeKind::WalksTo).cost(minutes))?;
        self.add_edge(Edge::new(station_node, query, EdgeKind::WalksFrom).cost(minutes))?;
        Ok(())
    }

    /// Group stations under one parent node.
    pub fn add_group(
        &mut self,
        group: StationId,
        name: impl Into<String>,
        children: &[StationId],
    ) -> Result<NodeId, GraphError> {
        let nodes = children
            .iter()
            .map(|child| self.require_station(child))
            .collect::<Result<Vec<_>, _>>()?;
        let parent = self.push_node(Node::GroupedStation {
            group,
            name: name.into(),
        });
        for child in nodes {
            self.add_edge(Edge::new(parent, child, EdgeKind::GroupedToChild))?;
            self.add_edge(Edge::new(child, parent, EdgeKind::GroupedToParent))?;
        }
        Ok(parent)
    }

    /// Temporary walking link from one station to another, present only on
    /// dates within `active`.
    pub fn add_diversion(
        &mut self,
        from: &StationId,
        to: &StationId,
        minutes: u32,
        active: DateRange,
    ) -> Result<EdgeId, GraphError> {
        let a = self.require_station(from)?;
        let b = self.require_station(to)?;
        self.add_edge(
            Edge::new(a, b, EdgeKind::Diversion)
                .cost(minutes)
                .active(active),
        )
    }
}
