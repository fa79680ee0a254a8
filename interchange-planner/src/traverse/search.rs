//! Depth-first journey search over the transport graph.
//!
//! Each visit to a graph node creates a traversal state of the matching
//! [`StateKind`]. Entering a state checks the transition against the
//! [`TransitionTable`], updates the journey accumulator and computes the
//! outbound edges still worth following. Branches over the configured limits
//! are abandoned; defects abort the whole search with an error.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::{debug, trace, warn};

use crate::domain::{LocationSet, ServiceTime, StationId, TimeWindow, TransportMode};
use crate::graph::{Edge, EdgeId, EdgeKind, Node, NodeId, TransportGraph};
use crate::routes::{BetweenRoutesCostRepository, LowestCostsForDestRoutes};

use super::arena::{StateArena, StateHandle, Step, TraversalState};
use super::rank::{deduplicate, rank_journeys, remove_dominated};
use super::{Journey, JourneyState, SearchConfig, Stage, StateKind, TransitionTable, TraversalError};

/// Request for journey search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRequest {
    /// Node the journey starts from: a station or a query location.
    pub start: NodeId,

    /// Reaching any of these nodes, or a platform of one, ends the journey.
    pub destinations: BTreeSet<NodeId>,

    pub date: NaiveDate,

    /// Earliest time the journey may start.
    pub time: ServiceTime,
}

impl JourneyRequest {
    pub fn new(
        start: NodeId,
        destinations: impl IntoIterator<Item = NodeId>,
        date: NaiveDate,
        time: ServiceTime,
    ) -> Self {
        Self {
            start,
            destinations: destinations.into_iter().collect(),
            date,
            time,
        }
    }

    /// Request from one station to any station of `to`.
    pub fn between_stations(
        graph: &TransportGraph,
        from: &StationId,
        to: &LocationSet,
        date: NaiveDate,
        time: ServiceTime,
    ) -> Result<Self, TraversalError> {
        let node_of = |station: &StationId| {
            graph
                .station_node(station)
                .ok_or_else(|| TraversalError::UnknownStation(station.clone()))
        };
        let start = node_of(from)?;
        let destinations = to.iter().map(node_of).collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self {
            start,
            destinations,
            date,
            time,
        })
    }

    /// Validate the request against `graph`.
    pub fn validate(&self, graph: &TransportGraph) -> Result<(), TraversalError> {
        if self.destinations.is_empty() {
            return Err(TraversalError::InvalidRequest(
                "no destination given".to_string(),
            ));
        }
        for node in std::iter::once(&self.start).chain(&self.destinations) {
            if graph.node(*node).is_none() {
                return Err(TraversalError::UnknownNode(*node));
            }
        }
        Ok(())
    }

    /// Stations among the destinations, for the fewest-changes heuristic.
    fn destination_stations(&self, graph: &TransportGraph) -> LocationSet {
        self.destinations
            .iter()
            .filter_map(|node| graph.node(*node))
            .filter_map(Node::station_id)
            .cloned()
            .collect()
    }
}

/// Result of journey search.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Found journeys, ranked best-first.
    pub journeys: Vec<Journey>,

    /// Number of traversal states entered.
    pub states_explored: usize,

    /// Set when the exploration cap stopped the search early.
    pub truncated: bool,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }
}

/// Journey search over a [`TransportGraph`].
///
/// The graph, cost repository and transition table are shared read-only, so
/// any number of searches may run at once; each owns its own states.
pub struct Traverser<'a, C: BetweenRoutesCostRepository + ?Sized> {
    graph: &'a TransportGraph,
    costs: &'a C,
    table: &'a TransitionTable,
    config: &'a SearchConfig,
}

impl<'a, C: BetweenRoutesCostRepository + ?Sized> Traverser<'a, C> {
    pub fn new(
        graph: &'a TransportGraph,
        costs: &'a C,
        table: &'a TransitionTable,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            graph,
            costs,
            table,
            config,
        }
    }

    /// Search for journeys. Finding none is `Ok` with an empty result;
    /// `Err` means the graph or the wiring is broken.
    pub fn search(&self, request: &JourneyRequest) -> Result<SearchResult, TraversalError> {
        request.validate(self.graph)?;

        let window = TimeWindow::starting_at(request.time, self.config.max_journey_mins);
        let heuristic = self.costs.lowest_cost_calculator_for(
            &request.destination_stations(self.graph),
            request.date,
            &window,
        )?;
        debug!(
            start = %request.start,
            destinations = request.destinations.len(),
            destination_routes = heuristic.destination_count(),
            date = %request.date,
            time = %request.time,
            "Starting journey search"
        );

        let search = Search {
            graph: self.graph,
            table: self.table,
            config: self.config,
            request,
            heuristic: &heuristic,
            arena: StateArena::new(),
            journeys: Vec::new(),
            best: None,
        };
        let result = search.run()?;

        debug!(
            journeys = result.journeys.len(),
            states = result.states_explored,
            truncated = result.truncated,
            "Journey search finished"
        );
        Ok(result)
    }
}

/// One running search.
struct Search<'s> {
    graph: &'s TransportGraph,
    table: &'s TransitionTable,
    config: &'s SearchConfig,
    request: &'s JourneyRequest,
    heuristic: &'s LowestCostsForDestRoutes<'s>,
    arena: StateArena,
    journeys: Vec<Journey>,
    /// Elapsed minutes of the quickest journey found so far.
    best: Option<u32>,
}

/// What entering a node produced.
enum Entered {
    State(TraversalState),
    Arrived(Journey),
    Pruned,
}

impl<'s> Search<'s> {
    fn run(mut self) -> Result<SearchResult, TraversalError> {
        self.arena.push(TraversalState::new(
            StateKind::NotStarted,
            None,
            None,
            0,
            JourneyState::new(),
            vec![Step {
                edge: None,
                to: self.request.start,
                wait_mins: 0,
            }],
        ));

        let mut explored = 0;
        let mut truncated = false;
        while let Some(top) = self.arena.top() {
            if self.journeys.len() >= self.config.max_results {
                break;
            }
            let Some(step) = self.arena.get_mut(top).and_then(TraversalState::next_step) else {
                self.arena.pop();
                continue;
            };
            let Some(from) = self.arena.get(top) else {
                break;
            };
            if explored >= self.config.max_states {
                warn!(
                    states = explored,
                    found = self.journeys.len(),
                    "Exploration cap reached, stopping search"
                );
                truncated = true;
                break;
            }
            explored += 1;

            match self.enter(top, from, step)? {
                Entered::State(state) => {
                    self.arena.push(state);
                }
                Entered::Arrived(journey) => {
                    let elapsed = journey
                        .arrival_time()
                        .minutes_since(self.request.time)
                        .unwrap_or(0);
                    self.best = Some(self.best.map_or(elapsed, |best| best.min(elapsed)));
                    trace!(%journey, "Reached destination");
                    self.journeys.push(journey);
                }
                Entered::Pruned => {}
            }
        }

        let journeys = remove_dominated(self.journeys);
        let journeys = deduplicate(journeys);
        let mut journeys = rank_journeys(journeys);
        journeys.truncate(self.config.max_results);

        Ok(SearchResult {
            journeys,
            states_explored: explored,
            truncated,
        })
    }

    fn node(&self, id: NodeId) -> Result<&'s Node, TraversalError> {
        self.graph.node(id).ok_or(TraversalError::UnknownNode(id))
    }

    fn edge(&self, id: EdgeId) -> Result<&'s Edge, TraversalError> {
        self.graph.edge(id).ok_or(TraversalError::UnknownEdge(id))
    }

    /// Follow `step` out of the state at `parent`.
    fn enter(
        &self,
        parent: StateHandle,
        from: &TraversalState,
        step: Step,
    ) -> Result<Entered, TraversalError> {
        let node = self.node(step.to)?;
        let edge = step.edge.map(|id| self.edge(id)).transpose()?;

        let kind = self.kind_for(from.kind, &from.journey, step.to, node);
        self.table.check(from.kind, kind)?;

        let mut journey = from.journey.clone();
        let cost = step.wait_mins + edge.map_or(0, |edge| edge.cost_mins);
        journey.add_cost(cost);
        if let Some(edge) = edge {
            if edge.kind.is_walk() {
                journey.begin_walk(edge.cost_mins);
            }
            if edge.kind.is_depart() {
                journey.alight();
            }
        }
        if journey.is_walking() && kind != StateKind::Walking {
            journey.end_walk();
        }
        if let Node::Minute { time, trip } = node {
            journey.board(trip, *time);
        }

        if journey.elapsed_mins() > self.config.max_journey_mins
            || journey.changes() > self.config.max_changes
            || (self.config.prune_longer_than_best
                && self.best.is_some_and(|best| journey.elapsed_mins() > best))
        {
            trace!(node = %step.to, %kind, elapsed = journey.elapsed_mins(), "Pruned");
            return Ok(Entered::Pruned);
        }

        trace!(
            node = %step.to,
            %kind,
            from = %from.kind,
            elapsed = journey.elapsed_mins(),
            changes = journey.changes(),
            "Entered state"
        );

        if kind == StateKind::Destination {
            let mut stages: Vec<Stage> = self
                .arena
                .ancestry(parent)
                .filter_map(|state| {
                    state.node.map(|node| Stage {
                        kind: state.kind,
                        node,
                        at: self.request.time + state.total_cost,
                    })
                })
                .collect();
            stages.reverse();
            stages.push(Stage {
                kind,
                node: step.to,
                at: journey.now(self.request.time),
            });
            return Ok(Entered::Arrived(Journey::new(
                self.request.time,
                &journey,
                stages,
            )));
        }

        let candidates = self.candidates(parent, from.node, kind, step.to, node, &journey)?;
        Ok(Entered::State(TraversalState::new(
            kind,
            Some(step.to),
            Some(parent),
            cost,
            journey,
            candidates,
        )))
    }

    fn is_destination(&self, id: NodeId, node: &Node) -> bool {
        if self.request.destinations.contains(&id) {
            return true;
        }
        match node {
            Node::Platform { station, .. } => self
                .graph
                .station_node(station)
                .is_some_and(|parent| self.request.destinations.contains(&parent)),
            _ => false,
        }
    }

    fn kind_for(&self, from: StateKind, journey: &JourneyState, id: NodeId, node: &Node) -> StateKind {
        if self.is_destination(id, node) {
            return StateKind::Destination;
        }
        match node {
            Node::Station { station, .. } => {
                if self.graph.has_platforms(id) {
                    StateKind::PlatformStation
                } else if station.serves(TransportMode::Tram) {
                    StateKind::TramStation
                } else {
                    StateKind::NoPlatformStation
                }
            }
            Node::GroupedStation { .. } => StateKind::GroupedStation,
            Node::Query { .. } => StateKind::Walking,
            Node::Platform { .. } => StateKind::Platform,
            Node::RouteStation { .. } if from == StateKind::Minute => {
                if self.trip_continues(id, journey) {
                    StateKind::RouteStationOnTrip
                } else {
                    StateKind::RouteStationEndTrip
                }
            }
            Node::RouteStation { .. } => StateKind::JustBoarded,
            Node::Service { .. } => StateKind::Service,
            Node::Hour { .. } => StateKind::Hour,
            Node::Minute { .. } => StateKind::Minute,
        }
    }

    /// Returns true if the boarded trip calls at `route_station` again.
    fn trip_continues(&self, route_station: NodeId, journey: &JourneyState) -> bool {
        let Some(trip) = journey.current_trip() else {
            return false;
        };
        self.outgoing(route_station)
            .any(|(_, edge)| edge.kind == EdgeKind::ToService && edge.carries(trip))
    }

    fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &'s Edge)> + '_ {
        let graph = self.graph;
        graph
            .outgoing(node)
            .iter()
            .filter_map(move |id| graph.edge(*id).map(|edge| (*id, edge)))
    }

    fn is_closed(&self, node: NodeId) -> bool {
        let date = self.request.date;
        match self.graph.node(node) {
            Some(Node::Platform { station, .. }) => self
                .graph
                .station_node(station)
                .and_then(|id| self.graph.node(id))
                .is_some_and(|parent| parent.is_closed_on(date)),
            Some(other) => other.is_closed_on(date),
            None => false,
        }
    }

    /// Outbound edges worth following from a newly entered state.
    fn candidates(
        &self,
        parent: StateHandle,
        came_from: Option<NodeId>,
        kind: StateKind,
        id: NodeId,
        node: &Node,
        journey: &JourneyState,
    ) -> Result<Vec<Step>, TraversalError> {
        let visited: HashSet<NodeId> = self
            .arena
            .ancestry(parent)
            .filter_map(|state| state.node)
            .chain(std::iter::once(id))
            .collect();
        let now = journey.now(self.request.time);

        let mut steps = Vec::new();
        for (edge_id, edge) in self.outgoing(id) {
            if !self.follows(kind, edge, journey) {
                continue;
            }
            if Some(edge.to) == came_from
                || !edge.is_active_on(self.request.date)
                || self.is_closed(edge.to)
            {
                continue;
            }
            let target = self.node(edge.to)?;
            if target.is_place() && visited.contains(&edge.to) {
                continue;
            }

            let mut wait_mins = 0;
            match (kind, target) {
                (StateKind::Service, Node::Hour { hour }) => {
                    let limit = now + self.config.wait_limit_mins(journey.boardings());
                    if hour * 60 + 59 < now.minutes() || hour * 60 > limit.minutes() {
                        continue;
                    }
                }
                (StateKind::Hour, Node::Minute { time, trip }) => {
                    let Some(wait) = time.minutes_since(now) else {
                        continue;
                    };
                    match journey.current_trip() {
                        Some(current) if current != trip => continue,
                        Some(_) => {}
                        None if wait > self.config.wait_limit_mins(journey.boardings()) => continue,
                        None => {}
                    }
                    wait_mins = wait;
                }
                _ => {}
            }
            steps.push(Step {
                edge: Some(edge_id),
                to: edge.to,
                wait_mins,
            });
        }

        if kind == StateKind::Service {
            self.require_running(node, &mut steps)?;
        }
        if matches!(
            kind,
            StateKind::Platform | StateKind::NoPlatformStation | StateKind::TramStation
        ) {
            steps = self.order_boarding(steps)?;
        }
        if matches!(kind, StateKind::RouteStationOnTrip | StateKind::RouteStationEndTrip)
            && self.config.interchanges_only
        {
            steps.retain(|step| self.may_alight(step));
        }
        Ok(steps)
    }

    /// Edge kinds each state follows.
    fn follows(&self, kind: StateKind, edge: &Edge, journey: &JourneyState) -> bool {
        use EdgeKind::*;

        let station_exits = matches!(edge.kind, Neighbour | Diversion | WalksFrom | GroupedToParent);
        match kind {
            StateKind::Walking => edge.kind == WalksTo,
            StateKind::PlatformStation => edge.kind == EnterPlatform || station_exits,
            StateKind::NoPlatformStation | StateKind::TramStation => {
                (edge.kind.is_board() && self.may_board(journey)) || station_exits
            }
            StateKind::GroupedStation => edge.kind == GroupedToChild,
            StateKind::Platform => {
                (edge.kind.is_board() && self.may_board(journey)) || edge.kind == LeavePlatform
            }
            StateKind::JustBoarded => edge.kind == ToService,
            StateKind::Service => edge.kind == ToHour,
            StateKind::Hour => edge.kind == ToMinute,
            StateKind::Minute => matches!(edge.kind, GoesTo(_)),
            StateKind::RouteStationOnTrip => {
                edge.kind.is_depart()
                    || (edge.kind == ToService
                        && journey.current_trip().is_some_and(|trip| edge.carries(trip)))
            }
            StateKind::RouteStationEndTrip => edge.kind.is_depart(),
            StateKind::NotStarted | StateKind::Destination => false,
        }
    }

    /// Boarding again must leave the change count within bounds.
    fn may_board(&self, journey: &JourneyState) -> bool {
        journey.boardings() <= self.config.max_changes
    }

    /// With `interchanges_only`, a plain departure is only taken at the
    /// destination.
    fn may_alight(&self, step: &Step) -> bool {
        let plain_depart = step
            .edge
            .and_then(|id| self.graph.edge(id))
            .is_some_and(|edge| edge.kind == EdgeKind::Depart);
        !plain_depart
            || self
                .graph
                .node(step.to)
                .is_some_and(|node| self.is_destination(step.to, node))
    }

    /// Service states need a calendar; services not running on the date have
    /// nowhere to go.
    fn require_running(&self, node: &Node, steps: &mut Vec<Step>) -> Result<(), TraversalError> {
        if let Node::Service {
            service, calendar, ..
        } = node
        {
            let calendar = calendar.as_ref().ok_or_else(|| TraversalError::MissingCalendar {
                service: service.clone(),
            })?;
            if !calendar.runs_on(self.request.date) {
                steps.clear();
            }
        }
        Ok(())
    }

    /// Boarding edges first, closest routes to the destination leading, then
    /// everything else in graph order.
    fn order_boarding(&self, steps: Vec<Step>) -> Result<Vec<Step>, TraversalError> {
        let mut boards = Vec::new();
        let mut others = Vec::new();
        for step in steps {
            let is_board = step
                .edge
                .and_then(|id| self.graph.edge(id))
                .is_some_and(|edge| edge.kind.is_board());
            match self.graph.node(step.to) {
                Some(Node::RouteStation { route, .. }) if is_board => boards.push((route, step)),
                _ => others.push(step),
            }
        }
        let boards = self
            .heuristic
            .sort_by_fewest_changes(boards, |(route, _)| *route)?;
        Ok(boards
            .into_iter()
            .map(|(_, step)| step)
            .chain(others)
            .collect())
    }
}
