//! Route-to-route cost repository.
//!
//! The public query surface over the cost matrix: change counts between two
//! sets of locations, and a per-destination heuristic for ordering the search.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    CostError, DEFAULT_MAX_DEPTH, LowestCostsForDestRoutes, RouteCostMatrix, RouteIndex,
    RouteIndexCache,
};
use crate::availability::StationAvailability;
use crate::domain::{LocationSet, TimeWindow};
use crate::transport::{InterchangeSource, RouteSource};
use crate::walkable::NeighbourLookup;

/// Minimum and maximum number of changes between two sets of locations.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberOfChanges {
    min: u32,
    max: u32,
}

impl NumberOfChanges {
    const INFINITE: u32 = u32::MAX;

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// No path between the locations.
    pub const fn none() -> Self {
        Self::new(Self::INFINITE, Self::INFINITE)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    /// Returns true if there is no path.
    pub fn is_none(&self) -> bool {
        self.min == Self::INFINITE
    }
}

impl fmt::Debug for NumberOfChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumberOfChanges({self})")
    }
}

impl fmt::Display for NumberOfChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "none")
        } else {
            write!(f, "{}..{}", self.min, self.max)
        }
    }
}

/// Change counts between locations, and the heuristic built from them.
pub trait BetweenRoutesCostRepository {
    /// Min and max changes between routes picking up at `start` and routes
    /// setting down at `destination` on `date` within `window`.
    fn changes_between(
        &self,
        start: &LocationSet,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<NumberOfChanges, CostError>;

    /// A fewest-changes lookup towards the routes setting down at
    /// `destination`.
    fn lowest_cost_calculator_for(
        &self,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<LowestCostsForDestRoutes<'_>, CostError>;
}

/// Settings for building the cost matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Maximum number of changes recorded in the matrix.
    pub max_depth: u8,

    /// Where to persist the route index. No caching if unset.
    pub index_cache_path: Option<PathBuf>,
}

impl CostConfig {
    pub fn new(max_depth: u8, index_cache_path: Option<PathBuf>) -> Self {
        Self {
            max_depth,
            index_cache_path,
        }
    }

    pub fn index_cache(&self) -> Option<RouteIndexCache> {
        self.index_cache_path.as_ref().map(RouteIndexCache::new)
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            index_cache_path: None,
        }
    }
}

/// [`BetweenRoutesCostRepository`] over a precomputed [`RouteCostMatrix`].
#[derive(Debug)]
pub struct RouteToRouteCosts<A, N> {
    matrix: RouteCostMatrix,
    availability: A,
    neighbours: N,
}

impl<A: StationAvailability, N: NeighbourLookup> RouteToRouteCosts<A, N> {
    /// Build the matrix from `data`, loading the route index from the
    /// configured cache when there is one.
    pub fn build<S>(
        data: &S,
        availability: A,
        neighbours: N,
        config: &CostConfig,
    ) -> Result<Self, CostError>
    where
        S: RouteSource + InterchangeSource + ?Sized,
    {
        let index = match config.index_cache() {
            Some(cache) => RouteIndex::load_or_build(data, &cache)?,
            None => RouteIndex::build(data),
        };
        let matrix = RouteCostMatrix::build(index, data, config.max_depth)?;
        info!(
            routes = matrix.index().len(),
            fully_connected = matrix.is_fully_connected(),
            "Route costs ready"
        );
        Ok(Self::from_matrix(matrix, availability, neighbours))
    }

    pub fn from_matrix(matrix: RouteCostMatrix, availability: A, neighbours: N) -> Self {
        Self {
            matrix,
            availability,
            neighbours,
        }
    }

    pub fn matrix(&self) -> &RouteCostMatrix {
        &self.matrix
    }

    pub fn availability(&self) -> &A {
        &self.availability
    }

    pub fn neighbours(&self) -> &N {
        &self.neighbours
    }
}

impl<A: StationAvailability, N: NeighbourLookup> BetweenRoutesCostRepository
    for RouteToRouteCosts<A, N>
{
    fn changes_between(
        &self,
        start: &LocationSet,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<NumberOfChanges, CostError> {
        if self.neighbours.are_neighbours(start, destination) {
            debug!(?start, ?destination, "Start and destination are neighbours");
            return Ok(NumberOfChanges::new(1, 1));
        }

        let pickups = self.availability.pickup_routes(start, date, window);
        let dropoffs = self.availability.dropoff_routes(destination, date, window);
        if pickups.is_empty() || dropoffs.is_empty() {
            debug!(
                ?start,
                ?destination,
                pickups = pickups.len(),
                dropoffs = dropoffs.len(),
                %date,
                "No routes operating at start or destination"
            );
            return Ok(NumberOfChanges::none());
        }

        let index = self.matrix.index();
        let mut min = None::<u32>;
        let mut max = None::<u32>;
        for pickup in &pickups {
            for dropoff in &dropoffs {
                let pair = index.pair_for(pickup, dropoff)?;
                let Some(changes) = self
                    .matrix
                    .changes_operating(pair, &self.availability, date, window)
                else {
                    continue;
                };
                let changes = u32::from(changes);
                min = Some(min.map_or(changes, |m| m.min(changes)));
                max = Some(max.map_or(changes, |m| m.max(changes)));
            }
        }

        let result = match (min, max) {
            (Some(min), Some(max)) => NumberOfChanges::new(min, max),
            _ => NumberOfChanges::none(),
        };
        debug!(
            ?start,
            ?destination,
            %date,
            pairs = pickups.len() * dropoffs.len(),
            changes = %result,
            "Computed changes between locations"
        );
        Ok(result)
    }

    fn lowest_cost_calculator_for(
        &self,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<LowestCostsForDestRoutes<'_>, CostError> {
        let dropoffs = self.availability.dropoff_routes(destination, date, window);
        LowestCostsForDestRoutes::new(&self.matrix, &dropoffs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{AvailabilityIndex, StopActivity, StopAvailability};
    use crate::domain::{
        AgencyId, Calendar, DateRange, DaysOfWeek, InterchangeStation, Route, RouteId,
        StationId, TransportMode,
    };
    use crate::transport::TransportData;
    use crate::walkable::{Neighbours, NeighboursBuilder};
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn calendar() -> Calendar {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        Calendar::new(DaysOfWeek::ALL, DateRange::new(start, end).unwrap())
    }

    fn rid(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    fn sid(s: &str) -> StationId {
        StationId::new(s).unwrap()
    }

    fn at(s: &str) -> LocationSet {
        LocationSet::singleton(sid(s))
    }

    fn route(id: &str) -> Route {
        Route::new(rid(id), id, TransportMode::Tram, AgencyId::new("AG").unwrap(), calendar())
    }

    fn link(station: &str, from: &str, to: &str) -> InterchangeStation {
        InterchangeStation::new(sid(station))
            .with_dropoff(rid(from), TransportMode::Tram)
            .with_pickup(rid(to), TransportMode::Tram)
    }

    fn stop(station: &str, route: &str, activity: StopActivity) -> StopAvailability {
        StopAvailability {
            station: sid(station),
            route: rid(route),
            activity,
            calendar: calendar(),
            window: TimeWindow::all_day(),
        }
    }

    /// A runs START -> X, B runs X -> Y, C runs Y -> END. D runs START -> END.
    fn network() -> TransportData {
        ["A", "B", "C", "D"]
            .iter()
            .fold(TransportData::new(), |data, id| data.with_route(route(id)))
            .with_interchange(link("X", "A", "B"))
            .with_interchange(link("Y", "B", "C"))
    }

    fn availability() -> AvailabilityIndex {
        [
            stop("START", "A", StopActivity::Pickup),
            stop("START", "D", StopActivity::Pickup),
            stop("X", "A", StopActivity::Dropoff),
            stop("X", "B", StopActivity::Pickup),
            stop("Y", "B", StopActivity::Dropoff),
            stop("Y", "C", StopActivity::Pickup),
            stop("END", "C", StopActivity::Dropoff),
            stop("END", "D", StopActivity::Dropoff),
        ]
        .into_iter()
        .collect()
    }

    fn costs(neighbours: Neighbours) -> RouteToRouteCosts<AvailabilityIndex, Neighbours> {
        RouteToRouteCosts::build(&network(), availability(), neighbours, &CostConfig::default())
            .unwrap()
    }

    #[test]
    fn min_and_max_over_route_pairs() {
        let costs = costs(Neighbours::new());
        let changes = costs
            .changes_between(&at("START"), &at("END"), date(), &TimeWindow::all_day())
            .unwrap();

        // D goes direct; A needs two changes. A->D and D->C are not connected.
        assert_eq!(changes, NumberOfChanges::new(0, 2));
        assert_eq!(changes.to_string(), "0..2");
    }

    #[test]
    fn neighbours_short_circuit() {
        let neighbours = NeighboursBuilder::new().add("START", "ELSEWHERE", 4).build();
        let costs = costs(neighbours);
        let changes = costs
            .changes_between(&at("START"), &at("ELSEWHERE"), date(), &TimeWindow::all_day())
            .unwrap();
        assert_eq!(changes, NumberOfChanges::new(1, 1));
    }

    #[test]
    fn no_routes_is_none() {
        let costs = costs(Neighbours::new());
        let changes = costs
            .changes_between(&at("NOWHERE"), &at("END"), date(), &TimeWindow::all_day())
            .unwrap();
        assert!(changes.is_none());
        assert_eq!(changes, NumberOfChanges::none());
        assert_eq!(changes.to_string(), "none");
    }

    #[test]
    fn closed_interchange_makes_pair_infeasible() {
        // Without Y's pickup for C, A->C cannot be made at its minimal degree.
        let availability: AvailabilityIndex = [
            stop("START", "A", StopActivity::Pickup),
            stop("X", "A", StopActivity::Dropoff),
            stop("X", "B", StopActivity::Pickup),
            stop("Y", "B", StopActivity::Dropoff),
            stop("END", "C", StopActivity::Dropoff),
        ]
        .into_iter()
        .collect();
        let costs = RouteToRouteCosts::build(
            &network(),
            availability,
            Neighbours::new(),
            &CostConfig::default(),
        )
        .unwrap();

        let changes = costs
            .changes_between(&at("START"), &at("END"), date(), &TimeWindow::all_day())
            .unwrap();
        assert!(changes.is_none());
    }

    #[test]
    fn heuristic_for_destination() {
        let costs = costs(Neighbours::new());
        let lowest = costs
            .lowest_cost_calculator_for(&at("END"), date(), &TimeWindow::all_day())
            .unwrap();

        assert_eq!(lowest.destination_count(), 2);
        assert_eq!(lowest.fewest_changes(&rid("D")).unwrap(), 0);
        assert_eq!(lowest.fewest_changes(&rid("B")).unwrap(), 1);
        assert_eq!(lowest.fewest_changes(&rid("A")).unwrap(), 2);
    }

    #[test]
    fn build_uses_index_cache() {
        let dir = tempdir().unwrap();
        let config = CostConfig::new(3, Some(dir.path().join("index.json")));

        RouteToRouteCosts::build(&network(), availability(), Neighbours::new(), &config).unwrap();
        assert!(dir.path().join("index.json").exists());

        let stale = network().with_route(route("E"));
        let result = RouteToRouteCosts::build(&stale, availability(), Neighbours::new(), &config);
        assert!(matches!(result, Err(CostError::StaleIndexCache { .. })));
    }

    #[test]
    fn config_defaults() {
        let config = CostConfig::default();
        assert_eq!(config.max_depth, 4);
        assert!(config.index_cache().is_none());

        let parsed: CostConfig = serde_json::from_str(r#"{"max_depth": 2}"#).unwrap();
        assert_eq!(parsed.max_depth, 2);
        assert!(parsed.index_cache_path.is_none());
    }
}
