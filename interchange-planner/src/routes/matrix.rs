//! Route-to-route interchange distances.
//!
//! Degree 1 holds route pairs joined by at least one interchange station.
//! Each further degree is derived from the one before by one more hop, so
//! degree `d` holds exactly the pairs whose minimum number of changes is `d`.
//! A pair is never recorded at more than one degree.

use std::collections::HashMap;
use std::time::Instant;

use chrono::NaiveDate;
use fixedbitset::FixedBitSet;
use tracing::{debug, info, warn};

use super::{
    BitMatrix, CostError, InterchangeWitnesses, RouteAndInterchanges, RouteDateOverlap,
    RouteIndex, RouteIndexPair, RoutePair,
};
use crate::availability::StationAvailability;
use crate::domain::{RouteId, TimeWindow};
use crate::transport::InterchangeSource;

/// Default maximum number of changes the matrix records.
pub const DEFAULT_MAX_DEPTH: u8 = 4;

/// A sequence of one-change steps joining two routes.
pub type Decomposition = Vec<RouteIndexPair>;

/// Minimum-change distances between every ordered pair of routes.
#[derive(Debug)]
pub struct RouteCostMatrix {
    index: RouteIndex,
    overlap: RouteDateOverlap,
    witnesses: InterchangeWitnesses,
    /// `degrees[d - 1]` holds pairs whose minimum change count is `d`.
    degrees: Vec<BitMatrix>,
    max_depth: u8,
    fully_connected: bool,
}

impl RouteCostMatrix {
    /// Build the matrix for the routes in `index` and the interchanges in
    /// `interchanges`, recording degrees up to `max_depth` (at least 1).
    pub fn build<I: InterchangeSource + ?Sized>(
        index: RouteIndex,
        interchanges: &I,
        max_depth: u8,
    ) -> Result<Self, CostError> {
        let started = Instant::now();
        let max_depth = max_depth.max(1);

        let overlap = RouteDateOverlap::build(&index)?;
        let (adjacency, witnesses) = build_adjacency(&index, &overlap, interchanges)?;
        let (degrees, fully_connected) = close_over(adjacency, &overlap, max_depth)?;

        let matrix = Self {
            index,
            overlap,
            witnesses,
            degrees,
            max_depth,
            fully_connected,
        };

        info!(
            routes = matrix.index.len(),
            degrees = matrix.degrees.len(),
            connections = ?matrix.connections_per_degree(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built route cost matrix"
        );
        if !fully_connected {
            warn!(
                max_depth,
                "Route network is not fully connected within the maximum depth"
            );
        }

        Ok(matrix)
    }

    pub fn index(&self) -> &RouteIndex {
        &self.index
    }

    pub fn overlap(&self) -> &RouteDateOverlap {
        &self.overlap
    }

    pub fn witnesses(&self) -> &InterchangeWitnesses {
        &self.witnesses
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Returns true if every pair of routes is connected within the maximum
    /// depth.
    pub fn is_fully_connected(&self) -> bool {
        self.fully_connected
    }

    /// Number of pairs recorded at each degree, starting at degree 1.
    pub fn connections_per_degree(&self) -> Vec<usize> {
        self.degrees.iter().map(BitMatrix::count).collect()
    }

    /// Minimum number of changes between the routes of `pair`.
    ///
    /// Returns `Some(0)` for the same route and `None` when the pair is not
    /// connected within the maximum depth.
    pub fn degree(&self, pair: RouteIndexPair) -> Option<u8> {
        if pair.is_same_route() {
            return Some(0);
        }
        self.degrees
            .iter()
            .position(|layer| layer.is_set(pair.first(), pair.second()))
            .map(|pos| pos as u8 + 1)
    }

    /// Smallest degree from route `from` to any route in `targets`.
    pub fn degree_to_any(&self, from: usize, targets: &FixedBitSet) -> Option<u8> {
        if targets.contains(from) {
            return Some(0);
        }
        self.degrees
            .iter()
            .position(|layer| !layer.row(from).is_disjoint(targets))
            .map(|pos| pos as u8 + 1)
    }

    /// [`RouteCostMatrix::degree`] by route id.
    pub fn degree_between(&self, first: &RouteId, second: &RouteId) -> Result<Option<u8>, CostError> {
        Ok(self.degree(self.index.pair_for(first, second)?))
    }

    /// Every decomposition of the minimal connection for `pair` into
    /// one-change steps.
    ///
    /// The same route yields a single empty decomposition; an unconnected pair
    /// yields none.
    pub fn decompositions(&self, pair: RouteIndexPair) -> Vec<Decomposition> {
        match self.degree(pair) {
            None => Vec::new(),
            Some(0) => vec![Vec::new()],
            Some(degree) => self.expand(pair, degree),
        }
    }

    fn expand(&self, pair: RouteIndexPair, degree: u8) -> Vec<Decomposition> {
        if degree == 1 {
            return vec![vec![pair]];
        }

        // Intermediates sit exactly one degree closer to `first` and reach
        // `second` with a single change.
        let mut via = self.degrees[usize::from(degree) - 2].row(pair.first()).clone();
        via.intersect_with(&self.degrees[0].column(pair.second()));

        let mut results = Vec::new();
        for middle in via.ones() {
            let last_step = RouteIndexPair::new(middle, pair.second());
            for mut prefix in self.expand(RouteIndexPair::new(pair.first(), middle), degree - 1) {
                prefix.push(last_step);
                results.push(prefix);
            }
        }
        results
    }

    /// The route pair and witnessing stations for a one-change step.
    pub fn route_and_interchanges(&self, step: RouteIndexPair) -> Option<RouteAndInterchanges> {
        let stations = self.witnesses.stations_for(&step)?;
        let first = self.index.route_at(step.first())?;
        let second = self.index.route_at(step.second())?;
        Some(RouteAndInterchanges {
            route_pair: RoutePair::new(first.id.clone(), second.id.clone()),
            interchanges: stations.clone(),
        })
    }

    /// Every decomposition for a pair of route ids, with the stations able to
    /// realise each step.
    pub fn changes_for(
        &self,
        first: &RouteId,
        second: &RouteId,
    ) -> Result<Vec<Vec<RouteAndInterchanges>>, CostError> {
        let pair = self.index.pair_for(first, second)?;
        Ok(self
            .decompositions(pair)
            .into_iter()
            .map(|steps| {
                steps
                    .into_iter()
                    .filter_map(|step| self.route_and_interchanges(step))
                    .collect()
            })
            .collect())
    }

    /// Minimum changes between the routes of `pair` on `date` within
    /// `window`, accepting only decompositions where every step has an
    /// operating interchange.
    ///
    /// When no decomposition at the minimal degree qualifies the pair is
    /// reported as unconnected; larger degrees are not tried.
    pub fn changes_operating<A: StationAvailability + ?Sized>(
        &self,
        pair: RouteIndexPair,
        availability: &A,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Option<u8> {
        let degree = self.degree(pair)?;
        if degree == 0 {
            return Some(0);
        }

        let mut check = OperatingCheck {
            availability,
            date,
            window,
            known: HashMap::new(),
        };
        let found = self.has_operating_decomposition(pair, degree, &mut check);

        if !found {
            debug!(
                first = pair.first(),
                second = pair.second(),
                degree,
                %date,
                "No operating interchanges at minimal degree"
            );
        }
        found.then_some(degree)
    }

    /// Depth-first over the decompositions of `pair` at `degree`, stopping at
    /// the first whose steps all operate. Results are memoised per pair, which
    /// is sound because every pair has a single minimal degree.
    fn has_operating_decomposition<A: StationAvailability + ?Sized>(
        &self,
        pair: RouteIndexPair,
        degree: u8,
        check: &mut OperatingCheck<'_, A>,
    ) -> bool {
        if let Some(&known) = check.known.get(&pair) {
            return known;
        }

        let operating = if degree == 1 {
            self.route_and_interchanges(pair).is_some_and(|change| {
                change.is_operating(check.availability, check.date, check.window)
            })
        } else {
            let mut via = self.degrees[usize::from(degree) - 2].row(pair.first()).clone();
            via.intersect_with(&self.degrees[0].column(pair.second()));
            via.ones().any(|middle| {
                self.has_operating_decomposition(RouteIndexPair::new(middle, pair.second()), 1, check)
                    && self.has_operating_decomposition(
                        RouteIndexPair::new(pair.first(), middle),
                        degree - 1,
                        check,
                    )
            })
        };

        check.known.insert(pair, operating);
        operating
    }
}

/// Availability query and per-pair results for one
/// [`RouteCostMatrix::changes_operating`] call.
struct OperatingCheck<'a, A: ?Sized> {
    availability: &'a A,
    date: NaiveDate,
    window: &'a TimeWindow,
    known: HashMap<RouteIndexPair, bool>,
}

/// Degree-1 connectivity: routes joined at an interchange station, masked by
/// calendar overlap.
fn build_adjacency<I: InterchangeSource + ?Sized>(
    index: &RouteIndex,
    overlap: &RouteDateOverlap,
    interchanges: &I,
) -> Result<(BitMatrix, InterchangeWitnesses), CostError> {
    let size = index.len();
    let mut adjacency = BitMatrix::new(size);
    let mut witnesses = InterchangeWitnesses::new();

    for interchange in interchanges.interchanges() {
        for dropoff in &interchange.dropoff_routes {
            let from = index.index_of(dropoff)?;
            for pickup in &interchange.pickup_routes {
                if dropoff == pickup {
                    continue;
                }
                let to = index.index_of(pickup)?;
                let (Some(from_route), Some(to_route)) = (index.route_at(from), index.route_at(to))
                else {
                    continue;
                };
                if !from_route.date_overlap(to_route) {
                    continue;
                }
                adjacency.set(from, to);
                witnesses.record(RouteIndexPair::new(from, to), interchange.station.clone());
            }
        }
    }

    for route in 0..size {
        adjacency.and_row(route, overlap.mask_for(route))?;
    }
    witnesses.retain(|pair| adjacency.is_set(pair.first(), pair.second()));

    debug!(
        interchanges = interchanges.interchanges().len(),
        connections = adjacency.count(),
        "Built degree one route connections"
    );
    Ok((adjacency, witnesses))
}

/// Derive degrees 2..=max_depth from degree 1.
///
/// Returns the layers and whether every pair was reached.
fn close_over(
    adjacency: BitMatrix,
    overlap: &RouteDateOverlap,
    max_depth: u8,
) -> Result<(Vec<BitMatrix>, bool), CostError> {
    let size = adjacency.dimension();

    // Everything recorded so far for each route, including itself at degree 0.
    let mut reached: Vec<FixedBitSet> = (0..size)
        .map(|route| {
            let mut row = adjacency.row(route).clone();
            row.insert(route);
            row
        })
        .collect();
    let is_full = |reached: &[FixedBitSet]| {
        reached.iter().map(|row| row.count_ones(..)).sum::<usize>() == size * size
    };

    let mut degrees = vec![adjacency];

    for degree in 1..max_depth {
        if is_full(&reached) {
            debug!(degree, "Route matrix fully connected");
            break;
        }

        let current = &degrees[usize::from(degree) - 1];
        let one_hop = &degrees[0];
        let mut next = BitMatrix::new(size);

        for route in 0..size {
            let mut row = FixedBitSet::with_capacity(size);
            for connected in current.row(route).ones() {
                row.union_with(one_hop.row(connected));
            }
            row.intersect_with(overlap.mask_for(route));
            row.difference_with(&reached[route]);

            reached[route].union_with(&row);
            next.or_row(route, &row)?;
        }

        if next.count() == 0 {
            debug!(degree = degree + 1, "No new route connections");
            break;
        }
        degrees.push(next);
    }

    let fully_connected = is_full(&reached);
    Ok((degrees, fully_connected))
}
