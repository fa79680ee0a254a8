//! Distance from candidate routes to a fixed set of destination routes.
//!
//! Built once per search and consulted at every boarding decision to order
//! the services worth trying first. Interchange operating hours are not
//! considered, so the value is only good for ordering.

use fixedbitset::FixedBitSet;

use super::{CostError, RouteCostMatrix};
use crate::domain::RouteId;

/// Fewest-changes lookup towards a destination route set.
#[derive(Debug, Clone)]
pub struct LowestCostsForDestRoutes<'a> {
    matrix: &'a RouteCostMatrix,
    destinations: FixedBitSet,
}

impl<'a> LowestCostsForDestRoutes<'a> {
    /// Distance reported for routes that cannot reach any destination route.
    pub const UNREACHABLE: u32 = u32::MAX;

    pub fn new<'r>(
        matrix: &'a RouteCostMatrix,
        destinations: impl IntoIterator<Item = &'r RouteId>,
    ) -> Result<Self, CostError> {
        let mut bits = FixedBitSet::with_capacity(matrix.index().len());
        for route in destinations {
            bits.insert(matrix.index().index_of(route)?);
        }
        Ok(Self {
            matrix,
            destinations: bits,
        })
    }

    /// Number of destination routes.
    pub fn destination_count(&self) -> usize {
        self.destinations.count_ones(..)
    }

    pub fn is_destination(&self, route: &RouteId) -> bool {
        self.matrix
            .index()
            .index_of(route)
            .is_ok_and(|idx| self.destinations.contains(idx))
    }

    /// Fewest changes from `route` to any destination route: 0 if it is one,
    /// [`Self::UNREACHABLE`] if none can be reached.
    pub fn fewest_changes(&self, route: &RouteId) -> Result<u32, CostError> {
        let idx = self.matrix.index().index_of(route)?;
        Ok(self.fewest_changes_from(idx))
    }

    fn fewest_changes_from(&self, index: usize) -> u32 {
        self.matrix
            .degree_to_any(index, &self.destinations)
            .map_or(Self::UNREACHABLE, u32::from)
    }

    /// Stable sort of `items` by the distance of their route to the
    /// destinations, closest first.
    pub fn sort_by_fewest_changes<T>(
        &self,
        items: Vec<T>,
        route_of: impl Fn(&T) -> &RouteId,
    ) -> Result<Vec<T>, CostError> {
        let mut keyed = Vec::with_capacity(items.len());
        for item in items {
            keyed.push((self.fewest_changes(route_of(&item))?, item));
        }
        keyed.sort_by_key(|(changes, _)| *changes);
        Ok(keyed.into_iter().map(|(_, item)| item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AgencyId, Calendar, DateRange, DaysOfWeek, InterchangeStation, Route, StationId,
        TransportMode,
    };
    use crate::routes::{DEFAULT_MAX_DEPTH, RouteIndex};
    use crate::transport::TransportData;
    use chrono::NaiveDate;

    fn rid(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    fn route(id: &str) -> Route {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        Route::new(
            rid(id),
            id,
            TransportMode::Bus,
            AgencyId::new("AG").unwrap(),
            Calendar::new(DaysOfWeek::ALL, DateRange::new(start, end).unwrap()),
        )
    }

    fn link(station: &str, from: &str, to: &str) -> InterchangeStation {
        InterchangeStation::new(StationId::new(station).unwrap())
            .with_dropoff(rid(from), TransportMode::Bus)
            .with_pickup(rid(to), TransportMode::Bus)
    }

    /// A -> B -> C, and an isolated D.
    fn matrix() -> RouteCostMatrix {
        let data = ["A", "B", "C", "D"]
            .iter()
            .fold(TransportData::new(), |data, id| data.with_route(route(id)))
            .with_interchange(link("X", "A", "B"))
            .with_interchange(link("Y", "B", "C"));
        RouteCostMatrix::build(RouteIndex::build(&data), &data, DEFAULT_MAX_DEPTH).unwrap()
    }

    #[test]
    fn fewest_changes_to_destination() {
        let matrix = matrix();
        let lowest = LowestCostsForDestRoutes::new(&matrix, [&rid("C")]).unwrap();

        assert_eq!(lowest.destination_count(), 1);
        assert_eq!(lowest.fewest_changes(&rid("C")).unwrap(), 0);
        assert_eq!(lowest.fewest_changes(&rid("B")).unwrap(), 1);
        assert_eq!(lowest.fewest_changes(&rid("A")).unwrap(), 2);
        assert_eq!(
            lowest.fewest_changes(&rid("D")).unwrap(),
            LowestCostsForDestRoutes::UNREACHABLE
        );
    }

    #[test]
    fn nearest_of_several_destinations_wins() {
        let matrix = matrix();
        let lowest = LowestCostsForDestRoutes::new(&matrix, [&rid("B"), &rid("C")]).unwrap();
        assert_eq!(lowest.fewest_changes(&rid("A")).unwrap(), 1);
        assert!(lowest.is_destination(&rid("B")));
        assert!(!lowest.is_destination(&rid("A")));
    }

    #[test]
    fn unknown_route_is_an_error() {
        let matrix = matrix();
        assert!(LowestCostsForDestRoutes::new(&matrix, [&rid("Z")]).is_err());

        let lowest = LowestCostsForDestRoutes::new(&matrix, [&rid("C")]).unwrap();
        assert!(matches!(
            lowest.fewest_changes(&rid("Z")),
            Err(CostError::UnknownRoute(_))
        ));
    }

    #[test]
    fn sorts_closest_first() {
        let matrix = matrix();
        let lowest = LowestCostsForDestRoutes::new(&matrix, [&rid("C")]).unwrap();

        let items = vec![
            ("d", rid("D")),
            ("a", rid("A")),
            ("c", rid("C")),
            ("b1", rid("B")),
            ("b2", rid("B")),
        ];
        let items = lowest.sort_by_fewest_changes(items, |(_, r)| r).unwrap();

        let labels: Vec<_> = items.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["c", "b1", "b2", "a", "d"]);
    }
}
