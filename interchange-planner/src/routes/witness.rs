//! Interchange witnesses: which stations realise a one-change connection.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use super::RouteIndexPair;
use crate::availability::StationAvailability;
use crate::domain::{RouteId, StationId, TimeWindow};

/// A pair of routes, arriving on `first` and leaving on `second`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutePair {
    pub first: RouteId,
    pub second: RouteId,
}

impl RoutePair {
    pub fn new(first: RouteId, second: RouteId) -> Self {
        Self { first, second }
    }
}

/// One elementary change: the route pair and every station where it can be
/// made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAndInterchanges {
    pub route_pair: RoutePair,
    pub interchanges: BTreeSet<StationId>,
}

impl RouteAndInterchanges {
    /// Returns true if at least one of the stations is operating for this
    /// change on `date` within `window`.
    pub fn is_operating<A: StationAvailability + ?Sized>(
        &self,
        availability: &A,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> bool {
        self.operating_interchanges(availability, date, window)
            .next()
            .is_some()
    }

    /// The stations operating for this change on `date` within `window`.
    pub fn operating_interchanges<'a, A: StationAvailability + ?Sized>(
        &'a self,
        availability: &'a A,
        date: NaiveDate,
        window: &'a TimeWindow,
    ) -> impl Iterator<Item = &'a StationId> + 'a {
        self.interchanges.iter().filter(move |station| {
            availability.interchange_operating(
                station,
                &self.route_pair.first,
                &self.route_pair.second,
                date,
                window,
            )
        })
    }
}

/// Map from a directly connected route pair to its interchange stations.
#[derive(Debug, Clone, Default)]
pub struct InterchangeWitnesses {
    stations: HashMap<RouteIndexPair, BTreeSet<StationId>>,
}

impl InterchangeWitnesses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, pair: RouteIndexPair, station: StationId) {
        self.stations.entry(pair).or_default().insert(station);
    }

    /// The stations recorded for `pair`, or `None` if the pair is not
    /// directly connected.
    pub fn stations_for(&self, pair: &RouteIndexPair) -> Option<&BTreeSet<StationId>> {
        self.stations.get(pair)
    }

    /// Drop every pair for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&RouteIndexPair) -> bool) {
        self.stations.retain(|pair, _| keep(pair));
    }

    /// Number of route pairs with at least one witness.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::{AvailabilityIndex, StopActivity, StopAvailability};
    use crate::domain::{Calendar, DateRange, DaysOfWeek};

    fn sid(s: &str) -> StationId {
        StationId::new(s).unwrap()
    }

    fn rid(s: &str) -> RouteId {
        RouteId::new(s).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn records_stations_per_pair() {
        let mut witnesses = InterchangeWitnesses::new();
        let pair = RouteIndexPair::new(0, 1);
        witnesses.record(pair, sid("S1"));
        witnesses.record(pair, sid("S2"));
        witnesses.record(pair, sid("S1"));

        assert_eq!(witnesses.len(), 1);
        assert_eq!(witnesses.stations_for(&pair).unwrap().len(), 2);
        assert!(witnesses.stations_for(&RouteIndexPair::new(1, 0)).is_none());

        witnesses.retain(|p| p.first() != 0);
        assert!(witnesses.is_empty());
    }

    #[test]
    fn operating_filters_by_availability() {
        let calendar = Calendar::new(DaysOfWeek::ALL, DateRange::single(date()));
        let record = |station: &str, route: &str, activity| StopAvailability {
            station: sid(station),
            route: rid(route),
            activity,
            calendar: calendar.clone(),
            window: TimeWindow::all_day(),
        };
        let availability: AvailabilityIndex = [
            record("OPEN", "A", StopActivity::Dropoff),
            record("OPEN", "B", StopActivity::Pickup),
            record("HALF", "A", StopActivity::Dropoff),
        ]
        .into_iter()
        .collect();

        let change = RouteAndInterchanges {
            route_pair: RoutePair::new(rid("A"), rid("B")),
            interchanges: BTreeSet::from([sid("OPEN"), sid("HALF"), sid("CLOSED")]),
        };

        let window = TimeWindow::all_day();
        let operating: Vec<_> = change
            .operating_interchanges(&availability, date(), &window)
            .collect();
        assert_eq!(operating, vec![&sid("OPEN")]);
        assert!(change.is_operating(&availability, date(), &window));

        let other_day = date().succ_opt().unwrap();
        assert!(!change.is_operating(&availability, other_day, &window));
    }
}
