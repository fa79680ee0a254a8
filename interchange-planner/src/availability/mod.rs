//! Station availability.
//!
//! Answers "which routes actually pick up or set down at these stations on
//! this date within this time window?". Used to project journey end points to
//! routes and to check that a candidate interchange is operating when the
//! journey would pass through it.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Calendar, LocationSet, RouteId, StationId, TimeWindow};

/// Lookup of routes operating at stations for a date and time window.
pub trait StationAvailability {
    /// Routes that pick passengers up at any of `locations`.
    fn pickup_routes(
        &self,
        locations: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> HashSet<RouteId>;

    /// Routes that set passengers down at any of `locations`.
    fn dropoff_routes(
        &self,
        locations: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> HashSet<RouteId>;

    /// Returns true if a passenger can arrive at `station` on `from` and
    /// leave on `to` within the window.
    fn interchange_operating(
        &self,
        station: &StationId,
        from: &RouteId,
        to: &RouteId,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> bool {
        let locations = LocationSet::singleton(station.clone());
        self.dropoff_routes(&locations, date, window).contains(from)
            && self.pickup_routes(&locations, date, window).contains(to)
    }
}

/// Whether a route picks up, sets down, or both at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopActivity {
    Pickup,
    Dropoff,
    Both,
}

impl StopActivity {
    fn picks_up(self) -> bool {
        matches!(self, StopActivity::Pickup | StopActivity::Both)
    }

    fn sets_down(self) -> bool {
        matches!(self, StopActivity::Dropoff | StopActivity::Both)
    }
}

/// A route calling at a station over a range of times on a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopAvailability {
    pub station: StationId,
    pub route: RouteId,
    pub activity: StopActivity,
    pub calendar: Calendar,
    /// First to last call at the station over the service day.
    pub window: TimeWindow,
}

impl StopAvailability {
    fn operating(&self, date: NaiveDate, window: &TimeWindow) -> bool {
        self.calendar.runs_on(date) && self.window.overlaps(window)
    }
}

/// In-memory [`StationAvailability`] keyed by station.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityIndex {
    by_station: HashMap<StationId, Vec<StopAvailability>>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: StopAvailability) {
        self.by_station
            .entry(record.station.clone())
            .or_default()
            .push(record);
    }

    pub fn with(mut self, record: StopAvailability) -> Self {
        self.add(record);
        self
    }

    /// Returns the number of stations with at least one record.
    pub fn station_count(&self) -> usize {
        self.by_station.len()
    }

    fn routes_matching(
        &self,
        locations: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
        wanted: impl Fn(StopActivity) -> bool,
    ) -> HashSet<RouteId> {
        locations
            .iter()
            .filter_map(|station| self.by_station.get(station))
            .flatten()
            .filter(|record| wanted(record.activity) && record.operating(date, window))
            .map(|record| record.route.clone())
            .collect()
    }
}

impl FromIterator<StopAvailability> for AvailabilityIndex {
    fn from_iter<I: IntoIterator<Item = StopAvailability>>(iter: I) -> Self {
        let mut index = AvailabilityIndex::new();
        for record in iter {
            index.add(record);
        }
        index
    }
}

impl StationAvailability for AvailabilityIndex {
    fn pickup_routes(
        &self,
        locations: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> HashSet<RouteId> {
        self.routes_matching(locations, date, window, StopActivity::picks_up)
    }

    fn dropoff_routes(
        &self,
        locations: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> HashSet<RouteId> {
        self.routes_matching(locations, date, window, StopActivity::sets_down)
    }
}
