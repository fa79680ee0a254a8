//! Journey bookkeeping.
//!
//! [`JourneyState`] is carried along the path being explored: elapsed
//! minutes, the trip currently boarded and walking totals. Each traversal
//! state keeps the value it was created with, so backing out of a branch
//! needs no undo. A [`Journey`] is the finished result built from a path
//! that reached the destination.

use std::fmt;

use crate::domain::{ServiceTime, TripId};
use crate::graph::NodeId;

use super::StateKind;

/// Running totals for the path being explored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JourneyState {
    elapsed_mins: u32,
    current_trip: Option<TripId>,
    boardings: u32,
    trips: Vec<TripId>,
    first_departure: Option<ServiceTime>,
    walk_mins: u32,
    walking: bool,
}

impl JourneyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minutes since the requested start time.
    pub fn elapsed_mins(&self) -> u32 {
        self.elapsed_mins
    }

    /// The trip currently on board, if any.
    pub fn current_trip(&self) -> Option<&TripId> {
        self.current_trip.as_ref()
    }

    pub fn is_on_trip(&self, trip: &TripId) -> bool {
        self.current_trip.as_ref() == Some(trip)
    }

    /// Vehicles boarded so far.
    pub fn boardings(&self) -> u32 {
        self.boardings
    }

    /// Vehicle changes so far.
    pub fn changes(&self) -> u32 {
        self.boardings.saturating_sub(1)
    }

    pub fn walk_mins(&self) -> u32 {
        self.walk_mins
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// Time of day at `start` plus the elapsed minutes.
    pub fn now(&self, start: ServiceTime) -> ServiceTime {
        start + self.elapsed_mins
    }

    pub(crate) fn add_cost(&mut self, minutes: u32) {
        self.elapsed_mins = self.elapsed_mins.saturating_add(minutes);
    }

    /// Board `trip` departing at `departs`. Staying on the current trip is
    /// not a new boarding.
    pub(crate) fn board(&mut self, trip: &TripId, departs: ServiceTime) {
        if self.is_on_trip(trip) {
            return;
        }
        self.boardings += 1;
        self.current_trip = Some(trip.clone());
        self.trips.push(trip.clone());
        self.first_departure.get_or_insert(departs);
    }

    /// Leave the current vehicle.
    pub(crate) fn alight(&mut self) {
        self.current_trip = None;
    }

    pub(crate) fn begin_walk(&mut self, minutes: u32) {
        self.walking = true;
        self.walk_mins = self.walk_mins.saturating_add(minutes);
    }

    pub(crate) fn end_walk(&mut self) {
        self.walking = false;
    }
}

/// One state on a journey's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StateKind,
    pub node: NodeId,
    /// Time the stage was reached.
    pub at: ServiceTime,
}

/// A journey that reached the destination.
#[derive(Clone, PartialEq, Eq)]
pub struct Journey {
    departure: ServiceTime,
    arrival: ServiceTime,
    changes: u32,
    walk_mins: u32,
    trips: Vec<TripId>,
    stages: Vec<Stage>,
}

impl Journey {
    /// Build from the final accumulator and the path's stages, first to
    /// last. Journeys without a vehicle depart at `start`.
    pub fn new(start: ServiceTime, state: &JourneyState, stages: Vec<Stage>) -> Self {
        Self {
            departure: state.first_departure.unwrap_or(start),
            arrival: state.now(start),
            changes: state.changes(),
            walk_mins: state.walk_mins,
            trips: state.trips.clone(),
            stages,
        }
    }

    pub fn departure_time(&self) -> ServiceTime {
        self.departure
    }

    pub fn arrival_time(&self) -> ServiceTime {
        self.arrival
    }

    pub fn change_count(&self) -> u32 {
        self.changes
    }

    /// Minutes from first departure to arrival.
    pub fn total_duration(&self) -> u32 {
        self.arrival.minutes_since(self.departure).unwrap_or(0)
    }

    pub fn walk_mins(&self) -> u32 {
        self.walk_mins
    }

    /// Trips boarded, in order.
    pub fn trips(&self) -> &[TripId] {
        &self.trips
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Nodes visited, in order.
    pub fn path(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.stages.iter().map(|stage| stage.node)
    }
}

impl fmt::Debug for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Journey({} -> {}, {} changes, trips {:?})",
            self.departure, self.arrival, self.changes, self.trips
        )
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "depart {} arrive {} ({} mins, {} changes",
            self.departure,
            self.arrival,
            self.total_duration(),
            self.changes
        )?;
        if self.walk_mins > 0 {
            write!(f, ", {} mins walking", self.walk_mins)?;
        }
        write!(f, ")")?;
        for trip in &self.trips {
            write!(f, " {trip}")?;
        }
        Ok(())
    }
}
