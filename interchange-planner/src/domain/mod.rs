//! Domain types for the journey planner.
//!
//! This module contains the read-only model the route cost matrix and the
//! traversal consume: identifiers, modes, calendars, routes, times, stations
//! and interchanges. Types enforce their invariants at construction time.

mod calendar;
mod error;
mod ids;
mod interchange;
mod mode;
mod route;
mod station;
mod time;

pub use calendar::{Calendar, DateRange, DaysOfWeek};
pub use error::DomainError;
pub use ids::{AgencyId, InvalidId, PlatformId, RouteId, ServiceId, StationId, TripId};
pub use interchange::InterchangeStation;
pub use mode::TransportMode;
pub use route::Route;
pub use station::{LocationSet, Station};
pub use time::{ServiceTime, TimeError, TimeWindow};
