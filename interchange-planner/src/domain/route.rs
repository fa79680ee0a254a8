//! Route types.

use serde::{Deserialize, Serialize};

use super::{AgencyId, Calendar, RouteId, TransportMode};

/// A route: a named line run by one agency in one transport mode.
///
/// The calendar is the union of the calendars of all services on the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub mode: TransportMode,
    pub agency: AgencyId,
    pub calendar: Calendar,
    /// Set when at least one trip on the route runs past midnight.
    #[serde(default)]
    pub into_next_day: bool,
}

impl Route {
    pub fn new(
        id: RouteId,
        name: impl Into<String>,
        mode: TransportMode,
        agency: AgencyId,
        calendar: Calendar,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            mode,
            agency,
            calendar,
            into_next_day: false,
        }
    }

    /// Mark the route as having trips that run past midnight.
    pub fn running_into_next_day(mut self) -> Self {
        self.into_next_day = true;
        self
    }

    /// Returns true if the two routes share an operating day and their date
    /// ranges intersect.
    pub fn date_overlap(&self, other: &Route) -> bool {
        self.calendar.overlaps(&other.calendar)
    }
}
