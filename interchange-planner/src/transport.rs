//! Route and interchange data consumed by the cost matrix.
//!
//! Importing timetables is somebody else's job; this module only describes
//! what the matrix needs from the imported data and provides an in-memory
//! implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{InterchangeStation, Route, RouteId};

/// Source of all routes in the network.
pub trait RouteSource {
    /// All routes, in a stable order.
    fn routes(&self) -> &[Arc<Route>];

    /// Look up a route by id.
    fn route(&self, id: &RouteId) -> Option<&Arc<Route>>;
}

/// Source of all interchange stations in the network.
pub trait InterchangeSource {
    fn interchanges(&self) -> &[InterchangeStation];
}

/// Routes and interchanges held in memory.
#[derive(Debug, Clone, Default)]
pub struct TransportData {
    routes: Vec<Arc<Route>>,
    by_id: HashMap<RouteId, usize>,
    interchanges: Vec<InterchangeStation>,
}

/// Serialisable form of [`TransportData`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportRecords {
    pub routes: Vec<Route>,
    #[serde(default)]
    pub interchanges: Vec<InterchangeStation>,
}

impl TransportData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. A route with an id already present replaces the old one.
    pub fn add_route(&mut self, route: Route) {
        let route = Arc::new(route);
        match self.by_id.get(&route.id) {
            Some(&idx) => self.routes[idx] = route,
            None => {
                self.by_id.insert(route.id.clone(), self.routes.len());
                self.routes.push(route);
            }
        }
    }

    pub fn add_interchange(&mut self, interchange: InterchangeStation) {
        self.interchanges.push(interchange);
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.add_route(route);
        self
    }

    pub fn with_interchange(mut self, interchange: InterchangeStation) -> Self {
        self.add_interchange(interchange);
        self
    }
}

impl From<TransportRecords> for TransportData {
    fn from(records: TransportRecords) -> Self {
        let mut data = TransportData::new();
        for route in records.routes {
            data.add_route(route);
        }
        for interchange in records.interchanges {
            data.add_interchange(interchange);
        }
        data
    }
}

impl RouteSource for TransportData {
    fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    fn route(&self, id: &RouteId) -> Option<&Arc<Route>> {
        self.by_id.get(id).map(|&idx| &self.routes[idx])
    }
}

impl InterchangeSource for TransportData {
    fn interchanges(&self) -> &[InterchangeStation] {
        &self.interchanges
    }
}
