//! Dense integer indices for routes.
//!
//! The cost matrix addresses routes by position. The mapping is built once
//! from the live route set and can be persisted so that large bus networks do
//! not have to rebuild it on every start.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::CostError;
use crate::domain::{Route, RouteId};
use crate::transport::RouteSource;

/// An ordered pair of dense route indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteIndexPair {
    first: usize,
    second: usize,
}

impl RouteIndexPair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> usize {
        self.first
    }

    pub fn second(&self) -> usize {
        self.second
    }

    /// Both indices refer to the same route.
    pub fn is_same_route(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Debug for RouteIndexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.first, self.second)
    }
}

/// Bijection between routes and `0..len`.
#[derive(Debug, Clone)]
pub struct RouteIndex {
    routes: Vec<Arc<Route>>,
    positions: HashMap<RouteId, usize>,
}

impl RouteIndex {
    /// Index the routes of `source` in their iteration order.
    pub fn build<S: RouteSource + ?Sized>(source: &S) -> Self {
        let routes: Vec<Arc<Route>> = source.routes().to_vec();
        let positions = routes
            .iter()
            .enumerate()
            .map(|(idx, route)| (route.id.clone(), idx))
            .collect();
        Self { routes, positions }
    }

    /// Rebuild an index from cached records, validating them against the
    /// live route set.
    pub fn from_records<S: RouteSource + ?Sized>(
        records: &[IndexRecord],
        source: &S,
        path: &Path,
    ) -> Result<Self, CostError> {
        let stale = |reason: String| {
            warn!(path = %path.display(), %reason, "Rejecting stale route index cache");
            CostError::StaleIndexCache {
                path: path.to_path_buf(),
                reason,
            }
        };

        let live = source.routes().len();
        if records.len() != live {
            return Err(stale(format!(
                "cached {} routes, live {}",
                records.len(),
                live
            )));
        }

        let mut slots: Vec<Option<Arc<Route>>> = vec![None; live];
        for record in records {
            let route = source
                .route(&record.route_id)
                .ok_or_else(|| stale(format!("unknown route {}", record.route_id)))?;
            let slot = slots
                .get_mut(record.index)
                .ok_or_else(|| stale(format!("index {} out of range", record.index)))?;
            if slot.is_some() {
                return Err(stale(format!("index {} repeated", record.index)));
            }
            *slot = Some(route.clone());
        }

        let routes: Vec<Arc<Route>> = slots.into_iter().flatten().collect();
        if routes.len() != live {
            return Err(stale("cache does not cover every route".to_string()));
        }
        let positions = routes
            .iter()
            .enumerate()
            .map(|(idx, route)| (route.id.clone(), idx))
            .collect::<HashMap<_, _>>();
        if positions.len() != live {
            return Err(stale("route repeated in cache".to_string()));
        }

        Ok(Self { routes, positions })
    }

    /// Load the index from `cache`, or build and save it if no cache exists.
    ///
    /// A cache that exists but disagrees with the live routes is an error.
    pub fn load_or_build<S: RouteSource + ?Sized>(
        source: &S,
        cache: &RouteIndexCache,
    ) -> Result<Self, CostError> {
        match cache.load()? {
            Some(records) => {
                let index = Self::from_records(&records, source, cache.path())?;
                info!(routes = index.len(), path = %cache.path().display(), "Loaded route index from cache");
                Ok(index)
            }
            None => {
                let index = Self::build(source);
                cache.save(&index)?;
                info!(routes = index.len(), path = %cache.path().display(), "Built and cached route index");
                Ok(index)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn index_of(&self, route: &RouteId) -> Result<usize, CostError> {
        self.positions
            .get(route)
            .copied()
            .ok_or_else(|| CostError::UnknownRoute(route.clone()))
    }

    pub fn route_at(&self, index: usize) -> Option<&Arc<Route>> {
        self.routes.get(index)
    }

    pub fn pair_for(&self, first: &RouteId, second: &RouteId) -> Result<RouteIndexPair, CostError> {
        Ok(RouteIndexPair::new(
            self.index_of(first)?,
            self.index_of(second)?,
        ))
    }

    /// Iterate routes with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Arc<Route>)> {
        self.routes.iter().enumerate()
    }

    /// The persisted form of this index.
    pub fn records(&self) -> Vec<IndexRecord> {
        self.iter()
            .map(|(index, route)| IndexRecord {
                index,
                route_id: route.id.clone(),
            })
            .collect()
    }
}

/// One persisted `(index, route id)` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub index: usize,
    pub route_id: RouteId,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedIndex {
    routes: Vec<IndexRecord>,
}

/// JSON file cache for a [`RouteIndex`].
#[derive(Debug, Clone)]
pub struct RouteIndexCache {
    path: PathBuf,
}

impl RouteIndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read cached records.
    ///
    /// Returns `Ok(None)` if no cache file exists; an unreadable or malformed
    /// file is an error.
    pub fn load(&self) -> Result<Option<Vec<IndexRecord>>, CostError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        let cached: CachedIndex = serde_json::from_str(&contents).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Rejecting malformed route index cache");
            self.error(e)
        })?;
        Ok(Some(cached.routes))
    }

    /// Write the index, creating parent directories if needed.
    pub fn save(&self, index: &RouteIndex) -> Result<(), CostError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        let cached = CachedIndex {
            routes: index.records(),
        };
        let json = serde_json::to_string_pretty(&cached).map_err(|e| self.error(e))?;
        std::fs::write(&self.path, json).map_err(|e| self.error(e))
    }

    fn error(&self, e: impl fmt::Display) -> CostError {
        CostError::Cache {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}
