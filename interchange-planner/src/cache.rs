//! Memoisation of change counts.
//!
//! The journey orchestrator asks for the same start/destination/date/window
//! combination repeatedly while widening its search. Answers only depend on
//! the read-only matrix and availability data, so they are cached in a
//! bounded moka cache. Errors are never cached.

use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache as MokaCache;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{LocationSet, TimeWindow};
use crate::routes::{
    BetweenRoutesCostRepository, CostError, LowestCostsForDestRoutes, NumberOfChanges,
};

/// Cache key: (start, destination, date, window).
type ChangesKey = (LocationSet, LocationSet, NaiveDate, TimeWindow);

/// Configuration for the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// TTL for cached entries, in seconds.
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_secs: 3600,
        }
    }
}

/// A cost repository with memoised `changes_between`.
pub struct CachedCosts<R> {
    inner: R,
    changes: MokaCache<ChangesKey, NumberOfChanges>,
}

impl<R: BetweenRoutesCostRepository> CachedCosts<R> {
    pub fn new(inner: R, config: &CacheConfig) -> Self {
        let changes = MokaCache::builder()
            .time_to_live(config.ttl())
            .max_capacity(config.max_capacity)
            .build();
        Self { inner, changes }
    }

    /// Access the wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.changes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.changes.invalidate_all();
    }
}

impl<R: BetweenRoutesCostRepository> BetweenRoutesCostRepository for CachedCosts<R> {
    fn changes_between(
        &self,
        start: &LocationSet,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<NumberOfChanges, CostError> {
        let key = (start.clone(), destination.clone(), date, *window);
        if let Some(cached) = self.changes.get(&key) {
            trace!(?start, ?destination, %date, "Change count cache hit");
            return Ok(cached);
        }

        let changes = self
            .inner
            .changes_between(start, destination, date, window)?;
        self.changes.insert(key, changes);
        Ok(changes)
    }

    fn lowest_cost_calculator_for(
        &self,
        destination: &LocationSet,
        date: NaiveDate,
        window: &TimeWindow,
    ) -> Result<LowestCostsForDestRoutes<'_>, CostError> {
        self.inner.lowest_cost_calculator_for(destination, date, window)
    }
}
