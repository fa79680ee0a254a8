//! Search configuration for the traversal.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration parameters for journey search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of vehicle changes allowed.
    pub max_changes: u32,

    /// Maximum number of journeys to return.
    /// The search stops once this many have been found.
    pub max_results: usize,

    /// Maximum total journey time from the requested start time (minutes).
    pub max_journey_mins: u32,

    /// Longest wait for the first vehicle (minutes).
    pub max_initial_wait_mins: u32,

    /// Longest wait when changing vehicles (minutes).
    pub max_wait_mins: u32,

    /// Only alight at interchange stations, unless alighting at the
    /// destination.
    pub interchanges_only: bool,

    /// Abandon branches that are already longer than the best journey found.
    pub prune_longer_than_best: bool,

    /// Maximum number of states to explore before giving up.
    pub max_states: usize,
}

impl SearchConfig {
    /// Returns the maximum journey time as a Duration.
    pub fn max_journey(&self) -> Duration {
        Duration::minutes(i64::from(self.max_journey_mins))
    }

    /// Returns the maximum initial wait as a Duration.
    pub fn max_initial_wait(&self) -> Duration {
        Duration::minutes(i64::from(self.max_initial_wait_mins))
    }

    /// Returns the maximum wait between vehicles as a Duration.
    pub fn max_wait(&self) -> Duration {
        Duration::minutes(i64::from(self.max_wait_mins))
    }

    /// Longest acceptable wait before boarding, given how many vehicles have
    /// already been boarded.
    pub fn wait_limit_mins(&self, boardings: u32) -> u32 {
        if boardings == 0 {
            self.max_initial_wait_mins
        } else {
            self.max_wait_mins
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_changes: 3,
            max_results: 5,
            max_journey_mins: 124,
            max_initial_wait_mins: 25,
            max_wait_mins: 25,
            interchanges_only: false,
            prune_longer_than_best: true,
            max_states: 100_000,
        }
    }
}
