//! Transport modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of vehicle (or lack of one) used for part of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Tram,
    Bus,
    Train,
    Subway,
    Ferry,
    Walk,
}

impl TransportMode {
    /// Returns true for modes that run to a timetable.
    pub fn is_scheduled(&self) -> bool {
        !matches!(self, TransportMode::Walk)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Tram => "tram",
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Subway => "subway",
            TransportMode::Ferry => "ferry",
            TransportMode::Walk => "walk",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
