//! Identifier types for routes, stations, trips and services.
//!
//! Identifiers come from the imported timetable and are opaque; the only
//! validation is that they are non-empty.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when constructing an identifier from an invalid string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty strings.
            pub fn new(s: impl Into<String>) -> Result<Self, InvalidId> {
                let s = s.into();
                if s.is_empty() {
                    return Err(InvalidId {
                        kind: $kind,
                        reason: "cannot be empty",
                    });
                }
                Ok(Self(s))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a route (a named line operated by one agency in one mode).
    RouteId,
    "route"
);

opaque_id!(
    /// Identifier of a station, stop or grouped stop area.
    StationId,
    "station"
);

opaque_id!(
    /// Identifier of a single vehicle trip along a route.
    TripId,
    "trip"
);

opaque_id!(
    /// Identifier of a service (a set of trips sharing a calendar).
    ServiceId,
    "service"
);

opaque_id!(
    /// Identifier of a platform within a station.
    PlatformId,
    "platform"
);

opaque_id!(
    /// Identifier of an operating agency.
    AgencyId,
    "agency"
);
