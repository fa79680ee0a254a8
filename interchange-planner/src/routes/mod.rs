//! Route-to-route interchange costs.
//!
//! Routes are indexed densely, masked by calendar overlap and connected
//! through interchange stations into a matrix of minimum change counts. The
//! matrix is built once and is read-only afterwards.

mod bit_matrix;
mod costs;
mod error;
mod index;
mod lowest;
mod matrix;
mod overlap;
mod witness;

pub use bit_matrix::BitMatrix;
pub use costs::{BetweenRoutesCostRepository, CostConfig, NumberOfChanges, RouteToRouteCosts};
pub use error::CostError;
pub use index::{IndexRecord, RouteIndex, RouteIndexCache, RouteIndexPair};
pub use lowest::LowestCostsForDestRoutes;
pub use matrix::{DEFAULT_MAX_DEPTH, Decomposition, RouteCostMatrix};
pub use overlap::RouteDateOverlap;
pub use witness::{InterchangeWitnesses, RouteAndInterchanges, RoutePair};
