//! Calendar overlap between routes.
//!
//! Bit `r2` of route `r`'s mask is set when `r` and `r2` share an operating
//! day and their date ranges intersect. Masks are only ever used to AND away
//! route combinations that can never run on the same day.

use fixedbitset::FixedBitSet;
use rayon::prelude::*;
use tracing::debug;

use super::{BitMatrix, CostError, RouteIndex};

/// Per-route calendar overlap masks.
#[derive(Debug, Clone)]
pub struct RouteDateOverlap {
    masks: BitMatrix,
}

impl RouteDateOverlap {
    /// Compute masks for every indexed route, one route per rayon task.
    pub fn build(index: &RouteIndex) -> Result<Self, CostError> {
        let size = index.len();
        let routes: Vec<_> = index.iter().map(|(_, route)| route.clone()).collect();

        let rows: Vec<FixedBitSet> = routes
            .par_iter()
            .enumerate()
            .map(|(idx, route)| {
                let mut row = FixedBitSet::with_capacity(size);
                for (other_idx, other) in routes.iter().enumerate() {
                    if idx == other_idx || route.date_overlap(other) {
                        row.insert(other_idx);
                    }
                }
                row
            })
            .collect();

        let masks = BitMatrix::from_rows(rows)?;
        debug!(
            routes = size,
            overlapping_pairs = masks.count(),
            "Computed route calendar overlap"
        );
        Ok(Self { masks })
    }

    /// The overlap mask for route `index`.
    pub fn mask_for(&self, index: usize) -> &FixedBitSet {
        self.masks.row(index)
    }

    pub fn overlaps(&self, first: usize, second: usize) -> bool {
        self.masks.is_set(first, second)
    }

    pub fn as_matrix(&self) -> &BitMatrix {
        &self.masks
    }
}
