//! TilingError: unified error type for grid-tiling public APIs
//!
//! Recoverable conditions only. Precondition violations (zero-sized grids,
//! inverted ranges, zero unit counts) are caller bugs and panic at the
//! constructor instead of surfacing here.

use crate::geometry::{Size2D, Slice2D};
use crate::partition::Target;
use thiserror::Error;

/// Unified error type for grid-tiling operations.
#[derive(Debug, Error)]
pub enum TilingError {
    /// The problem does not fit under the per-group cell limit; the caller
    /// must pick a different topology or report infeasibility.
    #[error("grid of {cells} cells cannot be hosted by {num_groups} group(s) of at most {max_cells_per_group} cells each")]
    CapacityExceeded {
        cells: usize,
        num_groups: usize,
        max_cells_per_group: usize,
    },
    /// Toroidal halo derivation on a grid smaller than 3 in some dimension
    /// would make a unit its own neighbour (or make two neighbours coincide).
    #[error("toroidal exchange requires a grid of at least 3x3, got {0}")]
    DegenerateToroidalGrid(Size2D),
    /// A halo cell fell outside every region of the partition map.
    #[error("cell (row:{row},col:{col}) is not owned by any partition entry")]
    UnmappedCell { row: usize, col: usize },
    /// Two entries of a partitioning claim the same cells.
    #[error("regions for {a} and {b} overlap")]
    RegionOverlap { a: Target, b: Target },
    /// An entry strays outside the extent its partitioning tiles.
    #[error("region {region} for {target} escapes extent {extent}")]
    RegionOutOfExtent {
        target: Target,
        region: Slice2D,
        extent: Slice2D,
    },
    /// A partitioning does not cover its extent, or strays outside it.
    #[error("partitioning covers {covered} of {expected} cells in extent {extent}")]
    CoverageGap {
        covered: usize,
        expected: usize,
        extent: Slice2D,
    },
    /// Malformed diagnostic dump, or an i/o failure underneath it.
    #[error("partition dump is not readable: {0}")]
    Json(#[from] serde_json::Error),
}
