//! # grid-tiling
//!
//! grid-tiling is a modular Rust library for partitioning large 2D cell
//! grids across hierarchical accelerators (unit groups → units → worker
//! threads) and planning the halo exchanges that stencil codes (Lattice-
//! Boltzmann, Moore-neighbourhood averaging, …) need between iterations.
//! It computes load-balanced, contiguous, non-overlapping tilings down to
//! the worker level and derives, for every leaf region, the eight border
//! regions it must exchange with its neighbours.
//!
//! ## Features
//! - Aspect-ratio-aware grid decomposition with four strategies (single
//!   unit, long-and-narrow, short-and-wide, general rectangular)
//! - Hierarchical composition with deterministic, reproducible maps
//! - Halo derivation with clamped or toroidal (periodic) boundaries
//! - Exchange planning down to individual region-to-region copies, with a
//!   pluggable [`exchange::RegionCopier`] seam towards the real runtime
//! - JSON diagnostic dumps of computed partitionings
//!
//! ## Determinism
//!
//! Every algorithm here is a pure function of its inputs: no randomness,
//! no hash-order dependence. Identical grid sizes and topologies always
//! produce bit-identical partition maps, iteration orders and exchange
//! plans — required for reproducible tests and stable device placement.
//!
//! ## Usage
//!
//! ```
//! use grid_tiling::prelude::*;
//!
//! let grid = Size2D::new(128, 96);
//! let topology = Topology {
//!     num_groups: 1,
//!     units_per_group: 16,
//!     workers_per_unit: 6,
//!     ..Topology::default()
//! };
//! let partitioning = partition_grid(grid, &topology).expect("grid fits");
//! let plan = ExchangePlan::build(&partitioning, grid, BoundaryMode::Toroidal)
//!     .expect("grid is not degenerate");
//! assert!(!plan.is_empty());
//! ```
//!
//! The actual stencil execution is external and lock-step: pack halos,
//! exchange, unpack, compute, with a barrier between phases enforced by
//! the execution engine. This crate is the config-time side: it never
//! blocks, suspends or touches shared mutable state.

pub mod check;
pub mod error;
pub mod exchange;
pub mod geometry;
pub mod halo;
pub mod io;
pub mod partition;

pub use check::DebugInvariants;
pub use error::TilingError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::check::DebugInvariants;
    pub use crate::error::TilingError;
    pub use crate::exchange::{
        BoundaryMode, CopyOp, ExchangePlan, MailboxCopier, NoCopier, RegionCopier,
    };
    pub use crate::geometry::{Range, Size2D, Slice2D};
    pub use crate::halo::{Direction, Halos};
    pub use crate::io::{PartitionRecord, read_json, to_records, write_json};
    pub use crate::partition::compose::{
        partition_across_groups, partition_grid, refine_to_units, refine_to_workers,
    };
    pub use crate::partition::{
        GridPartitioning, Target, Topology, fair_shares, partition_level,
    };
}
