//! Exchange planning: the point-to-point copies that move halo data
//! between neighbouring compute units before each stencil step.
//!
//! [`ExchangePlan::build`] walks a leaf partitioning, derives each region's
//! halos, and resolves every halo against the partition map to find the
//! neighbour(s) owning it. The result is a flat, deterministic list of
//! [`CopyOp`]s.
//!
//! Copies within one exchange round are commutative: they may be issued in
//! any order, or all at once. The round as a whole is a barrier — the
//! external engine must not let any unit start its stencil update until
//! every copy of the round has completed. Sequencing *between* rounds is
//! the engine's job; this module only decides *what* to copy.

pub mod copier;

pub use copier::{MailboxCopier, NoCopier, RegionCopier};

use crate::error::TilingError;
use crate::geometry::{Size2D, Slice2D};
use crate::halo::{Direction, Halos};
use crate::partition::{GridPartitioning, Target};
use itertools::Itertools;

/// How the grid edges behave for halo purposes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BoundaryMode {
    /// Edge regions have no neighbour off-grid; their outward halos are
    /// simply absent.
    Clamped,
    /// Periodic domain: edges wrap to the opposite side.
    Toroidal,
}

/// One region-to-region transfer: `dst` receives `region` (a part of
/// `src`'s owned slice) into its `dir`-side ghost cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CopyOp {
    pub src: Target,
    pub region: Slice2D,
    pub dst: Target,
    pub dir: Direction,
}

/// All copies of one halo-exchange round, in deterministic order
/// (partition map order, then [`Direction::ALL`] order, then neighbour
/// order within a split halo).
#[derive(Debug, Clone)]
pub struct ExchangePlan {
    grid: Size2D,
    mode: BoundaryMode,
    ops: Vec<CopyOp>,
}

impl ExchangePlan {
    /// Plans one exchange round for a leaf partitioning.
    ///
    /// A halo edge that crosses several neighbouring regions (tile
    /// boundaries need not line up across a cut) becomes one [`CopyOp`]
    /// per overlapped neighbour. A unit spanning a full grid dimension on
    /// a toroidal domain may legitimately be its own `src` and `dst`.
    ///
    /// # Errors
    ///
    /// - [`TilingError::DegenerateToroidalGrid`] for toroidal mode on a
    ///   grid smaller than 3x3;
    /// - [`TilingError::UnmappedCell`] when some halo cell is owned by no
    ///   partition entry (the partitioning does not cover the grid).
    pub fn build(
        partitioning: &GridPartitioning,
        grid: Size2D,
        mode: BoundaryMode,
    ) -> Result<ExchangePlan, TilingError> {
        if mode == BoundaryMode::Toroidal && (grid.rows() < 3 || grid.cols() < 3) {
            return Err(TilingError::DegenerateToroidalGrid(grid));
        }

        let mut ops = Vec::new();
        for (dst, slice) in partitioning.iter() {
            let halos = match mode {
                BoundaryMode::Clamped => Halos::clamped(slice, grid),
                BoundaryMode::Toroidal => Halos::toroidal(slice, grid),
            };
            for (dir, halo) in halos.iter() {
                let mut covered = 0usize;
                for (src, owned) in partitioning.iter() {
                    let Some(region) = owned.intersect(halo) else {
                        continue;
                    };
                    covered += region.cells();
                    ops.push(CopyOp { src, region, dst, dir });
                }
                if covered != halo.cells() {
                    return Err(first_unmapped_cell(partitioning, halo));
                }
            }
        }

        log::debug!(
            "planned {} halo copies for {} region(s) on {grid} ({mode:?})",
            ops.len(),
            partitioning.len()
        );
        Ok(ExchangePlan { grid, mode, ops })
    }

    #[inline]
    pub fn grid(&self) -> Size2D {
        self.grid
    }

    #[inline]
    pub fn mode(&self) -> BoundaryMode {
        self.mode
    }

    /// Every copy of the round, in plan order.
    #[inline]
    pub fn ops(&self) -> &[CopyOp] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Copies landing in `dir`-side ghosts, the per-direction sequences the
    /// original exchange drivers schedule one after another.
    pub fn ops_for(&self, dir: Direction) -> impl Iterator<Item = &CopyOp> + '_ {
        self.ops.iter().filter(move |op| op.dir == dir)
    }

    /// Copy counts per direction.
    pub fn direction_counts(&self) -> std::collections::HashMap<Direction, usize> {
        self.ops.iter().counts_by(|op| op.dir)
    }

    /// The distinct peers `dst` receives from, sorted.
    pub fn sources_for(&self, dst: Target) -> Vec<Target> {
        let mut peers: hashbrown::HashSet<Target> = hashbrown::HashSet::new();
        for op in self.ops.iter().filter(|op| op.dst == dst) {
            peers.insert(op.src);
        }
        peers.into_iter().sorted().collect()
    }

    /// Issues every copy of the round through `copier`, in plan order.
    /// Stops at the first failure.
    pub fn execute<C: RegionCopier>(&self, copier: &C) -> Result<(), TilingError> {
        for op in &self.ops {
            copier.copy_region(op)?;
        }
        Ok(())
    }

    /// Issues every copy of the round in parallel. Sound because copies
    /// within a round are commutative; the caller still owns the barrier
    /// before the next stencil step.
    #[cfg(feature = "rayon")]
    pub fn execute_par<C: RegionCopier + Sync>(&self, copier: &C) -> Result<(), TilingError> {
        use rayon::prelude::*;
        self.ops
            .par_iter()
            .try_for_each(|op| copier.copy_region(op))
    }
}

fn first_unmapped_cell(partitioning: &GridPartitioning, halo: Slice2D) -> TilingError {
    for row in halo.rows().from()..halo.rows().to() {
        for col in halo.cols().from()..halo.cols().to() {
            if partitioning.owner_of(row, col).is_none() {
                return TilingError::UnmappedCell { row, col };
            }
        }
    }
    // Owners overlap each other instead of leaving a gap; surface the halo
    // origin so the caller can locate the offending region.
    TilingError::UnmappedCell {
        row: halo.rows().from(),
        col: halo.cols().from(),
    }
}
