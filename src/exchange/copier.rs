//! The region-copy seam between the planner and the external runtime.
//!
//! A real deployment implements [`RegionCopier`] on top of its runtime's
//! "issue data copy between two regions on two units" primitive. The crate
//! ships two implementations: [`NoCopier`] for tests that only care about
//! plan shape, and [`MailboxCopier`], an in-process reference that packs
//! source cells from a host-side grid into per-`(dst, dir)` mailboxes so
//! tests can compare exchanged values against direct grid reads.

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::TilingError;
use crate::exchange::CopyOp;
use crate::geometry::{Size2D, Slice2D};
use crate::halo::Direction;
use crate::partition::Target;

/// The external runtime's copy primitive.
///
/// Implementations must tolerate any issue order within one exchange round
/// (copies are commutative) and must be safe to call for `src == dst`
/// (a unit spanning a full toroidal dimension copies to itself).
pub trait RegionCopier {
    fn copy_region(&self, op: &CopyOp) -> Result<(), TilingError>;
}

/// Does nothing. Useful when a test only checks what a plan *would* copy.
#[derive(Clone, Debug, Default)]
pub struct NoCopier;

impl RegionCopier for NoCopier {
    fn copy_region(&self, _op: &CopyOp) -> Result<(), TilingError> {
        Ok(())
    }
}

/// An in-process reference copier backed by a host-side grid of `f32`
/// cells.
///
/// Each copy packs the source region (row-major) into a byte buffer and
/// appends it to the mailbox for `(dst, dir)`. The mailbox is owned by the
/// copier instance — partitionings, plans and copiers are all explicit
/// values, never process-global state.
pub struct MailboxCopier {
    grid: Size2D,
    cells: RwLock<Vec<f32>>,
    mailbox: DashMap<(Target, Direction), Vec<(Slice2D, Bytes)>>,
}

impl MailboxCopier {
    /// # Panics
    ///
    /// Panics if `cells.len()` does not match the grid.
    pub fn new(grid: Size2D, cells: Vec<f32>) -> Self {
        assert_eq!(
            cells.len(),
            grid.cells(),
            "cell buffer must match the grid extent"
        );
        MailboxCopier {
            grid,
            cells: RwLock::new(cells),
            mailbox: DashMap::new(),
        }
    }

    /// A grid initialised so cell `(r, c)` holds `r * cols + c`; handy for
    /// asserting exactly which cells a halo carried.
    pub fn with_coordinate_values(grid: Size2D) -> Self {
        let cells = (0..grid.cells()).map(|i| i as f32).collect();
        MailboxCopier::new(grid, cells)
    }

    #[inline]
    pub fn grid(&self) -> Size2D {
        self.grid
    }

    /// Replaces the host-side cell values (e.g. after a stencil step).
    /// Does not clear mailboxes; call [`MailboxCopier::drain`] between
    /// rounds.
    pub fn update_cells(&self, cells: Vec<f32>) {
        assert_eq!(cells.len(), self.grid.cells());
        *self.cells.write() = cells;
    }

    /// Row-major values of `region` read straight from the host grid.
    pub fn read_region(&self, region: Slice2D) -> Vec<f32> {
        let cells = self.cells.read();
        let cols = self.grid.cols();
        let mut out = Vec::with_capacity(region.cells());
        for row in region.rows().from()..region.rows().to() {
            let start = row * cols + region.cols().from();
            out.extend_from_slice(&cells[start..start + region.width()]);
        }
        out
    }

    /// Everything delivered into `dst`'s `dir`-side ghost cells this round:
    /// fragments ordered by source region (row, then column), values
    /// row-major within each fragment. `None` when nothing arrived.
    pub fn received(&self, dst: Target, dir: Direction) -> Option<Vec<f32>> {
        let entry = self.mailbox.get(&(dst, dir))?;
        let mut fragments: Vec<&(Slice2D, Bytes)> = entry.value().iter().collect();
        fragments.sort_by_key(|(region, _)| (region.rows().from(), region.cols().from()));
        let mut out = Vec::new();
        for (_, bytes) in fragments {
            // pod_collect_to_vec copes with the byte buffer's alignment.
            out.extend(bytemuck::pod_collect_to_vec::<u8, f32>(bytes));
        }
        Some(out)
    }

    /// Clears all mailboxes, ready for the next exchange round.
    pub fn drain(&self) {
        self.mailbox.clear();
    }
}

impl RegionCopier for MailboxCopier {
    fn copy_region(&self, op: &CopyOp) -> Result<(), TilingError> {
        let values = self.read_region(op.region);
        let packed = Bytes::copy_from_slice(bytemuck::cast_slice(&values));
        self.mailbox
            .entry((op.dst, op.dir))
            .or_default()
            .push((op.region, packed));
        Ok(())
    }
}
