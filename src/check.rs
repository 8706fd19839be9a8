//! Tiling-invariant validation for partitionings.
//!
//! A [`GridPartitioning`] must tile its extent: every region inside the
//! extent, no two regions overlapping, and the union covering the extent
//! exactly. The composer asserts this in debug builds after every
//! refinement level; tests call [`DebugInvariants::validate_invariants`]
//! directly.

use crate::error::TilingError;
use crate::partition::GridPartitioning;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds; no-op in release builds.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first violation encountered.
    fn validate_invariants(&self) -> Result<(), TilingError>;
}

impl DebugInvariants for GridPartitioning {
    fn debug_assert_invariants(&self) {
        #[cfg(debug_assertions)]
        if let Err(e) = self.validate_invariants() {
            panic!("[invariants] partitioning of {}: {e}", self.extent());
        }
    }

    fn validate_invariants(&self) -> Result<(), TilingError> {
        let extent = self.extent();
        let entries: Vec<_> = self.iter().collect();

        let mut covered = 0usize;
        for (target, slice) in &entries {
            if extent.intersect(*slice) != Some(*slice) {
                return Err(TilingError::RegionOutOfExtent {
                    target: *target,
                    region: *slice,
                    extent,
                });
            }
            covered += slice.cells();
        }

        // Sorting by row start lets the pairwise scan stop as soon as the
        // candidate's row band starts past the current region's end.
        let mut by_row = entries.clone();
        by_row.sort_by_key(|(_, s)| (s.rows().from(), s.cols().from()));
        for (i, (ta, sa)) in by_row.iter().enumerate() {
            for (tb, sb) in &by_row[i + 1..] {
                if sb.rows().from() >= sa.rows().to() {
                    break;
                }
                if sa.overlaps(*sb) {
                    return Err(TilingError::RegionOverlap { a: *ta, b: *tb });
                }
            }
        }

        // Disjoint regions inside the extent cover it exactly iff the cell
        // counts add up.
        if covered != extent.cells() {
            return Err(TilingError::CoverageGap {
                covered,
                expected: extent.cells(),
                extent,
            });
        }
        Ok(())
    }
}
