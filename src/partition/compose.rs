//! Hierarchical composition: whole grid → unit groups → units → workers.
//!
//! Each level applies the one-level partitioner to every region of the level
//! above, re-keys the results by extending the target, and merges them into
//! one flat map (pure map union; no accumulator is mutated while being
//! iterated). For identical inputs the composed map and its iteration order
//! are always identical.

use crate::check::DebugInvariants;
use crate::error::TilingError;
use crate::geometry::{Range, Size2D, Slice2D};
use crate::partition::{GridPartitioning, Target, Topology, fair_shares, partition_level};

/// Splits the whole grid across `num_groups` unit groups, refusing layouts
/// where any group's share exceeds `max_cells_per_group`.
///
/// Group counts of 1, 2, 4, 8 and 16 use a fixed rectangular layout (the
/// power-of-two shapes real multi-accelerator rigs come in); 2 and 8 orient
/// the layout along whichever axis divides with less remainder. Any other
/// count is split along a single axis, better-balanced axis first, falling
/// back to the other axis when a share would bust the capacity limit.
///
/// Returns `None` when the topology cannot host the problem size; the
/// caller decides whether to retry with more groups or give up. Never
/// silently truncates data.
///
/// # Panics
///
/// Panics if `num_groups == 0`.
pub fn partition_across_groups(
    size: Size2D,
    num_groups: usize,
    max_cells_per_group: usize,
) -> Option<GridPartitioning> {
    assert!(num_groups > 0, "cannot partition across zero groups");

    // Lost cause: too much data for the whole topology.
    if size.cells() > max_cells_per_group.saturating_mul(num_groups) {
        return None;
    }

    let row_imbalance = (size.rows() % num_groups) as f64 / size.rows() as f64;
    let col_imbalance = (size.cols() % num_groups) as f64 / size.cols() as f64;

    let layout = match num_groups {
        1 => Some((1, 1)),
        2 if row_imbalance < col_imbalance => Some((2, 1)),
        2 => Some((1, 2)),
        4 => Some((2, 2)),
        8 if row_imbalance < col_imbalance => Some((4, 2)),
        8 => Some((2, 4)),
        16 => Some((4, 4)),
        _ => None,
    };

    if let Some((layout_rows, layout_cols)) = layout {
        return grid_layout_groups(size, layout_rows, layout_cols, max_cells_per_group);
    }

    // Odd group counts: one-axis split, most even axis first.
    if row_imbalance <= col_imbalance {
        row_split_groups(size, num_groups, max_cells_per_group)
            .or_else(|| col_split_groups(size, num_groups, max_cells_per_group))
    } else {
        col_split_groups(size, num_groups, max_cells_per_group)
            .or_else(|| row_split_groups(size, num_groups, max_cells_per_group))
    }
}

/// Lays groups out as a `layout_rows x layout_cols` grid of blocks, clamped
/// to the grid dimensions, shares distributed remainder-first. Group ids
/// run row-major over the layout.
fn grid_layout_groups(
    size: Size2D,
    layout_rows: usize,
    layout_cols: usize,
    max_cells_per_group: usize,
) -> Option<GridPartitioning> {
    let row_parts = layout_rows.min(size.rows());
    let col_parts = layout_cols.min(size.cols());
    let row_shares = fair_shares(size.rows(), row_parts);
    let col_shares = fair_shares(size.cols(), col_parts);

    let mut result = GridPartitioning::with_extent(size.full_slice());
    let mut row_from = 0;
    for (row, row_share) in row_shares.iter().enumerate() {
        let mut col_from = 0;
        for (col, col_share) in col_shares.iter().enumerate() {
            if row_share * col_share > max_cells_per_group {
                return None; // This share is too big; layout won't work.
            }
            result.insert(
                Target::group_level(row * layout_cols + col),
                Slice2D::new(
                    Range::new(row_from, row_from + row_share),
                    Range::new(col_from, col_from + col_share),
                ),
            );
            col_from += col_share;
        }
        row_from += row_share;
    }
    Some(result)
}

/// One band of rows per group, full grid width.
fn row_split_groups(
    size: Size2D,
    num_groups: usize,
    max_cells_per_group: usize,
) -> Option<GridPartitioning> {
    let groups_to_use = num_groups.min(size.rows());
    let mut result = GridPartitioning::with_extent(size.full_slice());
    let mut row_from = 0;
    for (group, share) in fair_shares(size.rows(), groups_to_use).iter().enumerate() {
        if share * size.cols() > max_cells_per_group {
            return None; // This chunk is too big; strategy won't work.
        }
        result.insert(
            Target::group_level(group),
            Slice2D::new(
                Range::new(row_from, row_from + share),
                Range::new(0, size.cols()),
            ),
        );
        row_from += share;
    }
    Some(result)
}

/// One band of columns per group, full grid height.
fn col_split_groups(
    size: Size2D,
    num_groups: usize,
    max_cells_per_group: usize,
) -> Option<GridPartitioning> {
    let groups_to_use = num_groups.min(size.cols());
    let mut result = GridPartitioning::with_extent(size.full_slice());
    let mut col_from = 0;
    for (group, share) in fair_shares(size.cols(), groups_to_use).iter().enumerate() {
        if share * size.rows() > max_cells_per_group {
            return None;
        }
        result.insert(
            Target::group_level(group),
            Slice2D::new(
                Range::new(0, size.rows()),
                Range::new(col_from, col_from + share),
            ),
        );
        col_from += share;
    }
    Some(result)
}

/// Refines every group region down to units, merging the per-group results
/// into one flat map keyed by `(group, unit)`.
pub fn refine_to_units(
    groups: &GridPartitioning,
    units_per_group: usize,
    min_rows: usize,
    min_cols: usize,
) -> GridPartitioning {
    let mut result = GridPartitioning::with_extent(groups.extent());
    for (target, group_slice) in groups.iter() {
        let units = partition_level(target, group_slice, units_per_group, min_rows, min_cols);
        for (unit_target, unit_slice) in units.iter() {
            debug_assert!(unit_target.unit() < units_per_group);
            result.insert(unit_target, unit_slice);
        }
    }
    result.debug_assert_invariants();
    result
}

/// Refines every unit region down to worker threads.
///
/// Workers get whichever one-axis split is more even: the axis with the
/// lower remainder-imbalance ratio `(dim % workers) / dim` wins, ties go to
/// rows. A unit too small to feed every worker uses fewer workers.
pub fn refine_to_workers(
    units: &GridPartitioning,
    workers_per_unit: usize,
) -> GridPartitioning {
    assert!(workers_per_unit > 0, "cannot refine for zero workers");

    let mut result = GridPartitioning::with_extent(units.extent());
    for (target, slice) in units.iter() {
        let row_imbalance =
            (slice.height() % workers_per_unit) as f64 / slice.height() as f64;
        let col_imbalance =
            (slice.width() % workers_per_unit) as f64 / slice.width() as f64;

        if row_imbalance <= col_imbalance {
            let workers_to_use = workers_per_unit.min(slice.height());
            let mut row_from = slice.rows().from();
            for (worker, share) in fair_shares(slice.height(), workers_to_use).iter().enumerate() {
                result.insert(
                    Target::new(target.group(), target.unit(), worker),
                    Slice2D::new(Range::new(row_from, row_from + share), slice.cols()),
                );
                row_from += share;
            }
        } else {
            let workers_to_use = workers_per_unit.min(slice.width());
            let mut col_from = slice.cols().from();
            for (worker, share) in fair_shares(slice.width(), workers_to_use).iter().enumerate() {
                result.insert(
                    Target::new(target.group(), target.unit(), worker),
                    Slice2D::new(slice.rows(), Range::new(col_from, col_from + share)),
                );
                col_from += share;
            }
        }
    }
    result.debug_assert_invariants();
    result
}

/// Composes all three levels for a whole grid under one [`Topology`].
///
/// Capacity failure surfaces as [`TilingError::CapacityExceeded`]; everything
/// else about the topology is either satisfiable (possibly with fewer units
/// populated than requested) or a precondition violation that panics.
pub fn partition_grid(size: Size2D, topology: &Topology) -> Result<GridPartitioning, TilingError> {
    let groups = partition_across_groups(size, topology.num_groups, topology.max_cells_per_group)
        .ok_or(TilingError::CapacityExceeded {
            cells: size.cells(),
            num_groups: topology.num_groups,
            max_cells_per_group: topology.max_cells_per_group,
        })?;
    let units = refine_to_units(
        &groups,
        topology.units_per_group,
        topology.min_rows_per_unit,
        topology.min_cols_per_unit,
    );
    let workers = refine_to_workers(&units, topology.workers_per_unit);
    log::debug!(
        "partitioned {size} grid into {} group(s), {} unit(s), {} worker region(s)",
        groups.len(),
        units.len(),
        workers.len()
    );
    Ok(workers)
}
