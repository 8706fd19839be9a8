//! Grid partitioning: splitting one rectangular region across the compute
//! units of a single hierarchy level.
//!
//! The entry point is [`partition_level`], which picks one of four
//! strategies from the shape of the region relative to the minimum viable
//! chunk size, and always upholds the *tiling invariant*: the returned
//! sub-regions are pairwise disjoint and cover the input region exactly.
//! Hierarchy-level composition (grid → groups → units → workers) lives in
//! [`compose`].

pub mod compose;

use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::{Range, Slice2D};

#[cfg(test)]
mod tests;

/// Units (tiles) per unit group in the reference topology.
pub const DEFAULT_UNITS_PER_GROUP: usize = 1216;
/// Worker threads per unit in the reference topology.
pub const DEFAULT_WORKERS_PER_UNIT: usize = 6;
/// Below this many rows a chunk stops being worth a unit of its own.
pub const DEFAULT_MIN_ROWS_PER_UNIT: usize = 6;
/// Below this many columns a chunk stops being worth a unit of its own.
pub const DEFAULT_MIN_COLS_PER_UNIT: usize = 6;

// Strides of the linear order on Target, sized far above the fan-out of
// any hierarchy this crate targets (256 workers per unit, 65536 units per
// group). They give map ordering, nothing else.
const ORDER_UNIT_STRIDE: usize = 1 << 8;
const ORDER_GROUP_STRIDE: usize = 1 << 24;

/// Identifies one compute unit at up to three hierarchy levels:
/// unit group (e.g. an accelerator), unit (e.g. a tile on it), worker
/// (e.g. a hardware thread on the tile). Levels not applicable to a given
/// partitioning stage stay 0.
#[derive(Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Target {
    group: usize,
    unit: usize,
    worker: usize,
}

impl Target {
    #[inline]
    pub const fn new(group: usize, unit: usize, worker: usize) -> Self {
        Target { group, unit, worker }
    }

    /// A group-level target (`unit` and `worker` zero).
    #[inline]
    pub const fn group_level(group: usize) -> Self {
        Target::new(group, 0, 0)
    }

    /// A unit-level target (`worker` zero).
    #[inline]
    pub const fn unit_level(group: usize, unit: usize) -> Self {
        Target::new(group, unit, 0)
    }

    #[inline]
    pub const fn group(self) -> usize {
        self.group
    }

    #[inline]
    pub const fn unit(self) -> usize {
        self.unit
    }

    #[inline]
    pub const fn worker(self) -> usize {
        self.worker
    }

    /// The flat unit number an external runtime addresses:
    /// `group * units_per_group + unit`.
    #[inline]
    pub const fn virtual_unit(self, units_per_group: usize) -> usize {
        self.group * units_per_group + self.unit
    }

    /// Strict weighted linear index; the basis of the total order.
    #[inline]
    const fn linear_index(self) -> usize {
        self.group * ORDER_GROUP_STRIDE + self.unit * ORDER_UNIT_STRIDE + self.worker
    }
}

impl PartialOrd for Target {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.linear_index().cmp(&other.linear_index())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target({}, {}, {})", self.group, self.unit, self.worker)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}u{}w{}", self.group, self.unit, self.worker)
    }
}

/// The compute-unit hierarchy a grid is partitioned onto.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Topology {
    pub num_groups: usize,
    pub units_per_group: usize,
    pub workers_per_unit: usize,
    pub min_rows_per_unit: usize,
    pub min_cols_per_unit: usize,
    /// Per-group cell capacity; `usize::MAX` means unbounded.
    pub max_cells_per_group: usize,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            num_groups: 1,
            units_per_group: DEFAULT_UNITS_PER_GROUP,
            workers_per_unit: DEFAULT_WORKERS_PER_UNIT,
            min_rows_per_unit: DEFAULT_MIN_ROWS_PER_UNIT,
            min_cols_per_unit: DEFAULT_MIN_COLS_PER_UNIT,
            max_cells_per_group: usize::MAX,
        }
    }
}

/// An ordered mapping from [`Target`] to the rectangular region it owns,
/// together with the extent the regions tile.
///
/// Produced (and owned) by the partitioning routines; every consumer gets a
/// read-only view. Iteration order follows the `Target` linear order, so two
/// runs over identical inputs walk entries identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPartitioning {
    extent: Slice2D,
    map: BTreeMap<Target, Slice2D>,
}

impl GridPartitioning {
    /// An empty partitioning of `extent`.
    pub(crate) fn with_extent(extent: Slice2D) -> Self {
        GridPartitioning {
            extent,
            map: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, target: Target, slice: Slice2D) {
        debug_assert!(
            self.extent.intersect(slice) == Some(slice),
            "region {slice} escapes extent {}",
            self.extent
        );
        let prev = self.map.insert(target, slice);
        debug_assert!(prev.is_none(), "duplicate region for {target}");
    }

    /// The parent region this partitioning tiles.
    #[inline]
    pub fn extent(&self) -> Slice2D {
        self.extent
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn get(&self, target: Target) -> Option<Slice2D> {
        self.map.get(&target).copied()
    }

    /// Entries in deterministic (`Target` order) sequence.
    pub fn iter(&self) -> impl Iterator<Item = (Target, Slice2D)> + '_ {
        self.map.iter().map(|(t, s)| (*t, *s))
    }

    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.map.keys().copied()
    }

    /// The entry owning a single cell, if any.
    pub fn owner_of(&self, row: usize, col: usize) -> Option<(Target, Slice2D)> {
        self.iter().find(|(_, s)| s.contains(row, col))
    }

    /// All entries whose region overlaps `slice`, in deterministic order.
    pub fn owners_overlapping(
        &self,
        slice: Slice2D,
    ) -> impl Iterator<Item = (Target, Slice2D)> + '_ {
        self.iter().filter(move |(_, s)| s.overlaps(slice))
    }
}

/// Splits `length` into `parts` consecutive shares, remainder-first: the
/// first `length % parts` shares get one extra. Shares differ by at most 1.
///
/// # Panics
///
/// Panics if `parts == 0` or `parts > length` (a share of zero cells is
/// never meaningful; callers clamp the part count first).
pub fn fair_shares(length: usize, parts: usize) -> Vec<usize> {
    assert!(parts > 0, "cannot split into zero parts");
    assert!(
        parts <= length,
        "cannot split {length} cells into {parts} non-empty parts"
    );
    let base = length / parts;
    let extra = length % parts;
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}

/// Cuts `range` into `parts` consecutive sub-ranges via [`fair_shares`].
fn split_range(range: Range, parts: usize) -> Vec<Range> {
    let mut at = range.from();
    fair_shares(range.len(), parts)
        .into_iter()
        .map(|share| {
            let r = Range::new(at, at + share);
            at += share;
            r
        })
        .collect()
}

/// Splits `slice` among up to `num_units` identically-capable units at one
/// hierarchy level, keyed under `target`'s group.
///
/// Strategy selection, first match wins:
/// 1. *single-unit* — the region is smaller than one minimum chunk;
/// 2. *long-and-narrow* — too narrow to cut by columns, cut by rows;
/// 3. *short-and-wide* — too short to cut by rows, cut by columns;
/// 4. *general* — an aspect-ratio-aware grid of rectangles.
///
/// Units that cannot be given a viable chunk receive no entry; that is
/// under-provisioning, not an error. The result always tiles `slice`
/// exactly.
///
/// # Panics
///
/// Panics if `num_units == 0`.
pub fn partition_level(
    target: Target,
    slice: Slice2D,
    num_units: usize,
    min_rows: usize,
    min_cols: usize,
) -> GridPartitioning {
    assert!(num_units > 0, "cannot partition for zero units");
    assert!(min_rows > 0 && min_cols > 0, "minimum chunk must be non-empty");

    if slice.width() * slice.height() < min_cols * min_rows {
        log::debug!("{slice}: below minimum chunk, single-unit strategy");
        single_unit_strategy(target, slice)
    } else if slice.width() < min_cols {
        log::debug!("{slice}: long-and-narrow strategy over {num_units} unit(s)");
        long_and_narrow_strategy(target, slice, num_units, min_rows)
    } else if slice.height() < min_rows {
        log::debug!("{slice}: short-and-wide strategy over {num_units} unit(s)");
        short_and_wide_strategy(target, slice, num_units, min_cols)
    } else {
        log::debug!("{slice}: general grid strategy over {num_units} unit(s)");
        general_grid_strategy(target, slice, num_units, min_rows, min_cols)
    }
}

/// A problem so small the whole region goes to unit 0 of the group.
fn single_unit_strategy(target: Target, slice: Slice2D) -> GridPartitioning {
    let mut result = GridPartitioning::with_extent(slice);
    result.insert(Target::unit_level(target.group(), 0), slice);
    result
}

/// Narrower than the minimum chunk: chunk by rows only, respecting
/// `min_rows` per unit.
fn long_and_narrow_strategy(
    target: Target,
    slice: Slice2D,
    num_units: usize,
    min_rows: usize,
) -> GridPartitioning {
    let units_to_use = num_units.min(slice.height() / min_rows).max(1);
    if units_to_use < num_units {
        log::warn!(
            "{slice}: only {units_to_use} of {num_units} unit(s) usable at {min_rows} rows minimum"
        );
    }

    let mut result = GridPartitioning::with_extent(slice);
    for (unit, rows) in split_range(slice.rows(), units_to_use).into_iter().enumerate() {
        result.insert(
            Target::unit_level(target.group(), unit),
            Slice2D::new(rows, slice.cols()),
        );
    }
    result
}

/// Shorter than the minimum chunk: chunk by columns only, respecting
/// `min_cols` per unit.
fn short_and_wide_strategy(
    target: Target,
    slice: Slice2D,
    num_units: usize,
    min_cols: usize,
) -> GridPartitioning {
    let units_to_use = num_units.min(slice.width() / min_cols).max(1);
    if units_to_use < num_units {
        log::warn!(
            "{slice}: only {units_to_use} of {num_units} unit(s) usable at {min_cols} cols minimum"
        );
    }

    let mut result = GridPartitioning::with_extent(slice);
    for (unit, cols) in split_range(slice.cols(), units_to_use).into_iter().enumerate() {
        result.insert(
            Target::unit_level(target.group(), unit),
            Slice2D::new(slice.rows(), cols),
        );
    }
    result
}

/// The general case: overlay a `grid_rows x grid_cols` lattice of rectangles
/// whose shape tracks the region's aspect ratio, then hand out rectangles
/// row-major. Remainder rows and columns come first, so tall rows are
/// exhausted before non-tall rows and wide columns before non-wide ones.
fn general_grid_strategy(
    target: Target,
    slice: Slice2D,
    num_units: usize,
    min_rows: usize,
    min_cols: usize,
) -> GridPartitioning {
    let aspect_ratio =
        min_cols.max(slice.width()) as f64 / min_rows.max(slice.height()) as f64;

    let cols_cap = num_units.min(slice.width() / min_cols);
    let rows_cap = num_units.min(slice.height() / min_rows);
    let grid_cols = (((num_units as f64) * aspect_ratio).sqrt().ceil() as usize)
        .min(cols_cap)
        .max(1);
    let grid_rows = rows_cap.min(num_units / grid_cols).max(1);
    debug_assert!(grid_rows * grid_cols <= num_units);

    let row_cuts = split_range(slice.rows(), grid_rows);
    let col_cuts = split_range(slice.cols(), grid_cols);

    let mut result = GridPartitioning::with_extent(slice);
    let mut unit = 0;
    for rows in &row_cuts {
        for cols in &col_cuts {
            result.insert(
                Target::unit_level(target.group(), unit),
                Slice2D::new(*rows, *cols),
            );
            unit += 1;
        }
    }
    result
}
