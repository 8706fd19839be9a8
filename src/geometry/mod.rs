//! Geometry primitives for structured-grid tilings.
//!
//! Everything in this crate speaks in terms of three small value types:
//! [`Range`] (a half-open interval of row or column indices), [`Size2D`]
//! (the extent of a whole grid) and [`Slice2D`] (a rectangular sub-region
//! of a grid). All three are plain immutable values; invariants are
//! enforced at construction and hold for the lifetime of the value.

use std::fmt;

/// A half-open interval `[from, to)` of grid indices.
///
/// # Invariant
/// `to > from`, so a `Range` is never empty. Deserialization funnels
/// through the same check, so a hand-edited dump cannot produce an
/// inverted range.
#[derive(Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RangeRepr")]
pub struct Range {
    from: usize,
    to: usize,
}

#[derive(serde::Deserialize)]
struct RangeRepr {
    from: usize,
    to: usize,
}

impl TryFrom<RangeRepr> for Range {
    type Error = String;

    fn try_from(repr: RangeRepr) -> Result<Self, Self::Error> {
        if repr.to > repr.from {
            Ok(Range { from: repr.from, to: repr.to })
        } else {
            Err(format!("empty range [{}, {})", repr.from, repr.to))
        }
    }
}

impl Range {
    /// Creates a new `Range` covering `[from, to)`.
    ///
    /// # Panics
    ///
    /// Panics if `to <= from`. An empty or inverted range is a caller bug
    /// (a misconfigured topology cannot produce a meaningful partition),
    /// so we fail fast rather than degrade.
    #[inline]
    pub fn new(from: usize, to: usize) -> Self {
        assert!(to > from, "Range must be non-empty: [{from}, {to})");
        Range { from, to }
    }

    #[inline]
    pub const fn from(self) -> usize {
        self.from
    }

    #[inline]
    pub const fn to(self) -> usize {
        self.to
    }

    /// Number of indices covered.
    #[inline]
    pub const fn len(self) -> usize {
        self.to - self.from
    }

    #[inline]
    pub const fn contains(self, idx: usize) -> bool {
        idx >= self.from && idx < self.to
    }

    /// Intersection with another range, `None` when they do not overlap.
    pub fn intersect(self, other: Range) -> Option<Range> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (to > from).then(|| Range { from, to })
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Extent of a full 2D grid, `rows x cols`, both non-zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Size2DRepr")]
pub struct Size2D {
    rows: usize,
    cols: usize,
}

#[derive(serde::Deserialize)]
struct Size2DRepr {
    rows: usize,
    cols: usize,
}

impl TryFrom<Size2DRepr> for Size2D {
    type Error = String;

    fn try_from(repr: Size2DRepr) -> Result<Self, Self::Error> {
        if repr.rows > 0 && repr.cols > 0 {
            Ok(Size2D { rows: repr.rows, cols: repr.cols })
        } else {
            Err(format!("degenerate grid size {}x{}", repr.rows, repr.cols))
        }
    }
}

impl Size2D {
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[inline]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0, "grid must have at least one row");
        assert!(cols > 0, "grid must have at least one column");
        Size2D { rows, cols }
    }

    #[inline]
    pub const fn rows(self) -> usize {
        self.rows
    }

    #[inline]
    pub const fn cols(self) -> usize {
        self.cols
    }

    /// Total cell count.
    #[inline]
    pub const fn cells(self) -> usize {
        self.rows * self.cols
    }

    /// The slice covering the whole grid.
    #[inline]
    pub fn full_slice(self) -> Slice2D {
        Slice2D::new(Range::new(0, self.rows), Range::new(0, self.cols))
    }
}

impl fmt::Display for Size2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A rectangular sub-region of a grid: a row range and a column range.
///
/// Immutable once constructed. Width and height are derived, never stored
/// out of sync with the ranges.
#[derive(Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Slice2D {
    rows: Range,
    cols: Range,
}

impl Slice2D {
    #[inline]
    pub const fn new(rows: Range, cols: Range) -> Self {
        Slice2D { rows, cols }
    }

    #[inline]
    pub const fn rows(self) -> Range {
        self.rows
    }

    #[inline]
    pub const fn cols(self) -> Range {
        self.cols
    }

    #[inline]
    pub const fn width(self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub const fn height(self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn size(self) -> Size2D {
        Size2D::new(self.height(), self.width())
    }

    #[inline]
    pub const fn cells(self) -> usize {
        self.width() * self.height()
    }

    #[inline]
    pub const fn contains(self, row: usize, col: usize) -> bool {
        self.rows.contains(row) && self.cols.contains(col)
    }

    /// Rectangle common to `self` and `other`, `None` when disjoint.
    ///
    /// The exchange planner uses this to clip a halo edge against each
    /// neighbouring region, since tile boundaries need not line up across
    /// a cut in the general decomposition.
    pub fn intersect(self, other: Slice2D) -> Option<Slice2D> {
        let rows = self.rows.intersect(other.rows)?;
        let cols = self.cols.intersect(other.cols)?;
        Some(Slice2D { rows, cols })
    }

    /// True when `other` covers some of the same cells.
    #[inline]
    pub fn overlaps(self, other: Slice2D) -> bool {
        self.intersect(other).is_some()
    }
}

impl fmt::Display for Slice2D {
    /// `WxH at (row:R,col:C)`, the rendering the diagnostic dumps use.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at (row:{},col:{})",
            self.width(),
            self.height(),
            self.rows.from(),
            self.cols.from()
        )
    }
}

impl fmt::Debug for Slice2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice2D {{ rows: {:?}, cols: {:?} }}", self.rows, self.cols)
    }
}
