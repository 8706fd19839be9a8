//! Halo derivation: the border regions a tile exchanges with its
//! neighbours.
//!
//! For a stencil update every leaf region needs one extra row/column of
//! cells along each side it shares with a neighbour, plus the four corner
//! cells. [`Halos`] computes those eight regions for a leaf slice relative
//! to the whole grid, either clamped at the grid edges ([`Halos::clamped`])
//! or wrapping around a periodic domain ([`Halos::toroidal`]).
//!
//! Row 0 is "north"; growing row indices move south, growing column
//! indices move east.

use crate::geometry::{Range, Size2D, Slice2D};
use std::fmt;

/// One of the eight compass directions a tile may exchange data in.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north. This order is fixed; exchange
    /// plans iterate it so their op sequence is reproducible.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// The direction data arrives from when sent towards `self`.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    /// True for the four corner directions (1x1 halos).
    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "N",
            Direction::NorthEast => "NE",
            Direction::East => "E",
            Direction::SouthEast => "SE",
            Direction::South => "S",
            Direction::SouthWest => "SW",
            Direction::West => "W",
            Direction::NorthWest => "NW",
        };
        f.write_str(s)
    }
}

/// The eight neighbour-facing border regions of one leaf slice.
///
/// Side halos are one cell deep and span the slice's width or height;
/// corner halos are exactly 1x1. A side is `None` when the slice sits on
/// that grid edge and the boundary is clamped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Halos {
    pub north: Option<Slice2D>,
    pub south: Option<Slice2D>,
    pub west: Option<Slice2D>,
    pub east: Option<Slice2D>,
    pub north_west: Option<Slice2D>,
    pub north_east: Option<Slice2D>,
    pub south_west: Option<Slice2D>,
    pub south_east: Option<Slice2D>,
}

impl Halos {
    /// Halos with the grid edges clamped (no wraparound): a direction is
    /// present iff the slice does not already touch that grid edge.
    pub fn clamped(slice: Slice2D, grid: Size2D) -> Halos {
        let top = slice.rows().from();
        let left = slice.cols().from();
        let bottom = slice.rows().to();
        let right = slice.cols().to();

        let has_n = top > 0;
        let has_s = bottom < grid.rows();
        let has_w = left > 0;
        let has_e = right < grid.cols();

        let row_above = || Range::new(top - 1, top);
        let row_below = || Range::new(bottom, bottom + 1);
        let col_left = || Range::new(left - 1, left);
        let col_right = || Range::new(right, right + 1);

        Halos {
            north: has_n.then(|| Slice2D::new(row_above(), slice.cols())),
            south: has_s.then(|| Slice2D::new(row_below(), slice.cols())),
            west: has_w.then(|| Slice2D::new(slice.rows(), col_left())),
            east: has_e.then(|| Slice2D::new(slice.rows(), col_right())),
            north_west: (has_n && has_w).then(|| Slice2D::new(row_above(), col_left())),
            north_east: (has_n && has_e).then(|| Slice2D::new(row_above(), col_right())),
            south_west: (has_s && has_w).then(|| Slice2D::new(row_below(), col_left())),
            south_east: (has_s && has_e).then(|| Slice2D::new(row_below(), col_right())),
        }
    }

    /// Halos on a periodic (toroidal) domain: neighbour rows and columns
    /// wrap modulo the grid size, so all eight directions are present.
    ///
    /// # Panics
    ///
    /// Panics unless `grid` is at least 3x3. On smaller grids a wrapped
    /// neighbour index lands back inside the slice itself (a unit becomes
    /// its own neighbour, or two neighbours coincide); callers wanting a
    /// recoverable check go through
    /// [`ExchangePlan::build`](crate::exchange::ExchangePlan::build).
    pub fn toroidal(slice: Slice2D, grid: Size2D) -> Halos {
        assert!(
            grid.rows() >= 3 && grid.cols() >= 3,
            "toroidal halos need a grid of at least 3x3, got {grid}"
        );

        let ny = grid.rows();
        let nx = grid.cols();
        let top = slice.rows().from();
        let left = slice.cols().from();

        let above = (top + ny - 1) % ny;
        let below = (top + slice.height()) % ny;
        let before = (left + nx - 1) % nx;
        let after = (left + slice.width()) % nx;

        let row_above = Range::new(above, above + 1);
        let row_below = Range::new(below, below + 1);
        let col_before = Range::new(before, before + 1);
        let col_after = Range::new(after, after + 1);

        Halos {
            north: Some(Slice2D::new(row_above, slice.cols())),
            south: Some(Slice2D::new(row_below, slice.cols())),
            west: Some(Slice2D::new(slice.rows(), col_before)),
            east: Some(Slice2D::new(slice.rows(), col_after)),
            north_west: Some(Slice2D::new(row_above, col_before)),
            north_east: Some(Slice2D::new(row_above, col_after)),
            south_west: Some(Slice2D::new(row_below, col_before)),
            south_east: Some(Slice2D::new(row_below, col_after)),
        }
    }

    /// The halo facing `dir`, if present.
    pub fn get(&self, dir: Direction) -> Option<Slice2D> {
        match dir {
            Direction::North => self.north,
            Direction::NorthEast => self.north_east,
            Direction::East => self.east,
            Direction::SouthEast => self.south_east,
            Direction::South => self.south,
            Direction::SouthWest => self.south_west,
            Direction::West => self.west,
            Direction::NorthWest => self.north_west,
        }
    }

    /// Present halos in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, Slice2D)> + '_ {
        Direction::ALL
            .iter()
            .filter_map(move |&dir| self.get(dir).map(|slice| (dir, slice)))
    }

    /// Number of directions with a halo present.
    pub fn present(&self) -> usize {
        self.iter().count()
    }
}
