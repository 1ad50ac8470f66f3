//! Integer grid coordinates and neighbourhood offsets
//!
//! The tile grid uses screen convention: `x` grows to the right, `y` grows
//! downward, so the bottom map row has the largest `y` and "up" is `y - 1`.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// Continuous 2D vector used for wind and blast directions
pub type Vec2 = Vector2<f32>;

/// Position of a cell in the tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two cells
    pub fn distance(self, other: GridPos) -> f32 {
        let dx = (i64::from(self.x) - i64::from(other.x)) as f32;
        let dy = (i64::from(self.y) - i64::from(other.y)) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// The cell directly above (towards row 0)
    pub const fn up(self) -> GridPos {
        GridPos::new(self.x, self.y - 1)
    }

    /// All 8 surrounding cells, including ones outside any grid
    pub fn neighbors8(self) -> impl Iterator<Item = GridPos> {
        NEIGHBORS_8.iter().map(move |offset| self + *offset)
    }

    /// The 4 orthogonally adjacent cells, including ones outside any grid
    pub fn neighbors4(self) -> impl Iterator<Item = GridPos> {
        NEIGHBORS_4.iter().map(move |offset| self + *offset)
    }
}

/// Cells are ordered row-major (by `y`, then `x`) so sorted position lists
/// match the order of a top-to-bottom scan of the grid.
impl Ord for GridPos {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for GridPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Integer displacement between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridOffset {
    pub dx: i32,
    pub dy: i32,
}

impl GridOffset {
    pub const ZERO: GridOffset = GridOffset::new(0, 0);

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Diagonal offsets move along both axes at once
    pub const fn is_diagonal(self) -> bool {
        self.dx != 0 && self.dy != 0
    }

    /// Unit vector pointing along this offset (zero for `ZERO`)
    pub fn direction(self) -> Vec2 {
        let v = Vec2::new(self.dx as f32, self.dy as f32);
        let norm = v.norm();
        if norm > 0.0 {
            v / norm
        } else {
            Vec2::zeros()
        }
    }

    /// Snap to the dominant axis, keeping only its sign.
    ///
    /// Ties favour the horizontal axis.
    pub fn axis_aligned(self) -> GridOffset {
        if self.dx == 0 && self.dy == 0 {
            GridOffset::ZERO
        } else if self.dx.abs() >= self.dy.abs() {
            GridOffset::new(self.dx.signum(), 0)
        } else {
            GridOffset::new(0, self.dy.signum())
        }
    }
}

impl Add<GridOffset> for GridPos {
    type Output = GridPos;

    fn add(self, rhs: GridOffset) -> GridPos {
        GridPos::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub for GridPos {
    type Output = GridOffset;

    fn sub(self, rhs: GridPos) -> GridOffset {
        GridOffset::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Moore neighbourhood, row-major
pub const NEIGHBORS_8: [GridOffset; 8] = [
    GridOffset::new(-1, -1),
    GridOffset::new(0, -1),
    GridOffset::new(1, -1),
    GridOffset::new(-1, 0),
    GridOffset::new(1, 0),
    GridOffset::new(-1, 1),
    GridOffset::new(0, 1),
    GridOffset::new(1, 1),
];

/// Von Neumann neighbourhood: up, left, right, down
pub const NEIGHBORS_4: [GridOffset; 4] = [
    GridOffset::new(0, -1),
    GridOffset::new(-1, 0),
    GridOffset::new(1, 0),
    GridOffset::new(0, 1),
];
