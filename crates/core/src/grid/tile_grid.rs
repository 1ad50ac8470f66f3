//! Row-major arena of tiles
//!
//! The grid always holds exactly `width * height` tiles. Every position-based
//! accessor returns `None` outside the grid so callers can look up neighbours
//! near the map edge without bounds checks of their own.

use crate::core_types::{GridPos, Tile};
use crate::error::DestructionError;

#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Grid where every cell starts as a copy of `tile`
    ///
    /// # Errors
    /// Returns an error if either dimension is zero.
    pub fn filled(width: usize, height: usize, tile: &Tile) -> Result<Self, DestructionError> {
        Self::from_fn(width, height, |_| tile.clone())
    }

    /// Grid built cell by cell in row-major order
    ///
    /// # Errors
    /// Returns an error if either dimension is zero or does not fit in `i32`.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut make: impl FnMut(GridPos) -> Tile,
    ) -> Result<Self, DestructionError> {
        validate_dimensions(width, height)?;
        let mut tiles = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                tiles.push(make(GridPos::new(x as i32, y as i32)));
            }
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Wrap an existing row-major tile vector
    ///
    /// # Errors
    /// Returns an error if the vector length does not match the dimensions.
    pub fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Result<Self, DestructionError> {
        validate_dimensions(width, height)?;
        if tiles.len() != width * height {
            return Err(DestructionError::TileCountMismatch {
                expected: width * height,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Row-major index of `pos`, or `None` outside the grid
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    pub fn pos_of(&self, index: usize) -> GridPos {
        GridPos::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.index_of(pos).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, pos: GridPos) -> Option<&mut Tile> {
        let index = self.index_of(pos)?;
        Some(&mut self.tiles[index])
    }

    /// Replace the tile at `pos`; returns false outside the grid
    pub fn set(&mut self, pos: GridPos, tile: Tile) -> bool {
        match self.get_mut(pos) {
            Some(slot) => {
                *slot = tile;
                true
            }
            None => false,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.tiles.len()).map(|i| self.pos_of(i))
    }

    /// In-bounds cells of the 8-neighbourhood
    pub fn neighbors8(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.neighbors8().filter(|p| self.in_bounds(*p))
    }

    /// In-bounds cells of the 4-neighbourhood
    pub fn neighbors4(&self, pos: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        pos.neighbors4().filter(|p| self.in_bounds(*p))
    }

    pub fn is_bottom_row(&self, pos: GridPos) -> bool {
        self.in_bounds(pos) && pos.y as usize == self.height - 1
    }

    pub fn is_edge(&self, pos: GridPos) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    /// In-bounds positions within Euclidean `radius` of `center`, row-major
    ///
    /// The scan window is clipped to the grid first, so the work is bounded
    /// by the grid size however far away `center` is or however large
    /// `radius` gets. An infinite radius covers the whole grid.
    pub fn positions_in_radius(&self, center: GridPos, radius: f32) -> Vec<GridPos> {
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        // Saturating cast: infinity becomes i64::MAX
        let reach = radius.ceil() as i64;
        let (cx, cy) = (i64::from(center.x), i64::from(center.y));
        let x_min = cx.saturating_sub(reach).max(0);
        let x_max = cx.saturating_add(reach).min(self.width as i64 - 1);
        let y_min = cy.saturating_sub(reach).max(0);
        let y_max = cy.saturating_add(reach).min(self.height as i64 - 1);
        if x_min > x_max || y_min > y_max {
            return Vec::new();
        }

        let mut out = Vec::new();
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let pos = GridPos::new(x as i32, y as i32);
                if center.distance(pos) <= radius {
                    out.push(pos);
                }
            }
        }
        out
    }

    /// Whether nothing between `from` and `to` (endpoints excluded) blocks sight
    pub fn line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        let line = bresenham_line(from, to);
        if line.len() <= 2 {
            return true;
        }
        line[1..line.len() - 1]
            .iter()
            .all(|p| self.get(*p).map_or(true, |tile| !tile.blocks_sight()))
    }
}

fn validate_dimensions(width: usize, height: usize) -> Result<(), DestructionError> {
    if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(DestructionError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Cells on the Bresenham line from `from` to `to`, both endpoints included
pub fn bresenham_line(from: GridPos, to: GridPos) -> Vec<GridPos> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut line = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    loop {
        line.push(GridPos::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    line
}
