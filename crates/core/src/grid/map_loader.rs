//! ASCII map loading
//!
//! Maps are rows of glyphs; a [`TileLegend`] says which tile each glyph
//! becomes. The standard legend:
//!
//! - `#` stone wall
//! - `B` brick wall
//! - `=` metal wall
//! - `T` wooden wall
//! - `+` wooden door (blocks movement, not sight)
//! - `|` glass window
//! - `F` fuel tank
//! - `C` crate
//! - `.` dirt floor
//! - `"` grass
//! - `~` water

use crate::core_types::{Color, GridPos, Material, MaterialCatalog, Tile};
use crate::error::DestructionError;
use crate::grid::TileGrid;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::info;

/// How a legend entry blocks movement and sight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Walkable and transparent
    Floor,
    /// Blocks movement and sight
    Wall,
    /// Blocks movement only
    Obstacle,
}

/// Template a glyph expands to
#[derive(Debug, Clone)]
struct LegendEntry {
    material: Arc<Material>,
    kind: TileKind,
    color: Color,
}

/// Glyph to tile mapping used by [`TileGrid::from_ascii`]
#[derive(Debug, Clone, Default)]
pub struct TileLegend {
    entries: FxHashMap<char, LegendEntry>,
}

impl TileLegend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legend covering every built-in material
    pub fn standard() -> Self {
        let catalog = MaterialCatalog::standard();
        let mut legend = Self::new();
        let mut add = |glyph: char, name: &str, kind: TileKind, color: Color| {
            if let Some(material) = catalog.get(name) {
                legend.insert(glyph, material, kind, color);
            }
        };

        add('#', "stone", TileKind::Wall, Color::GRAY);
        add('B', "brick", TileKind::Wall, Color::RED.dimmed(0.7));
        add('=', "metal", TileKind::Wall, Color::CYAN);
        add('T', "wood", TileKind::Wall, Color::BROWN);
        add('+', "wood", TileKind::Obstacle, Color::BROWN);
        add('|', "glass", TileKind::Obstacle, Color::CYAN);
        add('F', "fuel tank", TileKind::Obstacle, Color::YELLOW);
        add('C', "crate", TileKind::Obstacle, Color::DARK_BROWN);
        add('.', "dirt", TileKind::Floor, Color::BROWN);
        add('"', "grass", TileKind::Floor, Color::GREEN);
        add('~', "water", TileKind::Floor, Color::BLUE);
        legend
    }

    /// Map `glyph` to a tile of `material`; replaces any previous entry
    pub fn insert(&mut self, glyph: char, material: Arc<Material>, kind: TileKind, color: Color) {
        self.entries.insert(glyph, LegendEntry { material, kind, color });
    }

    pub fn contains(&self, glyph: char) -> bool {
        self.entries.contains_key(&glyph)
    }

    /// Fresh tile for `glyph`, or `None` if the legend does not know it
    pub fn tile_for(&self, glyph: char) -> Option<Tile> {
        let entry = self.entries.get(&glyph)?;
        let material = Arc::clone(&entry.material);
        Some(match entry.kind {
            TileKind::Floor => Tile::floor(material, glyph, entry.color),
            TileKind::Wall => Tile::wall(material, glyph, entry.color),
            TileKind::Obstacle => Tile::obstacle(material, glyph, entry.color),
        })
    }
}

impl TileGrid {
    /// Build a grid from equally wide rows of legend glyphs
    ///
    /// # Errors
    /// Fails on an empty map, rows of different widths, or a glyph the
    /// legend does not know.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S], legend: &TileLegend) -> Result<TileGrid, DestructionError> {
        let Some(first) = rows.first() else {
            return Err(DestructionError::EmptyMap);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(DestructionError::EmptyMap);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != width {
                return Err(DestructionError::RaggedMap {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = legend
                    .tile_for(glyph)
                    .ok_or(DestructionError::UnknownGlyph { glyph, x, y })?;
                tiles.push(tile);
            }
        }

        let grid = TileGrid::from_tiles(width, rows.len(), tiles)?;
        info!(width, height = rows.len(), "loaded ascii map");
        Ok(grid)
    }

    /// Current glyph of every tile, one string per row
    pub fn render_ascii(&self) -> Vec<String> {
        (0..self.height())
            .map(|y| {
                (0..self.width())
                    .filter_map(|x| {
                        self.get(GridPos::new(x as i32, y as i32))
                            .map(Tile::current_glyph)
                    })
                    .collect()
            })
            .collect()
    }
}
