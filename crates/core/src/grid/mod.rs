//! Tile storage and map construction

pub mod map_loader;
pub mod tile_grid;

pub use map_loader::{TileKind, TileLegend};
pub use tile_grid::{bresenham_line, TileGrid};
