//! Core types and utilities

pub mod color;
pub mod grid_pos;
pub mod material;
pub mod rng;
pub mod tile;

pub use color::Color;
pub use grid_pos::{GridOffset, GridPos, Vec2, NEIGHBORS_4, NEIGHBORS_8};
pub use material::{DamageType, Material, MaterialCatalog, STRUCTURAL_HARDNESS};
pub use rng::{FixedRandom, RandomSource};
pub use tile::{DamageOutcome, DestructionStage, Tile, TileVisuals};
