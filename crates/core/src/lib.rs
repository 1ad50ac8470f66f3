//! Destructible terrain, fire, smoke, explosion and collapse simulation
//!
//! A turn-based engine for tile-grid games. Every tile has a material, hit
//! points and an embedded fire state. On top of the grid run:
//!
//! - a cellular-automaton fire with wind and water quenching
//! - an independent smoke grid that rises, drifts and thins
//! - area explosions with line of sight and queued chain reactions
//! - a structural support graph that brings down unsupported masonry
//!
//! [`DestructionManager`] owns the grid and sequences all of it. Every dice
//! roll goes through [`RandomSource`], so a seeded run is reproducible.
//!
//! ```
//! use destruction_sim_core::{
//!     BasicEntity, DestructionConfig, DestructionManager, ExplosionDescriptor, GridPos, TileLegend,
//! };
//!
//! let map = ["..F..", "..F..", "#####"];
//! let mut manager =
//!     DestructionManager::from_ascii(&map, &TileLegend::standard(), DestructionConfig::default())?;
//! let mut entities = vec![BasicEntity::new(1, "Scout", GridPos::new(0, 1), 30)];
//!
//! manager.trigger_explosion(GridPos::new(2, 0), &ExplosionDescriptor::rocket(), &mut entities);
//! manager.process_turn(&mut entities);
//! # Ok::<(), destruction_sim_core::DestructionError>(())
//! ```

pub mod core_types;
pub mod error;
pub mod explosion;
pub mod fire;
pub mod grid;
pub mod simulation;
pub mod smoke;
pub mod structural;

pub use core_types::{
    Color, DamageOutcome, DamageType, DestructionStage, FixedRandom, GridOffset, GridPos, Material,
    MaterialCatalog, RandomSource, Tile, TileVisuals, Vec2,
};
pub use error::DestructionError;
pub use explosion::{ChainReaction, ExplosionConfig, ExplosionDescriptor, ExplosionSystem, ExplosionTileHit};
pub use fire::{FireConfig, FireIntensity, FireSimulation, FireState, FireTurnReport};
pub use grid::{TileGrid, TileKind, TileLegend};
pub use simulation::{
    BasicEntity, DestructionConfig, DestructionEvent, DestructionManager, EntityDamageCause, TrackedEntity,
    TurnSummary,
};
pub use smoke::{SmokeConfig, SmokeDensity, SmokeSimulation};
pub use structural::{CollapseConfig, CollapseResult, CollapseSystem, FoundationRule, StructuralSupport};
