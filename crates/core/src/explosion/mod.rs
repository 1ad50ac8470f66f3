//! Area explosions and the secondary-explosion queue
//!
//! An explosion is resolved in two passes. The plan pass works on the grid
//! as it was before the blast: it picks every tile within the radius, checks
//! line of sight and computes each tile's damage from its distance alone.
//! The apply pass then deals that damage in row-major order. Walls the blast
//! knocks down therefore never unblock tiles behind them within the same
//! explosion.
//!
//! Fuel-grade tiles destroyed by a blast never detonate on the spot. They
//! queue a [`ExplosionDescriptor::fuel_explosion`] which the caller drains
//! with [`ExplosionSystem::process_chain_reactions`], one per call.

use crate::core_types::{Color, DamageOutcome, DamageType, GridPos, RandomSource};
use crate::error::DestructionError;
use crate::fire::FireIntensity;
use crate::grid::TileGrid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Explosion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionDescriptor {
    pub name: String,
    /// Damage at the centre before terrain scaling
    pub base_damage: i32,
    pub radius: f32,
    /// Exponent on `distance / radius`; higher keeps damage up further out
    pub falloff: f32,
    /// Tiles an entity at the centre is pushed
    pub knockback_force: i32,
    pub causes_fire: bool,
    /// Multiplier on damage dealt to terrain
    pub terrain_damage: f32,
    pub flash_color: Color,
}

impl ExplosionDescriptor {
    pub fn new(name: impl Into<String>, base_damage: i32, radius: f32, falloff: f32) -> Self {
        Self {
            name: name.into(),
            base_damage,
            radius,
            falloff,
            knockback_force: 0,
            causes_fire: false,
            terrain_damage: 1.0,
            flash_color: Color::YELLOW,
        }
    }

    pub fn with_knockback(mut self, force: i32) -> Self {
        self.knockback_force = force;
        self
    }

    pub fn with_fire(mut self) -> Self {
        self.causes_fire = true;
        self
    }

    pub fn with_terrain_damage(mut self, multiplier: f32) -> Self {
        self.terrain_damage = multiplier;
        self
    }

    pub fn with_flash(mut self, color: Color) -> Self {
        self.flash_color = color;
        self
    }

    // ------------------------------------------------------------------
    // Presets
    // ------------------------------------------------------------------

    pub fn grenade() -> Self {
        Self::new("Grenade", 20, 3.0, 1.0)
            .with_knockback(2)
            .with_flash(Color::YELLOW)
    }

    pub fn incendiary() -> Self {
        Self::new("Incendiary", 15, 3.0, 1.5)
            .with_knockback(1)
            .with_fire()
            .with_terrain_damage(0.5)
            .with_flash(Color::ORANGE)
    }

    /// Secondary blast of a destroyed fuel-grade tile
    pub fn fuel_explosion() -> Self {
        Self::new("Fuel Explosion", 30, 3.0, 1.0)
            .with_knockback(2)
            .with_fire()
            .with_terrain_damage(1.5)
            .with_flash(Color::ORANGE)
    }

    pub fn rocket() -> Self {
        Self::new("Rocket", 40, 4.0, 1.5)
            .with_knockback(3)
            .with_terrain_damage(2.0)
            .with_flash(Color::WHITE)
    }

    pub fn dynamite() -> Self {
        Self::new("Dynamite", 50, 4.0, 1.0)
            .with_knockback(3)
            .with_terrain_damage(3.0)
            .with_flash(Color::RED)
    }

    /// Fraction of the radius covered by `distance`, 0-1
    fn distance_ratio(&self, distance: f32) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        (distance / self.radius).clamp(0.0, 1.0)
    }

    /// Damage at `distance` from the centre; 0 outside the radius.
    ///
    /// `max(1, trunc(base * (1 - (d / r)^falloff)))`
    pub fn damage_at(&self, distance: f32) -> i32 {
        if distance > self.radius || self.base_damage <= 0 {
            return 0;
        }
        let ratio = self.distance_ratio(distance);
        let scaled = self.base_damage as f32 * (1.0 - ratio.powf(self.falloff));
        (scaled as i32).max(1)
    }

    /// Knockback in tiles at `distance`: `round(force * (1 - d / r))`
    pub fn knockback_at(&self, distance: f32) -> i32 {
        if distance > self.radius || self.knockback_force <= 0 {
            return 0;
        }
        let ratio = self.distance_ratio(distance);
        (self.knockback_force as f32 * (1.0 - ratio)).round() as i32
    }
}

/// Explosion tuning shared by every descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionConfig {
    /// Distance multiplier for tiles behind a sight-blocking tile
    pub blocked_distance_factor: f32,
    /// Ignition chance at the centre of a fire-causing blast
    pub ignition_factor: f32,
    /// Upper bound on queued explosions drained in one turn
    pub max_chain_per_turn: usize,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            blocked_distance_factor: 1.5,
            ignition_factor: 0.5,
            max_chain_per_turn: 256,
        }
    }
}

impl ExplosionConfig {
    /// # Errors
    /// Returns an error if the blocked factor is below 1, the ignition
    /// factor lies outside 0-1, or no chain reactions are allowed.
    pub fn validate(&self) -> Result<(), DestructionError> {
        if !self.blocked_distance_factor.is_finite() || self.blocked_distance_factor < 1.0 {
            return Err(DestructionError::invalid_config(
                "explosion.blocked_distance_factor",
                format!("must be at least 1, got {}", self.blocked_distance_factor),
            ));
        }
        if !(0.0..=1.0).contains(&self.ignition_factor) {
            return Err(DestructionError::invalid_config(
                "explosion.ignition_factor",
                format!("must be within 0-1, got {}", self.ignition_factor),
            ));
        }
        if self.max_chain_per_turn == 0 {
            return Err(DestructionError::invalid_config(
                "explosion.max_chain_per_turn",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Effect of one explosion on one tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionTileHit {
    pub position: GridPos,
    /// Distance used for damage; 1.5x the real distance when blocked
    pub distance: f32,
    /// Line of sight from the centre was blocked
    pub blocked: bool,
    /// Falloff damage before terrain scaling
    pub damage: i32,
    /// Hit points actually removed from the tile
    pub damage_dealt: i32,
    pub destroyed: bool,
    pub ignited: bool,
}

/// A queued explosion that went off
#[derive(Debug, Clone, PartialEq)]
pub struct ChainReaction {
    pub position: GridPos,
    pub descriptor: ExplosionDescriptor,
    pub hits: Vec<ExplosionTileHit>,
}

/// Explosion resolver plus the pending secondary-explosion queue
#[derive(Debug, Clone, Default)]
pub struct ExplosionSystem {
    config: ExplosionConfig,
    pending: VecDeque<(GridPos, ExplosionDescriptor)>,
}

impl ExplosionSystem {
    pub fn new(config: ExplosionConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &ExplosionConfig {
        &self.config
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Queue an explosion for a later [`Self::process_chain_reactions`]
    pub fn enqueue(&mut self, position: GridPos, descriptor: ExplosionDescriptor) {
        self.pending.push_back((position, descriptor));
    }

    /// Effective distance of `pos` from `center`, or `None` when the blast
    /// does not reach it. Evaluated against the grid as it is now.
    fn reach(&self, grid: &TileGrid, center: GridPos, pos: GridPos, radius: f32) -> Option<(f32, bool)> {
        let distance = center.distance(pos);
        if distance > radius {
            return None;
        }
        let blocked = !grid.line_of_sight(center, pos);
        let effective = if blocked {
            distance * self.config.blocked_distance_factor
        } else {
            distance
        };
        (effective <= radius).then_some((effective, blocked))
    }

    /// Detonate `descriptor` at `center` and damage the terrain around it.
    ///
    /// Returns one hit per affected tile in row-major order. An explosion
    /// centred outside the grid does nothing.
    pub fn explode(
        &mut self,
        grid: &mut TileGrid,
        center: GridPos,
        descriptor: &ExplosionDescriptor,
        rng: &mut dyn RandomSource,
    ) -> Vec<ExplosionTileHit> {
        if !grid.in_bounds(center) {
            return Vec::new();
        }

        let plan: Vec<(GridPos, f32, bool)> = grid
            .positions_in_radius(center, descriptor.radius)
            .into_iter()
            .filter_map(|pos| {
                self.reach(grid, center, pos, descriptor.radius)
                    .map(|(distance, blocked)| (pos, distance, blocked))
            })
            .collect();

        let mut hits = Vec::with_capacity(plan.len());
        for (pos, distance, blocked) in plan {
            let Some(tile) = grid.get_mut(pos) else {
                continue;
            };
            let damage = descriptor.damage_at(distance);
            let terrain_damage = (damage as f32 * descriptor.terrain_damage) as i32;

            let outcome = if terrain_damage > 0 {
                tile.take_damage(terrain_damage, DamageType::Explosive, rng)
            } else {
                DamageOutcome::default()
            };

            let mut ignited = outcome.ignited;
            if descriptor.causes_fire && tile.can_ignite() {
                let chance = self.config.ignition_factor * (1.0 - descriptor.distance_ratio(distance));
                if rng.chance(chance) {
                    ignited = tile.ignite(FireIntensity::Spark);
                }
            }

            if outcome.destroyed && tile.material().is_fuel_grade() {
                debug!(x = pos.x, y = pos.y, "fuel-grade tile destroyed, queueing secondary explosion");
                self.pending.push_back((pos, ExplosionDescriptor::fuel_explosion()));
            }

            hits.push(ExplosionTileHit {
                position: pos,
                distance,
                blocked,
                damage,
                damage_dealt: outcome.damage_dealt,
                destroyed: outcome.destroyed,
                ignited,
            });
        }

        info!(
            name = %descriptor.name,
            x = center.x,
            y = center.y,
            tiles = hits.len(),
            destroyed = hits.iter().filter(|h| h.destroyed).count(),
            pending = self.pending.len(),
            "explosion"
        );
        hits
    }

    /// Detonate the oldest queued explosion.
    ///
    /// Returns `None` once the queue is empty. Explosions queued by this one
    /// go to the back of the queue.
    pub fn process_chain_reactions(&mut self, grid: &mut TileGrid, rng: &mut dyn RandomSource) -> Option<ChainReaction> {
        let (position, descriptor) = self.pending.pop_front()?;
        let hits = self.explode(grid, position, &descriptor, rng);
        Some(ChainReaction {
            position,
            descriptor,
            hits,
        })
    }
}
