//! Destruction manager: owns the grid and every subsystem
//!
//! `DestructionManager` is the single entry point a game talks to. It
//! forwards damage, ignition and explosion requests to the subsystems, fans
//! out the secondary effects (collapses, knockback, entity damage) and
//! raises [`DestructionEvent`]s.
//!
//! One call to [`DestructionManager::process_turn`] runs, in this order:
//!
//! 1. the fire automaton
//! 2. smoke generation from this turn's fires
//! 3. smoke dispersal
//! 4. queued chain reactions, until the queue is empty
//! 5. fire damage to entities standing in burning tiles
//!
//! [`DestructionManager::update`] only advances cosmetic timers.

pub mod config;
pub mod effects;
pub mod entity;
pub mod events;

pub use config::{DestructionConfig, DEFAULT_SEED};
pub use effects::{CollapseEffect, ExplosionEffect, VisualEffects};
pub use entity::{BasicEntity, TrackedEntity};
pub use events::{DestructionEvent, EntityDamageCause, EventBus, EventListener, ListenerId};

use crate::core_types::{Color, DamageType, GridOffset, GridPos, RandomSource, Tile, Vec2};
use crate::error::DestructionError;
use crate::explosion::{ExplosionDescriptor, ExplosionSystem, ExplosionTileHit};
use crate::fire::{FireIntensity, FireSimulation, FireTurnReport};
use crate::grid::{TileGrid, TileLegend};
use crate::smoke::{SmokeDensity, SmokeSimulation};
use crate::structural::CollapseSystem;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// What one [`DestructionManager::process_turn`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// Turn number, starting at 1
    pub turn: u64,
    pub fire: FireTurnReport,
    pub chain_reactions: usize,
    pub collapsed: usize,
    pub entities_burned: usize,
    pub active_fires: usize,
    pub smoke_cells: usize,
}

/// Owner of the tile grid and coordinator of every destruction subsystem
pub struct DestructionManager {
    grid: TileGrid,
    fire: FireSimulation,
    smoke: SmokeSimulation,
    explosions: ExplosionSystem,
    collapse: CollapseSystem,
    events: EventBus,
    effects: VisualEffects,
    rng: Box<dyn RandomSource>,
    turn: u64,
}

impl DestructionManager {
    /// Take ownership of `grid`, seeding the dice from `config.seed`
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate.
    pub fn new(grid: TileGrid, config: DestructionConfig) -> Result<Self, DestructionError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(grid, config, rng)
    }

    /// Like [`Self::new`] with a caller-supplied random source
    ///
    /// # Errors
    /// Returns an error if the configuration does not validate.
    pub fn with_rng(
        grid: TileGrid,
        config: DestructionConfig,
        rng: impl RandomSource + 'static,
    ) -> Result<Self, DestructionError> {
        config.validate()?;
        let DestructionConfig {
            fire,
            smoke,
            explosion,
            collapse,
            seed,
        } = config;

        let mut manager = Self {
            smoke: SmokeSimulation::new(grid.width(), grid.height(), smoke),
            fire: FireSimulation::new(fire),
            explosions: ExplosionSystem::new(explosion),
            collapse: CollapseSystem::new(collapse),
            events: EventBus::default(),
            effects: VisualEffects::default(),
            rng: Box::new(rng),
            turn: 0,
            grid,
        };
        manager.fire.rebuild(&manager.grid);
        manager.collapse.rebuild_supports(&manager.grid);
        info!(
            width = manager.grid.width(),
            height = manager.grid.height(),
            seed,
            structural = manager.collapse.structural_count(),
            "destruction manager created"
        );
        Ok(manager)
    }

    /// Build the grid from ASCII rows, then [`Self::new`]
    ///
    /// # Errors
    /// Fails on a malformed map or an invalid configuration.
    pub fn from_ascii<S: AsRef<str>>(
        rows: &[S],
        legend: &TileLegend,
        config: DestructionConfig,
    ) -> Result<Self, DestructionError> {
        let grid = TileGrid::from_ascii(rows, legend)?;
        Self::new(grid, config)
    }

    /// Swap the random source, e.g. for a scripted test
    pub fn set_random_source(&mut self, rng: impl RandomSource + 'static) {
        self.rng = Box::new(rng);
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn subscribe(&mut self, listener: impl FnMut(&DestructionEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn events_emitted(&self) -> u64 {
        self.events.emitted()
    }

    fn emit(&mut self, event: DestructionEvent) {
        self.events.emit(&event);
    }

    // ========================================================================
    // Terrain damage
    // ========================================================================

    /// Damage one tile. Destruction triggers collapse checks, and debris
    /// lands on any entity standing on a collapsed tile.
    ///
    /// Returns whether this call destroyed the tile.
    pub fn damage_tile<E: TrackedEntity>(
        &mut self,
        pos: GridPos,
        amount: i32,
        damage_type: DamageType,
        entities: &mut [E],
    ) -> bool {
        let Some(tile) = self.grid.get_mut(pos) else {
            return false;
        };
        let outcome = tile.take_damage(amount, damage_type, self.rng.as_mut());

        if outcome.damage_dealt > 0 {
            self.emit(DestructionEvent::TileDamaged {
                position: pos,
                damage: outcome.damage_dealt,
            });
        }
        if outcome.ignited {
            self.fire.track(&self.grid, pos);
            self.emit(DestructionEvent::TileIgnited { position: pos });
        }
        if outcome.destroyed {
            self.on_destroyed(pos, entities);
        }
        outcome.destroyed
    }

    /// Bookkeeping for a tile destroyed outside an explosion
    fn on_destroyed<E: TrackedEntity>(&mut self, pos: GridPos, entities: &mut [E]) -> usize {
        self.emit(DestructionEvent::TileDestroyed { position: pos });
        if self.grid.get(pos).is_some_and(|t| t.material().is_fuel_grade()) {
            debug!(x = pos.x, y = pos.y, "fuel-grade tile destroyed, queueing secondary explosion");
            self.explosions.enqueue(pos, ExplosionDescriptor::fuel_explosion());
        }
        self.resolve_collapse(pos, entities)
    }

    /// Run the collapse check for a destroyed tile; returns tiles collapsed
    fn resolve_collapse<E: TrackedEntity>(&mut self, pos: GridPos, entities: &mut [E]) -> usize {
        let results = self
            .collapse
            .on_tile_destroyed(&mut self.grid, pos, self.rng.as_mut());

        for result in &results {
            self.effects.spawn_collapse(result.position);
            self.emit(DestructionEvent::TileCollapsed {
                position: result.position,
                debris_damage: result.debris_damage,
            });
            for entity in entities.iter_mut() {
                if !entity.is_alive() || entity.position() != result.position {
                    continue;
                }
                entity.take_damage(result.debris_damage);
                let event = DestructionEvent::EntityDamaged {
                    entity_id: entity.id(),
                    name: entity.name().to_string(),
                    damage: result.debris_damage,
                    cause: EntityDamageCause::Debris,
                };
                self.emit(event);
            }
        }
        results.len()
    }

    // ========================================================================
    // Explosions
    // ========================================================================

    /// Detonate `descriptor` at `pos` with full terrain and entity effects.
    ///
    /// Fuel-grade tiles destroyed by the blast only queue their own
    /// explosion; drain the queue with [`Self::process_chain_reaction`] or
    /// [`Self::process_turn`].
    pub fn trigger_explosion<E: TrackedEntity>(
        &mut self,
        pos: GridPos,
        descriptor: &ExplosionDescriptor,
        entities: &mut [E],
    ) -> Vec<ExplosionTileHit> {
        if !self.grid.in_bounds(pos) {
            return Vec::new();
        }
        self.emit(DestructionEvent::ExplosionTriggered {
            position: pos,
            descriptor: descriptor.clone(),
        });
        let hits = self
            .explosions
            .explode(&mut self.grid, pos, descriptor, self.rng.as_mut());
        self.apply_explosion(pos, descriptor, &hits, entities);
        hits
    }

    /// Detonate one queued chain-reaction explosion.
    ///
    /// Returns false once the queue is empty.
    pub fn process_chain_reaction<E: TrackedEntity>(&mut self, entities: &mut [E]) -> bool {
        let Some(chain) = self
            .explosions
            .process_chain_reactions(&mut self.grid, self.rng.as_mut())
        else {
            return false;
        };
        self.emit(DestructionEvent::ExplosionTriggered {
            position: chain.position,
            descriptor: chain.descriptor.clone(),
        });
        self.apply_explosion(chain.position, &chain.descriptor, &chain.hits, entities);
        true
    }

    /// Secondary effects of an explosion whose terrain damage is already done
    fn apply_explosion<E: TrackedEntity>(
        &mut self,
        center: GridPos,
        descriptor: &ExplosionDescriptor,
        hits: &[ExplosionTileHit],
        entities: &mut [E],
    ) -> usize {
        for hit in hits {
            if hit.damage_dealt > 0 {
                self.emit(DestructionEvent::TileDamaged {
                    position: hit.position,
                    damage: hit.damage_dealt,
                });
            }
            if hit.ignited {
                self.fire.track(&self.grid, hit.position);
                self.emit(DestructionEvent::TileIgnited { position: hit.position });
            }
        }

        // Distances are taken before anyone is pushed
        let targets: Vec<(usize, f32)> = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_alive())
            .map(|(i, e)| (i, center.distance(e.position())))
            .filter(|(_, d)| *d <= descriptor.radius)
            .collect();

        for &(index, distance) in &targets {
            let force = descriptor.knockback_at(distance);
            self.knock_back(&mut entities[index], center, force);
        }

        for &(index, distance) in &targets {
            let entity = &mut entities[index];
            if !entity.is_alive() {
                continue;
            }
            let damage = descriptor.damage_at(distance);
            if damage <= 0 {
                continue;
            }
            entity.take_damage(damage);
            let event = DestructionEvent::EntityDamaged {
                entity_id: entity.id(),
                name: entity.name().to_string(),
                damage,
                cause: EntityDamageCause::Explosion,
            };
            self.emit(event);
        }

        let mut collapsed = 0;
        for hit in hits.iter().filter(|h| h.destroyed) {
            self.emit(DestructionEvent::TileDestroyed { position: hit.position });
            collapsed += self.resolve_collapse(hit.position, entities);
        }

        self.smoke.clear_radius(center, descriptor.radius);
        self.effects
            .spawn_explosion(center, descriptor.radius, descriptor.flash_color);
        collapsed
    }

    /// Push `entity` up to `force` tiles straight away from `center`.
    ///
    /// The entity slides one tile at a time and stops at the first tile
    /// that blocks movement, taking 2 damage per tile of knockback left.
    fn knock_back<E: TrackedEntity>(&mut self, entity: &mut E, center: GridPos, force: i32) {
        if force <= 0 || !entity.is_alive() {
            return;
        }
        let start = entity.position();
        let direction = (start - center).axis_aligned();
        if direction == GridOffset::ZERO {
            return;
        }

        let mut position = start;
        let mut impact = 0;
        for step in 0..force {
            let next = position + direction;
            let open = self.grid.get(next).is_some_and(|t| !t.blocks_movement());
            if !open {
                impact = (force - step).saturating_mul(2);
                break;
            }
            position = next;
        }

        if position != start {
            entity.set_position(position);
            let event = DestructionEvent::EntityKnocked {
                entity_id: entity.id(),
                name: entity.name().to_string(),
                offset: position - start,
            };
            self.emit(event);
        }
        if impact > 0 {
            entity.take_damage(impact);
            let event = DestructionEvent::EntityDamaged {
                entity_id: entity.id(),
                name: entity.name().to_string(),
                damage: impact,
                cause: EntityDamageCause::Collision,
            };
            self.emit(event);
        }
    }

    // ========================================================================
    // Fire and smoke
    // ========================================================================

    /// Light a `Spark` (or intensify an existing fire)
    pub fn ignite_tile(&mut self, pos: GridPos) -> bool {
        self.ignite_tile_with(pos, FireIntensity::Spark)
    }

    pub fn ignite_tile_with(&mut self, pos: GridPos, intensity: FireIntensity) -> bool {
        let lit = self.fire.ignite(&mut self.grid, pos, intensity);
        if lit {
            self.emit(DestructionEvent::TileIgnited { position: pos });
        }
        lit
    }

    /// Put out the fire at `pos`. No fire, no event.
    pub fn extinguish_fire(&mut self, pos: GridPos) -> bool {
        let put_out = self.fire.extinguish(&mut self.grid, pos);
        if put_out {
            self.emit(DestructionEvent::FireExtinguished { position: pos });
        }
        put_out
    }

    pub fn extinguish_radius(&mut self, center: GridPos, radius: f32) -> Vec<GridPos> {
        let put_out = self.fire.extinguish_radius(&mut self.grid, center, radius);
        for pos in &put_out {
            self.emit(DestructionEvent::FireExtinguished { position: *pos });
        }
        put_out
    }

    pub fn add_smoke(&mut self, pos: GridPos, density: SmokeDensity) -> bool {
        self.smoke.add_smoke(pos, density)
    }

    /// Set the wind for both fire spread and smoke drift
    pub fn set_wind(&mut self, wind: Vec2, strength: f32) {
        self.fire.set_wind(wind, strength);
        self.smoke.set_wind(wind, strength);
    }

    // ========================================================================
    // Turn processing
    // ========================================================================

    /// Advance the simulation by one game turn
    pub fn process_turn<E: TrackedEntity>(&mut self, entities: &mut [E]) -> TurnSummary {
        self.turn += 1;
        let mut summary = TurnSummary {
            turn: self.turn,
            ..TurnSummary::default()
        };

        // 1. Fire
        let report = self.fire.process_turn(&mut self.grid, self.rng.as_mut());
        for pos in &report.extinguished {
            self.emit(DestructionEvent::FireExtinguished { position: *pos });
        }
        for pos in &report.ignited {
            self.emit(DestructionEvent::TileIgnited { position: *pos });
        }
        for pos in &report.destroyed {
            summary.collapsed += self.on_destroyed(*pos, entities);
        }

        // 2-3. Smoke sees this turn's fires before dispersing
        let fires = self.fire.active_fires(&self.grid);
        self.smoke.generate_from_fires(&fires, self.rng.as_mut());
        self.smoke.process_turn(self.rng.as_mut());

        // 4. Chain reactions
        let limit = self.explosions.config().max_chain_per_turn;
        while summary.chain_reactions < limit && self.process_chain_reaction(entities) {
            summary.chain_reactions += 1;
        }
        if self.explosions.pending_count() > 0 {
            warn!(
                pending = self.explosions.pending_count(),
                limit, "chain reaction limit reached, remaining explosions carried over"
            );
        }

        // 5. Entities standing in fire
        for entity in entities.iter_mut() {
            if !entity.is_alive() {
                continue;
            }
            let pos = entity.position();
            let Some(intensity) = self
                .grid
                .get(pos)
                .map(|t| t.fire().intensity())
                .filter(|i| i.is_burning())
            else {
                continue;
            };
            let damage = intensity.data().damage_per_turn;
            if damage <= 0 {
                continue;
            }
            entity.take_damage(damage);
            summary.entities_burned += 1;
            let event = DestructionEvent::EntityBurned {
                entity_id: entity.id(),
                name: entity.name().to_string(),
                damage,
            };
            self.emit(event);
        }

        summary.active_fires = self.fire.active_count();
        summary.smoke_cells = self.smoke.active_count();
        summary.fire = report;
        debug!(
            turn = summary.turn,
            fires = summary.active_fires,
            smoke = summary.smoke_cells,
            chain = summary.chain_reactions,
            collapsed = summary.collapsed,
            burned = summary.entities_burned,
            "turn processed"
        );
        summary
    }

    /// Advance cosmetic timers by `dt` seconds. Never touches hit points,
    /// fire state or structure.
    pub fn update(&mut self, dt: f32) {
        for tile in self.grid.tiles_mut() {
            tile.tick_animation(dt);
        }
        self.smoke.advance_animation(dt);
        self.effects.update(dt);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tile(&self, pos: GridPos) -> Option<&Tile> {
        self.grid.get(pos)
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn fire(&self) -> &FireSimulation {
        &self.fire
    }

    pub fn smoke(&self) -> &SmokeSimulation {
        &self.smoke
    }

    pub fn collapse(&self) -> &CollapseSystem {
        &self.collapse
    }

    pub fn pending_explosions(&self) -> usize {
        self.explosions.pending_count()
    }

    /// False outside the grid
    pub fn blocks_movement(&self, pos: GridPos) -> bool {
        self.grid.get(pos).is_some_and(Tile::blocks_movement)
    }

    /// False outside the grid
    pub fn blocks_sight(&self, pos: GridPos) -> bool {
        self.grid.get(pos).is_some_and(Tile::blocks_sight)
    }

    pub fn is_burning(&self, pos: GridPos) -> bool {
        self.grid.get(pos).is_some_and(|t| t.fire().is_active())
    }

    pub fn current_glyph(&self, pos: GridPos) -> Option<char> {
        self.grid.get(pos).map(Tile::current_glyph)
    }

    pub fn current_foreground(&self, pos: GridPos) -> Option<Color> {
        self.grid.get(pos).map(Tile::current_foreground)
    }

    pub fn current_background(&self, pos: GridPos) -> Option<Color> {
        self.grid.get(pos).map(Tile::current_background)
    }

    /// Active fire positions, row-major
    pub fn fire_positions(&self) -> Vec<GridPos> {
        self.fire.active_positions()
    }

    /// Smoky positions, row-major
    pub fn smoke_positions(&self) -> Vec<GridPos> {
        self.smoke.active_positions()
    }

    pub fn smoke_density(&self, pos: GridPos) -> SmokeDensity {
        self.smoke.density_at(pos)
    }

    /// Light levels removed by smoke at `pos`
    pub fn visibility_reduction(&self, pos: GridPos) -> i32 {
        self.smoke.visibility_reduction(pos)
    }

    pub fn explosion_effects(&self) -> &[ExplosionEffect] {
        self.effects.explosions()
    }

    pub fn collapse_effects(&self) -> &[CollapseEffect] {
        self.effects.collapses()
    }

    /// Terrain with smoke drawn over it, one string per row
    pub fn render_ascii(&self) -> Vec<String> {
        let mut rows = self.grid.render_ascii();
        for pos in self.smoke.active_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(pos.x), usize::try_from(pos.y)) else {
                continue;
            };
            // Fire shows through smoke
            if self.is_burning(pos) {
                continue;
            }
            let Some(glyph) = self.smoke.glyph_at(pos) else {
                continue;
            };
            if let Some(row) = rows.get_mut(y) {
                *row = row
                    .chars()
                    .enumerate()
                    .map(|(i, c)| if i == x { glyph } else { c })
                    .collect();
            }
        }
        rows
    }
}
