//! Cellular-automaton fire spread over the tile grid
//!
//! One call to [`FireSimulation::process_turn`] is one game turn:
//!
//! 1. fires next to water roll to be put out
//! 2. every other fire advances one turn of its state machine
//! 3. fires in the burning band roll to spread to their 8 neighbours
//! 4. queued ignitions are applied at `Spark`
//!
//! Ignitions are queued rather than applied mid-scan, so a tile lit this
//! turn neither burns nor spreads until the next one. Active fires are
//! visited in row-major order, which keeps seeded runs reproducible.

use crate::core_types::{GridOffset, GridPos, RandomSource, Vec2, NEIGHBORS_8};
use crate::error::DestructionError;
use crate::fire::FireIntensity;
use crate::grid::TileGrid;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Fire automaton tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireConfig {
    /// Chance per adjacent water tile to put a fire out each turn
    pub water_extinguish_chance: f32,
    /// Wind direction; normalised before use
    pub wind: Vec2,
    /// 0 disables wind, 1 is a strong gale
    pub wind_strength: f32,
    /// Spread bonus per unit of wind alignment and strength
    pub wind_spread_factor: f32,
    /// Spread multiplier towards diagonal neighbours
    pub diagonal_spread_penalty: f32,
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            water_extinguish_chance: 0.4,
            wind: Vec2::zeros(),
            wind_strength: 0.0,
            wind_spread_factor: 0.3,
            diagonal_spread_penalty: 0.7,
        }
    }
}

impl FireConfig {
    /// # Errors
    /// Returns an error for probabilities outside 0-1 or a negative wind strength.
    pub fn validate(&self) -> Result<(), DestructionError> {
        if !(0.0..=1.0).contains(&self.water_extinguish_chance) {
            return Err(DestructionError::invalid_config(
                "fire.water_extinguish_chance",
                format!("must be within 0-1, got {}", self.water_extinguish_chance),
            ));
        }
        if !(0.0..=1.0).contains(&self.diagonal_spread_penalty) {
            return Err(DestructionError::invalid_config(
                "fire.diagonal_spread_penalty",
                format!("must be within 0-1, got {}", self.diagonal_spread_penalty),
            ));
        }
        if !self.wind_strength.is_finite() || self.wind_strength < 0.0 {
            return Err(DestructionError::invalid_config(
                "fire.wind_strength",
                format!("must be finite and non-negative, got {}", self.wind_strength),
            ));
        }
        if !self.wind.x.is_finite() || !self.wind.y.is_finite() {
            return Err(DestructionError::invalid_config("fire.wind", "must be finite"));
        }
        Ok(())
    }
}

/// What happened during one fire turn
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireTurnReport {
    /// Put out by adjacent water
    pub extinguished: Vec<GridPos>,
    /// Reached ash (or otherwise stopped) this turn
    pub burned_out: Vec<GridPos>,
    /// Newly lit by spread, in row-major order
    pub ignited: Vec<GridPos>,
    /// Tiles whose own fire consumed them this turn
    pub destroyed: Vec<GridPos>,
}

impl FireTurnReport {
    pub fn is_empty(&self) -> bool {
        self.extinguished.is_empty()
            && self.burned_out.is_empty()
            && self.ignited.is_empty()
            && self.destroyed.is_empty()
    }
}

/// Fire automaton state: the set of active fires plus tuning
#[derive(Debug, Clone, Default)]
pub struct FireSimulation {
    config: FireConfig,
    active: FxHashSet<GridPos>,
}

impl FireSimulation {
    pub fn new(config: FireConfig) -> Self {
        Self {
            config,
            active: FxHashSet::default(),
        }
    }

    pub fn config(&self) -> &FireConfig {
        &self.config
    }

    pub fn set_wind(&mut self, wind: Vec2, strength: f32) {
        self.config.wind = wind;
        self.config.wind_strength = strength.max(0.0);
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_active(&self, pos: GridPos) -> bool {
        self.active.contains(&pos)
    }

    /// Active fire positions in row-major order
    pub fn active_positions(&self) -> Vec<GridPos> {
        let mut positions: Vec<GridPos> = self.active.iter().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Active fires with their current intensity, row-major
    pub fn active_fires(&self, grid: &TileGrid) -> Vec<(GridPos, FireIntensity)> {
        self.active_positions()
            .into_iter()
            .filter_map(|pos| grid.get(pos).map(|t| (pos, t.fire().intensity())))
            .collect()
    }

    /// Register a tile that caught fire outside the automaton
    /// (damage rolls, explosions). Ignored unless the tile really burns.
    pub fn track(&mut self, grid: &TileGrid, pos: GridPos) -> bool {
        match grid.get(pos) {
            Some(tile) if tile.fire().is_active() => self.active.insert(pos),
            _ => false,
        }
    }

    /// Rebuild the active set from the grid, e.g. after a map load
    pub fn rebuild(&mut self, grid: &TileGrid) {
        self.active = grid
            .positions()
            .filter(|pos| grid.get(*pos).is_some_and(|t| t.fire().is_active()))
            .collect();
    }

    /// Light a fire, or intensify one that is already burning
    pub fn ignite(&mut self, grid: &mut TileGrid, pos: GridPos, intensity: FireIntensity) -> bool {
        let Some(tile) = grid.get_mut(pos) else {
            return false;
        };
        if !tile.ignite(intensity) {
            return false;
        }
        self.active.insert(pos);
        trace!(x = pos.x, y = pos.y, ?intensity, "fire ignited");
        true
    }

    /// Put out the fire at `pos`. No-op without an active fire.
    pub fn extinguish(&mut self, grid: &mut TileGrid, pos: GridPos) -> bool {
        let Some(tile) = grid.get_mut(pos) else {
            return false;
        };
        let put_out = tile.extinguish();
        self.active.remove(&pos);
        put_out
    }

    /// Put out every fire within Euclidean `radius`; returns the cells put out
    pub fn extinguish_radius(&mut self, grid: &mut TileGrid, center: GridPos, radius: f32) -> Vec<GridPos> {
        grid.positions_in_radius(center, radius)
            .into_iter()
            .filter(|pos| self.extinguish(grid, *pos))
            .collect()
    }

    /// Probability that `water_tiles` adjacent water tiles put a fire out
    pub fn extinguish_probability(&self, water_tiles: usize) -> f32 {
        if water_tiles == 0 {
            return 0.0;
        }
        let exponent = i32::try_from(water_tiles).unwrap_or(i32::MAX);
        1.0 - (1.0 - self.config.water_extinguish_chance).powi(exponent)
    }

    /// Chance that a fire of `intensity` ignites the neighbour at `offset`
    /// with the given flammability
    pub fn spread_chance(&self, intensity: FireIntensity, flammability: f32, offset: GridOffset) -> f32 {
        let mut chance = intensity.data().spread_chance * flammability;

        let wind_norm = self.config.wind.norm();
        if self.config.wind_strength > 0.0 && wind_norm > 0.0 {
            let alignment = offset.direction().dot(&(self.config.wind / wind_norm));
            chance *= 1.0 + alignment * self.config.wind_strength * self.config.wind_spread_factor;
        }
        if offset.is_diagonal() {
            chance *= self.config.diagonal_spread_penalty;
        }
        chance.clamp(0.0, 1.0)
    }

    /// Run one turn of the automaton
    pub fn process_turn(&mut self, grid: &mut TileGrid, rng: &mut dyn RandomSource) -> FireTurnReport {
        let mut report = FireTurnReport::default();
        let mut queued: Vec<GridPos> = Vec::new();

        for pos in self.active_positions() {
            let Some(tile) = grid.get(pos) else {
                self.active.remove(&pos);
                continue;
            };
            if !tile.fire().is_active() {
                // Put out or burned out by something outside the automaton
                self.active.remove(&pos);
                continue;
            }

            // 1. Water
            let water = grid
                .neighbors8(pos)
                .filter(|n| grid.get(*n).is_some_and(|t| t.material().quenches_fire))
                .count();
            if water > 0 && rng.chance(self.extinguish_probability(water)) {
                if let Some(tile) = grid.get_mut(pos) {
                    tile.extinguish();
                }
                self.active.remove(&pos);
                report.extinguished.push(pos);
                continue;
            }

            // 2. Advance
            let Some(tile) = grid.get_mut(pos) else {
                continue;
            };
            let was_destroyed = tile.is_destroyed();
            let still_active = tile.advance_fire_turn(rng);
            if !was_destroyed && tile.is_destroyed() {
                report.destroyed.push(pos);
            }
            let intensity = tile.fire().intensity();
            if !still_active {
                self.active.remove(&pos);
                report.burned_out.push(pos);
                continue;
            }

            // 3. Spread
            if !intensity.is_burning() {
                continue;
            }
            for offset in NEIGHBORS_8 {
                let target = pos + offset;
                let Some(neighbor) = grid.get(target) else {
                    continue;
                };
                // Heat runs through an intact conductor to the cell behind it
                let (target, neighbor) = if neighbor.conducts_heat() {
                    let beyond = target + offset;
                    match grid.get(beyond) {
                        Some(tile) => (beyond, tile),
                        None => continue,
                    }
                } else {
                    (target, neighbor)
                };
                if !neighbor.can_ignite() {
                    continue;
                }
                let chance = self.spread_chance(intensity, neighbor.material().flammability, offset);
                if rng.chance(chance) {
                    queued.push(target);
                }
            }
        }

        // 4. Apply queued ignitions
        queued.sort_unstable();
        queued.dedup();
        for pos in queued {
            if let Some(tile) = grid.get_mut(pos) {
                if tile.can_ignite() && tile.ignite(FireIntensity::Spark) {
                    self.active.insert(pos);
                    report.ignited.push(pos);
                }
            }
        }

        if !report.is_empty() {
            debug!(
                active = self.active.len(),
                ignited = report.ignited.len(),
                extinguished = report.extinguished.len(),
                burned_out = report.burned_out.len(),
                destroyed = report.destroyed.len(),
                "fire turn processed"
            );
        }
        report
    }
}
