//! Smoke grid
//!
//! Smoke lives on its own grid, independent of the tiles it drifts over.
//! Fires feed it once per turn; after that it only rises, drifts with the
//! wind, thins out and expires. Density never grows on its own: the only
//! way to make a cell denser is an explicit [`SmokeSimulation::add_smoke`].

use crate::core_types::{Color, GridPos, RandomSource, Vec2};
use crate::error::DestructionError;
use crate::fire::FireIntensity;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seconds between smoke glyph alternations
const SMOKE_ANIMATION_INTERVAL: f32 = 0.5;

/// Smoke thickness, ordered thinnest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum SmokeDensity {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

impl SmokeDensity {
    /// One level thinner; `None` stays `None`
    pub const fn weaker(self) -> SmokeDensity {
        match self {
            SmokeDensity::None | SmokeDensity::Light => SmokeDensity::None,
            SmokeDensity::Medium => SmokeDensity::Light,
            SmokeDensity::Heavy => SmokeDensity::Medium,
        }
    }

    /// Density given off by a fire of `intensity`
    pub const fn from_fire(intensity: FireIntensity) -> SmokeDensity {
        match intensity {
            FireIntensity::Inferno | FireIntensity::Blaze => SmokeDensity::Heavy,
            FireIntensity::Flame => SmokeDensity::Medium,
            FireIntensity::Smolder => SmokeDensity::Light,
            _ => SmokeDensity::None,
        }
    }

    /// How many light levels this smoke removes for the FOV collaborator
    pub const fn visibility_reduction(self) -> i32 {
        match self {
            SmokeDensity::None => 0,
            SmokeDensity::Light => 1,
            SmokeDensity::Medium => 2,
            SmokeDensity::Heavy => 3,
        }
    }

    pub const fn glyphs(self) -> (char, char) {
        match self {
            SmokeDensity::None => (' ', ' '),
            SmokeDensity::Light => ('\u{2591}', '.'),
            SmokeDensity::Medium => ('\u{2592}', '\u{2591}'),
            SmokeDensity::Heavy => ('\u{2593}', '\u{2592}'),
        }
    }

    pub const fn color(self) -> Color {
        match self {
            SmokeDensity::None => Color::BLACK,
            SmokeDensity::Light => Color::rgb(170, 170, 170),
            SmokeDensity::Medium => Color::GRAY,
            SmokeDensity::Heavy => Color::DARK_GRAY,
        }
    }
}

/// Smoke tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmokeConfig {
    /// Chance per burning tile per turn to emit smoke above itself
    pub generation_chance: f32,
    /// Chance of an extra, thinner puff beside the main one
    pub side_puff_chance: f32,
    /// Chance per turn that a smoke cell rises
    pub rise_chance: f32,
    /// Chance that rising smoke also drifts one cell sideways
    pub drift_chance: f32,
    /// Chance per turn that dense smoke thins by one level
    pub thin_chance: f32,
    /// Lifetime in turns of freshly generated light/medium/heavy smoke
    pub durations: [u32; 3],
    pub wind: Vec2,
    /// 0-1; also the chance per rise that the wind pushes the smoke
    pub wind_strength: f32,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            generation_chance: 0.6,
            side_puff_chance: 0.3,
            rise_chance: 0.5,
            drift_chance: 0.3,
            thin_chance: 0.2,
            durations: [3, 5, 8],
            wind: Vec2::zeros(),
            wind_strength: 0.0,
        }
    }
}

impl SmokeConfig {
    /// # Errors
    /// Returns an error if any chance lies outside 0-1.
    pub fn validate(&self) -> Result<(), DestructionError> {
        let chances = [
            ("smoke.generation_chance", self.generation_chance),
            ("smoke.side_puff_chance", self.side_puff_chance),
            ("smoke.rise_chance", self.rise_chance),
            ("smoke.drift_chance", self.drift_chance),
            ("smoke.thin_chance", self.thin_chance),
            ("smoke.wind_strength", self.wind_strength),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(DestructionError::invalid_config(
                    field,
                    format!("must be within 0-1, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Lifetime of fresh smoke at `density`
    pub fn duration_for(&self, density: SmokeDensity) -> u32 {
        match density {
            SmokeDensity::None => 0,
            SmokeDensity::Light => self.durations[0],
            SmokeDensity::Medium => self.durations[1],
            SmokeDensity::Heavy => self.durations[2],
        }
    }
}

/// One cell of the smoke grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmokeCell {
    pub density: SmokeDensity,
    pub remaining_duration: u32,
}

impl SmokeCell {
    pub fn is_present(&self) -> bool {
        self.density != SmokeDensity::None && self.remaining_duration > 0
    }

    /// Combine two cells that end up in the same place
    fn merge(self, other: SmokeCell) -> SmokeCell {
        SmokeCell {
            density: self.density.max(other.density),
            remaining_duration: self.remaining_duration.max(other.remaining_duration),
        }
    }
}

/// Smoke grid with its own active-cell index
#[derive(Debug, Clone)]
pub struct SmokeSimulation {
    config: SmokeConfig,
    width: i32,
    height: i32,
    cells: FxHashMap<GridPos, SmokeCell>,

    // Cosmetic only
    animation_timer: f32,
    animation_frame: bool,
}

impl SmokeSimulation {
    pub fn new(width: usize, height: usize, config: SmokeConfig) -> Self {
        Self {
            config,
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            cells: FxHashMap::default(),
            animation_timer: 0.0,
            animation_frame: false,
        }
    }

    pub fn config(&self) -> &SmokeConfig {
        &self.config
    }

    pub fn set_wind(&mut self, wind: Vec2, strength: f32) {
        self.config.wind = wind;
        self.config.wind_strength = strength.clamp(0.0, 1.0);
    }

    fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn cell(&self, pos: GridPos) -> SmokeCell {
        self.cells.get(&pos).copied().unwrap_or_default()
    }

    pub fn density_at(&self, pos: GridPos) -> SmokeDensity {
        self.cell(pos).density
    }

    pub fn visibility_reduction(&self, pos: GridPos) -> i32 {
        self.density_at(pos).visibility_reduction()
    }

    pub fn active_count(&self) -> usize {
        self.cells.len()
    }

    /// Smoky positions in row-major order
    pub fn active_positions(&self) -> Vec<GridPos> {
        let mut positions: Vec<GridPos> = self.cells.keys().copied().collect();
        positions.sort_unstable();
        positions
    }

    /// Glyph for the renderer, alternating between two shades over time
    pub fn glyph_at(&self, pos: GridPos) -> Option<char> {
        let cell = self.cells.get(&pos)?;
        let (a, b) = cell.density.glyphs();
        Some(if self.animation_frame { b } else { a })
    }

    /// Add smoke at `pos`. Thicker smoke replaces thinner smoke; the cell
    /// keeps the longer of the two lifetimes. Returns false outside the grid.
    pub fn add_smoke(&mut self, pos: GridPos, density: SmokeDensity) -> bool {
        self.add_smoke_for(pos, density, self.config.duration_for(density))
    }

    /// Like [`Self::add_smoke`] with an explicit lifetime
    pub fn add_smoke_for(&mut self, pos: GridPos, density: SmokeDensity, duration: u32) -> bool {
        if density == SmokeDensity::None || duration == 0 || !self.in_bounds(pos) {
            return false;
        }
        let fresh = SmokeCell {
            density,
            remaining_duration: duration,
        };
        let merged = self.cell(pos).merge(fresh);
        self.cells.insert(pos, merged);
        true
    }

    /// Remove all smoke within Euclidean `radius`; returns cells cleared
    pub fn clear_radius(&mut self, center: GridPos, radius: f32) -> usize {
        let before = self.cells.len();
        self.cells.retain(|pos, _| center.distance(*pos) > radius);
        before - self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Emit smoke above the given fires
    pub fn generate_from_fires(&mut self, fires: &[(GridPos, FireIntensity)], rng: &mut dyn RandomSource) {
        let mut ordered = fires.to_vec();
        ordered.sort_unstable_by_key(|(pos, _)| *pos);

        for (pos, intensity) in ordered {
            let density = SmokeDensity::from_fire(intensity);
            if density == SmokeDensity::None {
                continue;
            }
            if !rng.chance(self.config.generation_chance) {
                continue;
            }
            let above = pos.up();
            self.add_smoke(above, density);

            if rng.chance(self.config.side_puff_chance) {
                let side = GridPos::new(above.x + rng.sign(), above.y);
                self.add_smoke(side, density.weaker());
            }
        }
    }

    /// Age, rise, drift and thin every smoke cell by one turn
    pub fn process_turn(&mut self, rng: &mut dyn RandomSource) {
        let wind_step = wind_step(self.config.wind);
        let mut next: FxHashMap<GridPos, SmokeCell> = FxHashMap::default();
        let mut risen = 0usize;

        for pos in self.active_positions() {
            let mut cell = self.cell(pos);
            cell.remaining_duration = cell.remaining_duration.saturating_sub(1);
            if !cell.is_present() {
                continue;
            }

            let mut target = pos;
            if rng.chance(self.config.rise_chance) {
                let mut dx = 0;
                let mut dy = -1;
                if self.config.wind_strength > 0.0 && rng.chance(self.config.wind_strength) {
                    dx += wind_step.0;
                    dy += wind_step.1;
                }
                if rng.chance(self.config.drift_chance) {
                    dx += rng.sign();
                }
                target = GridPos::new(pos.x + dx, pos.y + dy);
                cell.density = cell.density.weaker();
                cell.remaining_duration = cell.remaining_duration.saturating_sub(1);
                if !cell.is_present() || !self.in_bounds(target) {
                    continue;
                }
                risen += 1;
            }

            if cell.density > SmokeDensity::Light && rng.chance(self.config.thin_chance) {
                cell.density = cell.density.weaker();
            }

            let merged = next.get(&target).map_or(cell, |existing| existing.merge(cell));
            next.insert(target, merged);
        }

        let before = self.cells.len();
        self.cells = next;
        if before > 0 {
            debug!(before, after = self.cells.len(), risen, "smoke turn processed");
        }
    }

    /// Advance cosmetic glyph alternation only
    pub fn advance_animation(&mut self, dt: f32) {
        self.animation_timer += dt;
        while self.animation_timer >= SMOKE_ANIMATION_INTERVAL {
            self.animation_timer -= SMOKE_ANIMATION_INTERVAL;
            self.animation_frame = !self.animation_frame;
        }
    }
}

/// Integer step the wind pushes smoke by
fn wind_step(wind: Vec2) -> (i32, i32) {
    let norm = wind.norm();
    if norm <= f32::EPSILON {
        return (0, 0);
    }
    let dir = wind / norm;
    (dir.x.round() as i32, dir.y.round() as i32)
}
