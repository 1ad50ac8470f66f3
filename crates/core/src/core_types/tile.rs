//! Destructible terrain tile
//!
//! Every grid cell holds exactly one [`Tile`]. Tiles are never removed: damage
//! walks them down the [`DestructionStage`]s until they reach `Destroyed`,
//! which is terminal. A destroyed tile never blocks movement or sight and
//! never regains hit points.

use crate::core_types::material::{DamageType, Material, STRUCTURAL_HARDNESS};
use crate::core_types::rng::RandomSource;
use crate::core_types::Color;
use crate::fire::{FireIntensity, FireState};
use std::sync::Arc;

/// Chance that fire damage lights a flammable tile
const FIRE_DAMAGE_IGNITION_CHANCE: f32 = 0.3;
/// Chance that blast damage lights a flammable tile
const EXPLOSIVE_DAMAGE_IGNITION_CHANCE: f32 = 0.5;
/// Seconds between fire flicker frames
const FLICKER_INTERVAL: f32 = 0.15;

/// Damage stage derived from the hit point percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DestructionStage {
    /// Above 66%
    Intact,
    /// 34-66%
    Damaged,
    /// 1-33%
    HeavilyDamaged,
    /// 0% or below; terminal
    Destroyed,
}

impl DestructionStage {
    /// Stage for a hit point percentage in 0-100
    pub fn from_hp_percent(percent: f32) -> Self {
        if percent > 66.0 {
            DestructionStage::Intact
        } else if percent > 33.0 {
            DestructionStage::Damaged
        } else if percent > 0.0 {
            DestructionStage::HeavilyDamaged
        } else {
            DestructionStage::Destroyed
        }
    }

    pub fn from_hp(current_hp: i32, max_hp: i32) -> Self {
        if current_hp <= 0 || max_hp <= 0 {
            return DestructionStage::Destroyed;
        }
        Self::from_hp_percent(current_hp as f32 / max_hp as f32 * 100.0)
    }
}

/// Glyphs and colours for every destruction stage
#[derive(Debug, Clone, PartialEq)]
pub struct TileVisuals {
    pub intact: (char, Color),
    pub damaged: (char, Color),
    pub heavily_damaged: (char, Color),
    pub destroyed: (char, Color),
    /// Shown instead of `destroyed` when the material leaves debris
    pub debris: (char, Color),
    pub background: Color,
}

impl TileVisuals {
    /// Visuals that keep one glyph and darken it as the tile degrades
    pub fn uniform(glyph: char, color: Color) -> Self {
        Self {
            intact: (glyph, color),
            damaged: (glyph, color.dimmed(0.8)),
            heavily_damaged: (glyph, color.dimmed(0.6)),
            destroyed: ('.', Color::DARK_GRAY),
            debris: (',', color.dimmed(0.5)),
            background: Color::BLACK,
        }
    }

    /// Visuals for a wall-like tile that cracks as it degrades
    pub fn wall(glyph: char, color: Color) -> Self {
        Self {
            damaged: ('%', color.dimmed(0.85)),
            heavily_damaged: ('\u{2592}', color.dimmed(0.7)),
            debris: (';', color.dimmed(0.6)),
            ..Self::uniform(glyph, color)
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}

/// Result of a single [`Tile::take_damage`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOutcome {
    /// Hit points removed after material resistances
    pub damage_dealt: i32,
    /// This call moved the tile into `Destroyed`
    pub destroyed: bool,
    /// This call set the tile on fire
    pub ignited: bool,
}

/// One destructible grid cell
#[derive(Debug, Clone)]
pub struct Tile {
    visuals: TileVisuals,
    blocks_movement: bool,
    blocks_sight: bool,
    material: Arc<Material>,
    current_hp: i32,
    stage: DestructionStage,
    fire: FireState,

    // Cosmetic only
    flicker_timer: f32,
    flicker_frame: bool,
}

impl Tile {
    pub fn new(
        visuals: TileVisuals,
        material: Arc<Material>,
        blocks_movement: bool,
        blocks_sight: bool,
    ) -> Self {
        debug_assert!(material.max_hp > 0, "max_hp must be positive");
        let current_hp = material.max_hp;
        Self {
            visuals,
            blocks_movement,
            blocks_sight,
            material,
            current_hp,
            stage: DestructionStage::Intact,
            fire: FireState::default(),
            flicker_timer: 0.0,
            flicker_frame: false,
        }
    }

    /// Walkable, transparent tile
    pub fn floor(material: Arc<Material>, glyph: char, color: Color) -> Self {
        Self::new(TileVisuals::uniform(glyph, color), material, false, false)
    }

    /// Tile that blocks movement and sight
    pub fn wall(material: Arc<Material>, glyph: char, color: Color) -> Self {
        Self::new(TileVisuals::wall(glyph, color), material, true, true)
    }

    /// Tile that blocks movement but not sight (windows, tanks, furniture)
    pub fn obstacle(material: Arc<Material>, glyph: char, color: Color) -> Self {
        Self::new(TileVisuals::uniform(glyph, color), material, true, false)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn visuals(&self) -> &TileVisuals {
        &self.visuals
    }

    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> i32 {
        self.material.max_hp
    }

    pub fn stage(&self) -> DestructionStage {
        self.stage
    }

    pub fn fire(&self) -> &FireState {
        &self.fire
    }

    pub fn blocks_movement(&self) -> bool {
        self.blocks_movement
    }

    pub fn blocks_sight(&self) -> bool {
        self.blocks_sight
    }

    pub fn is_destroyed(&self) -> bool {
        self.stage == DestructionStage::Destroyed
    }

    pub fn is_flammable(&self) -> bool {
        self.material.is_flammable()
    }

    /// Load-bearing: blocks movement and is hard enough to carry weight
    pub fn is_structural(&self) -> bool {
        !self.is_destroyed()
            && self.blocks_movement
            && self.material.hardness >= STRUCTURAL_HARDNESS
    }

    /// Flammable and not already burning or burned out
    pub fn can_ignite(&self) -> bool {
        self.is_flammable() && self.fire.can_ignite()
    }

    /// Intact fire conductor: spread passes through it without igniting it
    pub fn conducts_heat(&self) -> bool {
        self.material.conducts_fire && !self.is_destroyed() && !self.can_ignite()
    }

    // ------------------------------------------------------------------
    // Damage
    // ------------------------------------------------------------------

    /// Apply `amount` of `damage_type` damage after material resistances.
    ///
    /// Fire and blast damage may set a flammable tile alight. A destroyed
    /// tile ignores further damage.
    pub fn take_damage(
        &mut self,
        amount: i32,
        damage_type: DamageType,
        rng: &mut dyn RandomSource,
    ) -> DamageOutcome {
        if self.is_destroyed() {
            return DamageOutcome::default();
        }

        let damage_dealt = self.material.calculate_damage(amount, damage_type);
        self.current_hp -= damage_dealt;
        self.refresh_stage();
        let destroyed = self.is_destroyed();

        let ignition_chance = match damage_type {
            DamageType::Fire => FIRE_DAMAGE_IGNITION_CHANCE,
            DamageType::Explosive => EXPLOSIVE_DAMAGE_IGNITION_CHANCE,
            _ => 0.0,
        };
        let ignited = ignition_chance > 0.0
            && self.can_ignite()
            && rng.chance(ignition_chance)
            && self.fire.ignite(FireIntensity::Spark);

        DamageOutcome {
            damage_dealt,
            destroyed,
            ignited,
        }
    }

    /// Force the tile into `Destroyed` regardless of hit points.
    ///
    /// Returns false if it already was.
    pub fn force_destroy(&mut self) -> bool {
        if self.is_destroyed() {
            return false;
        }
        self.current_hp = 0;
        self.refresh_stage();
        true
    }

    fn refresh_stage(&mut self) {
        self.stage = DestructionStage::from_hp(self.current_hp, self.material.max_hp);
        if self.stage == DestructionStage::Destroyed {
            self.blocks_movement = false;
            self.blocks_sight = false;
        }
    }

    // ------------------------------------------------------------------
    // Fire
    // ------------------------------------------------------------------

    /// Roll `flammability + bonus_chance` to catch fire at `Spark`
    pub fn try_ignite(&mut self, bonus_chance: f32, rng: &mut dyn RandomSource) -> bool {
        if !self.can_ignite() {
            return false;
        }
        if rng.chance(self.material.flammability + bonus_chance) {
            return self.fire.ignite(FireIntensity::Spark);
        }
        false
    }

    /// Deterministically light or intensify a fire on a flammable tile
    pub fn ignite(&mut self, intensity: FireIntensity) -> bool {
        if !self.is_flammable() {
            return false;
        }
        self.fire.ignite(intensity)
    }

    pub fn extinguish(&mut self) -> bool {
        self.fire.extinguish()
    }

    /// Advance the fire one turn, burning the tile's own fuel while the fire
    /// is in the burning band. Returns whether the fire is still active.
    pub fn advance_fire_turn(&mut self, rng: &mut dyn RandomSource) -> bool {
        let still_active = self.fire.advance();
        let intensity = self.fire.intensity();
        if intensity.is_burning() {
            let damage = intensity.data().damage_per_turn;
            if damage > 0 {
                self.take_damage(damage, DamageType::Fire, rng);
            }
        }
        still_active
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    pub fn current_glyph(&self) -> char {
        let intensity = self.fire.intensity();
        if intensity.is_active() {
            let glyph = intensity.data().glyph;
            if self.flicker_frame && intensity.is_burning() {
                return match glyph {
                    '^' => '*',
                    '*' => '^',
                    other => other,
                };
            }
            return glyph;
        }
        if intensity == FireIntensity::Ash {
            return intensity.data().glyph;
        }
        self.stage_visual().0
    }

    pub fn current_foreground(&self) -> Color {
        let intensity = self.fire.intensity();
        if intensity.is_active() || intensity == FireIntensity::Ash {
            let color = intensity.data().color;
            return if self.flicker_frame {
                color.dimmed(0.85)
            } else {
                color
            };
        }
        self.stage_visual().1
    }

    pub fn current_background(&self) -> Color {
        if self.fire.is_burning() {
            Color::rgb(60, 10, 0)
        } else {
            self.visuals.background
        }
    }

    fn stage_visual(&self) -> (char, Color) {
        match self.stage {
            DestructionStage::Intact => self.visuals.intact,
            DestructionStage::Damaged => self.visuals.damaged,
            DestructionStage::HeavilyDamaged => self.visuals.heavily_damaged,
            DestructionStage::Destroyed => {
                if self.material.debris_type.is_some() {
                    self.visuals.debris
                } else {
                    self.visuals.destroyed
                }
            }
        }
    }

    /// Advance cosmetic timers only
    pub fn tick_animation(&mut self, dt: f32) {
        if !self.fire.is_active() {
            self.flicker_timer = 0.0;
            self.flicker_frame = false;
            return;
        }
        self.flicker_timer += dt;
        while self.flicker_timer >= FLICKER_INTERVAL {
            self.flicker_timer -= FLICKER_INTERVAL;
            self.flicker_frame = !self.flicker_frame;
        }
    }
}
