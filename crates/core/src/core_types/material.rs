//! Material catalog and damage-type aware damage formula
//!
//! Materials are immutable and shared between every tile of the same kind
//! through `Arc<Material>`. The catalog only hands out shared references,
//! so changing a material means registering a new entry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Hardness at or above which a movement-blocking tile carries load
pub const STRUCTURAL_HARDNESS: i32 = 50;

/// Kinds of damage understood by [`Material::calculate_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Blunt and piercing damage, reduced by hardness
    Physical,
    /// Blast damage, bypasses part of the hardness
    Explosive,
    /// Burning damage, reduced by fire resistance
    Fire,
    /// Lasers, plasma, lightning; barely resisted
    Energy,
    /// Acid. Soft materials dissolve, hard ones shrug it off
    Corrosive,
}

/// Physical properties of a terrain material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// 0-100, resists physical damage
    pub hardness: i32,
    pub max_hp: i32,
    /// 0-1 ignition probability factor; exactly 1.0 is fuel-grade
    pub flammability: f32,
    /// Turns of fuel before the material is consumed
    pub burn_duration: u32,
    /// 0-1 fraction of fire damage ignored
    pub fire_resistance: f32,
    /// Passes heat without burning itself (metal)
    pub conducts_fire: bool,
    /// Puts out adjacent fires (water)
    pub quenches_fire: bool,
    /// Cosmetic name of what is left after destruction
    pub debris_type: Option<String>,
    /// Cosmetic name of what is left after burning out
    pub burned_type: Option<String>,
}

impl Material {
    /// Create a material, clamping the probability-like fields to 0-1
    pub fn new(
        name: impl Into<String>,
        hardness: i32,
        max_hp: i32,
        flammability: f32,
        burn_duration: u32,
        fire_resistance: f32,
    ) -> Self {
        Self {
            name: name.into(),
            hardness: hardness.clamp(0, 100),
            max_hp: max_hp.max(1),
            flammability: flammability.clamp(0.0, 1.0),
            burn_duration,
            fire_resistance: fire_resistance.clamp(0.0, 1.0),
            conducts_fire: false,
            quenches_fire: false,
            debris_type: None,
            burned_type: None,
        }
    }

    pub fn with_debris(mut self, debris: impl Into<String>) -> Self {
        self.debris_type = Some(debris.into());
        self
    }

    pub fn with_burned(mut self, burned: impl Into<String>) -> Self {
        self.burned_type = Some(burned.into());
        self
    }

    pub fn conducting_fire(mut self) -> Self {
        self.conducts_fire = true;
        self
    }

    pub fn quenching_fire(mut self) -> Self {
        self.quenches_fire = true;
        self
    }

    pub fn is_flammable(&self) -> bool {
        self.flammability > 0.0
    }

    /// Fuel-grade materials detonate when destroyed by a blast
    pub fn is_fuel_grade(&self) -> bool {
        self.flammability >= 1.0
    }

    /// Damage multiplier for a damage type
    pub fn damage_multiplier(&self, damage_type: DamageType) -> f32 {
        let hardness = self.hardness as f32;
        match damage_type {
            DamageType::Physical => 1.0 - hardness / 200.0,
            DamageType::Explosive => 1.2 - hardness / 250.0,
            DamageType::Fire => 1.0 - self.fire_resistance,
            DamageType::Energy => 1.0 - hardness / 300.0,
            DamageType::Corrosive => {
                if self.hardness <= 50 {
                    1.5
                } else {
                    0.5
                }
            }
        }
    }

    /// Damage actually taken from `base_damage` of the given type.
    ///
    /// Always at least 1 so attrition progresses on every hit.
    pub fn calculate_damage(&self, base_damage: i32, damage_type: DamageType) -> i32 {
        let scaled = base_damage as f32 * self.damage_multiplier(damage_type);
        (scaled as i32).max(1)
    }

    // ------------------------------------------------------------------
    // Built-in materials
    // ------------------------------------------------------------------

    pub fn stone() -> Self {
        Material::new("Stone", 80, 100, 0.0, 0, 0.9)
            .with_debris("Rubble")
    }

    pub fn brick() -> Self {
        Material::new("Brick", 70, 80, 0.0, 0, 0.8)
            .with_debris("Rubble")
    }

    pub fn metal() -> Self {
        Material::new("Metal", 90, 150, 0.0, 0, 1.0)
            .conducting_fire()
            .with_debris("Scrap")
    }

    pub fn wood() -> Self {
        Material::new("Wood", 30, 20, 0.7, 10, 0.1)
            .with_debris("Splinters")
            .with_burned("Charcoal")
    }

    pub fn dirt() -> Self {
        Material::new("Dirt", 10, 30, 0.0, 0, 0.5)
    }

    pub fn grass() -> Self {
        Material::new("Grass", 5, 5, 0.9, 3, 0.0)
            .with_burned("Scorched Earth")
    }

    pub fn glass() -> Self {
        Material::new("Glass", 20, 10, 0.0, 0, 0.8)
            .with_debris("Shards")
    }

    pub fn water() -> Self {
        Material::new("Water", 0, 1000, 0.0, 0, 1.0).quenching_fire()
    }

    pub fn fuel_tank() -> Self {
        Material::new("Fuel Tank", 40, 25, 1.0, 2, 0.0)
            .with_debris("Scrap")
            .with_burned("Scorched Metal")
    }

    pub fn crate_wood() -> Self {
        Material::new("Crate", 20, 15, 0.8, 6, 0.0)
            .with_debris("Splinters")
            .with_burned("Charcoal")
    }
}

/// Lookup table of shared materials by name
#[derive(Debug, Clone, Default)]
pub struct MaterialCatalog {
    materials: FxHashMap<String, Arc<Material>>,
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog containing every built-in material
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for material in [
            Material::stone(),
            Material::brick(),
            Material::metal(),
            Material::wood(),
            Material::dirt(),
            Material::grass(),
            Material::glass(),
            Material::water(),
            Material::fuel_tank(),
            Material::crate_wood(),
        ] {
            catalog.register(material);
        }
        catalog
    }

    /// Add or replace a material, returning the shared handle
    pub fn register(&mut self, material: Material) -> Arc<Material> {
        let shared = Arc::new(material);
        self.materials
            .insert(shared.name.to_lowercase(), Arc::clone(&shared));
        shared
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<Arc<Material>> {
        self.materials.get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_damage_reduced_by_hardness() {
        let wood = Material::wood();
        // 25 * (1 - 30/200) = 21.25
        assert_eq!(wood.calculate_damage(25, DamageType::Physical), 21);

        let stone = Material::stone();
        // 27 * (1 - 80/200) = 16.2
        assert_eq!(stone.calculate_damage(27, DamageType::Physical), 16);
    }

    #[test]
    fn test_minimum_damage_floor() {
        let hardest = Material::new("Adamant", 100, 500, 0.0, 0, 1.0);
        assert_eq!(hardest.calculate_damage(1, DamageType::Physical), 1);
        assert_eq!(hardest.calculate_damage(0, DamageType::Physical), 1);
        assert_eq!(hardest.calculate_damage(50, DamageType::Fire), 1);
        assert!(hardest.calculate_damage(-10, DamageType::Explosive) >= 1);
    }

    #[test]
    fn test_explosive_bypasses_hardness() {
        let stone = Material::stone();
        let physical = stone.calculate_damage(100, DamageType::Physical);
        let explosive = stone.calculate_damage(100, DamageType::Explosive);
        assert!(explosive > physical);
        // 100 * (1.2 - 80/250) = 88
        assert_eq!(explosive, 88);
    }

    #[test]
    fn test_fire_and_energy_multipliers() {
        let wood = Material::wood();
        // 15 * (1 - 0.1) = 13.5
        assert_eq!(wood.calculate_damage(15, DamageType::Fire), 13);
        let stone = Material::stone();
        // 10 * (1 - 80/300) = 7.33
        assert_eq!(stone.calculate_damage(10, DamageType::Energy), 7);
    }

    #[test]
    fn test_corrosive_soft_vs_hard() {
        assert_eq!(Material::wood().calculate_damage(10, DamageType::Corrosive), 15);
        assert_eq!(Material::stone().calculate_damage(10, DamageType::Corrosive), 5);
        let boundary = Material::new("Boundary", 50, 10, 0.0, 0, 0.0);
        assert_eq!(boundary.calculate_damage(10, DamageType::Corrosive), 15);
    }

    #[test]
    fn test_constructor_clamps_probabilities() {
        let m = Material::new("Odd", 150, 0, 2.0, 1, -1.0);
        assert_eq!(m.hardness, 100);
        assert_eq!(m.max_hp, 1);
        assert_eq!(m.flammability, 1.0);
        assert_eq!(m.fire_resistance, 0.0);
    }

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        let catalog = MaterialCatalog::standard();
        assert_eq!(catalog.len(), 10);
        let tank = catalog.get("fuel tank").expect("fuel tank registered");
        assert!(tank.is_fuel_grade());
        assert!(catalog.get("WATER").is_some_and(|w| w.quenches_fire));
        assert!(catalog.get("unobtainium").is_none());
    }
}
