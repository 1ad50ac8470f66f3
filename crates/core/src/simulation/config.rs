//! Engine-wide configuration
//!
//! Every section has sensible defaults and derives serde, so a game can
//! keep its tuning in whatever format it already loads. Nothing here is
//! read from files or the environment by the engine itself.

use crate::error::DestructionError;
use crate::explosion::ExplosionConfig;
use crate::fire::FireConfig;
use crate::smoke::SmokeConfig;
use crate::structural::CollapseConfig;
use serde::{Deserialize, Serialize};

/// Seed used when none is given
pub const DEFAULT_SEED: u64 = 0x5EED_D357;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestructionConfig {
    pub fire: FireConfig,
    pub smoke: SmokeConfig,
    pub explosion: ExplosionConfig,
    pub collapse: CollapseConfig,
    /// Seed for the manager's default random source
    pub seed: u64,
}

impl Default for DestructionConfig {
    fn default() -> Self {
        Self {
            fire: FireConfig::default(),
            smoke: SmokeConfig::default(),
            explosion: ExplosionConfig::default(),
            collapse: CollapseConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl DestructionConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// # Errors
    /// Returns the first invalid field of any section.
    pub fn validate(&self) -> Result<(), DestructionError> {
        self.fire.validate()?;
        self.smoke.validate()?;
        self.explosion.validate()?;
        self.collapse.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DestructionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_sections_are_reported() {
        let mut config = DestructionConfig::default();
        config.fire.water_extinguish_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(DestructionError::InvalidConfig {
                field: "fire.water_extinguish_chance",
                ..
            })
        ));

        let mut config = DestructionConfig::default().with_seed(3);
        config.smoke.rise_chance = -0.1;
        assert!(config.validate().is_err());

        let mut config = DestructionConfig::default();
        config.collapse.debris_damage_base = -1;
        assert!(config.validate().is_err());

        let mut config = DestructionConfig::default();
        config.explosion.blocked_distance_factor = 0.5;
        assert!(config.validate().is_err());
    }
}
