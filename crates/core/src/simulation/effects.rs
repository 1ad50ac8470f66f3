//! Cosmetic explosion flashes and collapse dust
//!
//! Effects only ever age through [`VisualEffects::update`]; nothing in the
//! simulation reads them.

use crate::core_types::{Color, GridPos};

/// Seconds an explosion flash stays on screen
pub const EXPLOSION_EFFECT_DURATION: f32 = 0.5;
/// Seconds collapse dust stays on screen
pub const COLLAPSE_EFFECT_DURATION: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionEffect {
    pub position: GridPos,
    pub radius: f32,
    pub elapsed: f32,
    pub duration: f32,
    pub color: Color,
}

impl ExplosionEffect {
    /// 0 when spawned, 1 when finished
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Radius of the expanding ring at the current progress
    pub fn current_radius(&self) -> f32 {
        self.radius * self.progress()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollapseEffect {
    pub position: GridPos,
    pub elapsed: f32,
    pub duration: f32,
}

impl CollapseEffect {
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisualEffects {
    explosions: Vec<ExplosionEffect>,
    collapses: Vec<CollapseEffect>,
}

impl VisualEffects {
    pub fn spawn_explosion(&mut self, position: GridPos, radius: f32, color: Color) {
        self.explosions.push(ExplosionEffect {
            position,
            radius,
            elapsed: 0.0,
            duration: EXPLOSION_EFFECT_DURATION,
            color,
        });
    }

    pub fn spawn_collapse(&mut self, position: GridPos) {
        self.collapses.push(CollapseEffect {
            position,
            elapsed: 0.0,
            duration: COLLAPSE_EFFECT_DURATION,
        });
    }

    pub fn explosions(&self) -> &[ExplosionEffect] {
        &self.explosions
    }

    pub fn collapses(&self) -> &[CollapseEffect] {
        &self.collapses
    }

    /// Age every effect by `dt` seconds and drop finished ones
    pub fn update(&mut self, dt: f32) {
        for effect in &mut self.explosions {
            effect.elapsed += dt;
        }
        for effect in &mut self.collapses {
            effect.elapsed += dt;
        }
        self.explosions.retain(|e| !e.is_finished());
        self.collapses.retain(|e| !e.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_effects_fade_out() {
        let mut effects = VisualEffects::default();
        effects.spawn_explosion(GridPos::new(2, 2), 3.0, Color::YELLOW);
        effects.spawn_collapse(GridPos::new(1, 1));

        effects.update(0.25);
        assert_eq!(effects.explosions().len(), 1);
        assert_relative_eq!(effects.explosions()[0].current_radius(), 1.5, epsilon = 1e-6);
        assert_relative_eq!(effects.collapses()[0].progress(), 0.25, epsilon = 1e-6);

        effects.update(0.3);
        assert!(effects.explosions().is_empty());
        assert_eq!(effects.collapses().len(), 1);

        effects.update(0.5);
        assert!(effects.collapses().is_empty());
    }
}
