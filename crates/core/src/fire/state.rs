//! Per-tile fire state machine
//!
//! A fire walks a fixed ladder of intensities:
//!
//! `Spark → Smolder → Flame → Blaze → Inferno → Dying → Ash`
//!
//! Each rung lasts a fixed number of turns from [`FireIntensity::data`].
//! `Smolder..=Inferno` is the burning band: only those intensities damage
//! the tile they sit on, spread to neighbours and give off smoke. `Ash` is
//! a terminal cosmetic marker that can never re-ignite.

use crate::core_types::Color;
use serde::{Deserialize, Serialize};

/// Fire intensity, ordered from no fire to ash
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum FireIntensity {
    /// No fire has ever been present (or it was put out)
    #[default]
    None,
    Spark,
    Smolder,
    Flame,
    Blaze,
    Inferno,
    Dying,
    /// Burned out; terminal
    Ash,
}

/// Static behaviour of one fire intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireIntensityData {
    /// Damage per turn to the burning tile and anything standing in it
    pub damage_per_turn: i32,
    /// Base chance to ignite a fully flammable neighbour each turn
    pub spread_chance: f32,
    pub light_radius: i32,
    /// Turns spent at this intensity before progressing
    pub duration: u32,
    pub glyph: char,
    pub color: Color,
}

const NO_FIRE: FireIntensityData = FireIntensityData {
    damage_per_turn: 0,
    spread_chance: 0.0,
    light_radius: 0,
    duration: 0,
    glyph: ' ',
    color: Color::BLACK,
};

impl FireIntensity {
    /// Every intensity in ladder order
    pub const ALL: [FireIntensity; 8] = [
        FireIntensity::None,
        FireIntensity::Spark,
        FireIntensity::Smolder,
        FireIntensity::Flame,
        FireIntensity::Blaze,
        FireIntensity::Inferno,
        FireIntensity::Dying,
        FireIntensity::Ash,
    ];

    pub const fn data(self) -> FireIntensityData {
        match self {
            FireIntensity::None => NO_FIRE,
            FireIntensity::Spark => FireIntensityData {
                damage_per_turn: 0,
                spread_chance: 0.0,
                light_radius: 1,
                duration: 1,
                glyph: '\'',
                color: Color::YELLOW,
            },
            FireIntensity::Smolder => FireIntensityData {
                damage_per_turn: 1,
                spread_chance: 0.1,
                light_radius: 2,
                duration: 3,
                glyph: ',',
                color: Color::rgb(200, 80, 20),
            },
            FireIntensity::Flame => FireIntensityData {
                damage_per_turn: 2,
                spread_chance: 0.25,
                light_radius: 3,
                duration: 4,
                glyph: '^',
                color: Color::ORANGE,
            },
            FireIntensity::Blaze => FireIntensityData {
                damage_per_turn: 4,
                spread_chance: 0.4,
                light_radius: 4,
                duration: 3,
                glyph: '*',
                color: Color::rgb(255, 100, 0),
            },
            FireIntensity::Inferno => FireIntensityData {
                damage_per_turn: 6,
                spread_chance: 0.6,
                light_radius: 5,
                duration: 2,
                glyph: '&',
                color: Color::RED,
            },
            FireIntensity::Dying => FireIntensityData {
                damage_per_turn: 1,
                spread_chance: 0.05,
                light_radius: 2,
                duration: 3,
                glyph: '~',
                color: Color::rgb(150, 60, 20),
            },
            FireIntensity::Ash => FireIntensityData {
                glyph: '.',
                color: Color::DARK_GRAY,
                ..NO_FIRE
            },
        }
    }

    /// Next rung of the ladder; `None` and `Ash` stay where they are
    pub const fn next(self) -> FireIntensity {
        match self {
            FireIntensity::None => FireIntensity::None,
            FireIntensity::Spark => FireIntensity::Smolder,
            FireIntensity::Smolder => FireIntensity::Flame,
            FireIntensity::Flame => FireIntensity::Blaze,
            FireIntensity::Blaze => FireIntensity::Inferno,
            FireIntensity::Inferno => FireIntensity::Dying,
            FireIntensity::Dying | FireIntensity::Ash => FireIntensity::Ash,
        }
    }

    /// Spark through Dying
    pub const fn is_active(self) -> bool {
        !matches!(self, FireIntensity::None | FireIntensity::Ash)
    }

    /// Smolder through Inferno: damages, spreads and smokes
    pub const fn is_burning(self) -> bool {
        matches!(
            self,
            FireIntensity::Smolder
                | FireIntensity::Flame
                | FireIntensity::Blaze
                | FireIntensity::Inferno
        )
    }
}

/// Fire embedded in a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FireState {
    intensity: FireIntensity,
    /// Turns until forced progression
    remaining_duration: u32,
}

impl FireState {
    pub fn intensity(&self) -> FireIntensity {
        self.intensity
    }

    pub fn remaining_duration(&self) -> u32 {
        self.remaining_duration
    }

    pub fn is_active(&self) -> bool {
        self.intensity.is_active()
    }

    pub fn is_burning(&self) -> bool {
        self.intensity.is_burning()
    }

    pub fn is_ash(&self) -> bool {
        self.intensity == FireIntensity::Ash
    }

    /// A fresh fire can start here (no active fire, not ash)
    pub fn can_ignite(&self) -> bool {
        self.intensity == FireIntensity::None
    }

    /// Start a fire at `intensity`, or intensify the current one.
    ///
    /// An active fire is bumped to the next rung of the burning band; at
    /// `Inferno` its duration is extended instead, and a `Dying` fire is
    /// rekindled to `Smolder`. Returns false for ash or a non-fire target.
    pub fn ignite(&mut self, intensity: FireIntensity) -> bool {
        if !intensity.is_active() || self.is_ash() {
            return false;
        }
        match self.intensity {
            FireIntensity::None => self.set(intensity),
            FireIntensity::Inferno => {
                self.remaining_duration += FireIntensity::Inferno.data().duration;
            }
            FireIntensity::Dying => self.set(FireIntensity::Smolder),
            current => self.set(current.next()),
        }
        true
    }

    /// Advance one turn: count down, and progress to the next rung when the
    /// countdown expires. Returns whether the fire is still active.
    pub fn advance(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.remaining_duration = self.remaining_duration.saturating_sub(1);
        if self.remaining_duration == 0 {
            self.set(self.intensity.next());
        }
        self.is_active()
    }

    /// Put the fire out. Ash and unlit tiles are left untouched.
    pub fn extinguish(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.intensity = FireIntensity::None;
        self.remaining_duration = 0;
        true
    }

    fn set(&mut self, intensity: FireIntensity) {
        self.intensity = intensity;
        self.remaining_duration = intensity.data().duration;
    }
}

/// Turns an unhindered fire takes from `Spark` to `Ash`
pub fn total_burn_turns() -> u32 {
    FireIntensity::ALL
        .iter()
        .filter(|i| i.is_active())
        .map(|i| i.data().duration)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_ordering() {
        assert!(FireIntensity::None < FireIntensity::Spark);
        assert!(FireIntensity::Blaze < FireIntensity::Inferno);
        assert!(FireIntensity::Dying < FireIntensity::Ash);
    }

    #[test]
    fn test_burning_band() {
        let burning: Vec<_> = FireIntensity::ALL
            .iter()
            .copied()
            .filter(|i| i.is_burning())
            .collect();
        assert_eq!(
            burning,
            vec![
                FireIntensity::Smolder,
                FireIntensity::Flame,
                FireIntensity::Blaze,
                FireIntensity::Inferno
            ]
        );
        assert!(FireIntensity::Spark.is_active());
        assert!(!FireIntensity::Ash.is_active());
    }

    #[test]
    fn test_spark_reaches_ash_in_total_duration() {
        let mut fire = FireState::default();
        assert!(fire.ignite(FireIntensity::Spark));
        let total = total_burn_turns();
        assert_eq!(total, 1 + 3 + 4 + 3 + 2 + 3);

        for turn in 1..total {
            assert!(fire.advance(), "fire died early on turn {turn}");
        }
        assert!(!fire.advance());
        assert_eq!(fire.intensity(), FireIntensity::Ash);

        // Ash never revives
        assert!(!fire.advance());
        assert!(!fire.ignite(FireIntensity::Spark));
        assert!(!fire.extinguish());
        assert_eq!(fire.intensity(), FireIntensity::Ash);
    }

    #[test]
    fn test_ignite_intensifies_active_fire() {
        let mut fire = FireState::default();
        fire.ignite(FireIntensity::Flame);
        fire.ignite(FireIntensity::Spark);
        assert_eq!(fire.intensity(), FireIntensity::Blaze);
        assert_eq!(fire.remaining_duration(), 3);

        fire.ignite(FireIntensity::Spark);
        assert_eq!(fire.intensity(), FireIntensity::Inferno);
        fire.ignite(FireIntensity::Spark);
        assert_eq!(fire.intensity(), FireIntensity::Inferno);
        assert_eq!(fire.remaining_duration(), 4);
    }

    #[test]
    fn test_extinguish_is_idempotent() {
        let mut fire = FireState::default();
        assert!(!fire.extinguish());
        fire.ignite(FireIntensity::Spark);
        assert!(fire.extinguish());
        assert!(!fire.extinguish());
        assert_eq!(fire, FireState::default());
    }
}
