//! Fire: per-tile state machine and the grid-wide spread automaton

pub mod simulation;
pub mod state;

pub use simulation::{FireConfig, FireSimulation, FireTurnReport};
pub use state::{total_burn_turns, FireIntensity, FireIntensityData, FireState};
