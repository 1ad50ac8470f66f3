//! Construction-time errors
//!
//! Turn processing never fails: out-of-bounds positions and impossible
//! requests (igniting stone, extinguishing nothing) are silent no-ops that
//! return `false` or an empty result. Errors only come from building a grid,
//! loading a map or validating configuration.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DestructionError {
    #[error("grid dimensions must be positive and fit in i32, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("expected {expected} tiles, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },

    #[error("map row {row} has width {actual}, expected {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("map has no rows")]
    EmptyMap,

    #[error("unknown map glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("config {field}: {message}")]
    InvalidConfig { field: &'static str, message: String },
}

impl DestructionError {
    pub(crate) fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}
