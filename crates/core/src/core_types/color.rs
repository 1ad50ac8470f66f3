use serde::{Deserialize, Serialize};

/// 24-bit RGB color handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);
    pub const BROWN: Color = Color::rgb(139, 90, 43);
    pub const DARK_BROWN: Color = Color::rgb(92, 58, 28);
    pub const GREEN: Color = Color::rgb(60, 160, 60);
    pub const BLUE: Color = Color::rgb(40, 90, 200);
    pub const YELLOW: Color = Color::rgb(255, 230, 90);
    pub const ORANGE: Color = Color::rgb(255, 140, 0);
    pub const RED: Color = Color::rgb(220, 40, 20);
    pub const CYAN: Color = Color::rgb(150, 220, 230);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale brightness by `factor` (0-1)
    pub fn dimmed(self, factor: f32) -> Color {
        let f = factor.clamp(0.0, 1.0);
        Color::rgb(
            (f32::from(self.r) * f) as u8,
            (f32::from(self.g) * f) as u8,
            (f32::from(self.b) * f) as u8,
        )
    }
}
