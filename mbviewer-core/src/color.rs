//! RGB colors on the 0-255 channel scale

use serde::{Deserialize, Serialize};

/// An RGB color with channels in `[0, 255]`.
///
/// Channels are kept as `f32` so interpolated colors are not rounded until
/// they are converted for the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` literal
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32,
            g: ((hex >> 8) & 0xff) as f32,
            b: (hex & 0xff) as f32,
        }
    }

    /// Channel-wise linear interpolation, `t = 0` gives `self`, `t = 1` gives `other`
    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// Channels scaled to `[0, 1]`
    pub fn to_unit(&self) -> [f32; 3] {
        [self.r / 255.0, self.g / 255.0, self.b / 255.0]
    }

    /// Channels rounded to bytes
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
        ]
    }
}
