//! Bathymetric height-to-color ramp
//!
//! Five stops run from dark blue at the deepest point through light blue at
//! the pivot (sea level when the range straddles zero) to red at the highest
//! point. Colors between stops are interpolated linearly per channel.

use mbviewer_core::Rgb;

/// Returned when no stop pair contains the height, which only happens for non-finite bounds
pub const FALLBACK_COLOR: Rgb = Rgb::new(255.0, 17.0, 0.0);

/// Stop colors from lowest to highest: dark blue, blue, light blue, yellow, red
const BATHYMETRY_COLORS: [u32; 5] = [0x000080, 0x0000FF, 0xADD8E6, 0xFFFF00, 0xFF0000];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub height: f32,
    pub color: Rgb,
}

/// Piecewise-linear color ramp over ascending stops
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    min_height: f32,
    max_height: f32,
    stops: [ColorStop; 5],
}

impl ColorRamp {
    /// Ramp for heights in `[min_height, max_height]`.
    ///
    /// The middle stop sits at 0 when the range contains 0, which yields the
    /// stops `min, min/2, 0, max/2, max`. Otherwise it moves to the middle
    /// of the range so the stops stay ascending and every height still
    /// gets a ramp color.
    pub fn bathymetry(min_height: f32, max_height: f32) -> Self {
        let pivot = if min_height <= 0.0 && 0.0 <= max_height {
            0.0
        } else {
            (min_height + max_height) / 2.0
        };
        let heights = [
            min_height,
            (min_height + pivot) / 2.0,
            pivot,
            (pivot + max_height) / 2.0,
            max_height,
        ];

        let stops = std::array::from_fn(|i| ColorStop {
            height: heights[i],
            color: Rgb::from_hex(BATHYMETRY_COLORS[i]),
        });

        Self {
            min_height,
            max_height,
            stops,
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color for a height; heights outside the range take the nearest end color
    pub fn color_at(&self, height: f32) -> Rgb {
        let clamped = height.min(self.max_height).max(self.min_height);

        for pair in self.stops.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if clamped >= lower.height && clamped <= upper.height {
                let span = upper.height - lower.height;
                let t = if span > 0.0 { (clamped - lower.height) / span } else { 0.0 };
                return lower.color.lerp(&upper.color, t);
            }
        }

        FALLBACK_COLOR
    }
}

/// Color of `height` on the bathymetric ramp spanning `[min_height, max_height]`
pub fn bathymetry_color(height: f32, min_height: f32, max_height: f32) -> Rgb {
    ColorRamp::bathymetry(min_height, max_height).color_at(height)
}
