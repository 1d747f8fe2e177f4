pub use glam::{DVec2 as Vec2, DVec3 as Vec3};

use crate::foundation::math::lerp;

/// Clamp a scalar into `[0, 1]`, mapping non-finite values to 0.
pub fn clamp01(v: f64) -> f64 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

/// Straight (non-premultiplied) RGB color with channels in `[0, 1]`.
///
/// Channels are clamped on construction, so a value handed to a render
/// surface is always in range regardless of the math that produced it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: f64,
    /// Green channel.
    pub g: f64,
    /// Blue channel.
    pub b: f64,
}

impl Rgb {
    /// Opaque white.
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Build a color, clamping each channel into `[0, 1]`.
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: clamp01(r),
            g: clamp01(g),
            b: clamp01(b),
        }
    }

    /// Convert from HSL. `hue` is in turns (`[0, 1)` wraps), `saturation`
    /// and `lightness` in `[0, 1]`.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = clamp01(saturation);
        let l = clamp01(lightness);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let hp = h * 6.0;
        let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
        let (r1, g1, b1) = match hp as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        Self::new(r1 + m, g1 + m, b1 + m)
    }

    /// Channel-wise linear mix toward `other`.
    pub fn mix(self, other: Self, t: f64) -> Self {
        let t = clamp01(t);
        Self::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
        )
    }

    /// Scale brightness by `k`, re-clamping channels.
    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }
}
