//! RGB Color Primitives
//!
//! All animation math works on 8-bit channels with `f32` blend factors.
//! Interpolation clamps its factor to `[0, 1]`, so a blend never leaves the
//! segment between its two endpoints.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Fully dark cell
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Full-intensity white
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Full-intensity red
    pub const RED: Self = Self::new(255, 0, 0);

    /// Create a color from its channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation toward `other`
    ///
    /// `t` is clamped to `[0, 1]`; `t = 0` yields `self`, `t = 1` yields `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        Self {
            r: lerp_channel(self.r, other.r, t),
            g: lerp_channel(self.g, other.g, t),
            b: lerp_channel(self.b, other.b, t),
        }
    }

    /// Multiply every channel by `factor`, saturating at 0 and 255
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            r: scale_channel(self.r, factor),
            g: scale_channel(self.g, factor),
            b: scale_channel(self.b, factor),
        }
    }

    /// Convert a hue/saturation/value triple (all in `[0, 1]`) to RGB
    #[must_use]
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);

        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Self {
            r: unit_to_channel(r),
            g: unit_to_channel(g),
            b: unit_to_channel(b),
        }
    }

    /// Channels as a plain array
    #[must_use]
    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    let a = f32::from(a);
    let b = f32::from(b);
    (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_channel(c: u8, factor: f32) -> u8 {
    if factor.is_nan() {
        return 0;
    }
    (f32::from(c) * factor).clamp(0.0, 255.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_channel(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_lerp_clamps_factor() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(100, 100, 100);
        assert_eq!(a.lerp(b, -3.0), a);
        assert_eq!(a.lerp(b, 7.5), b);
        assert_eq!(a.lerp(b, f32::NAN), a);
    }

    #[test]
    fn test_lerp_midpoint() {
        let mid = Rgb::BLACK.lerp(Rgb::new(200, 100, 50), 0.5);
        assert_eq!(mid, Rgb::new(100, 50, 25));
    }

    #[test]
    fn test_scale_saturates() {
        assert_eq!(Rgb::new(200, 10, 0).scale(2.0), Rgb::new(255, 20, 0));
        assert_eq!(Rgb::new(200, 10, 0).scale(-1.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.scale(0.5), Rgb::new(127, 127, 127));
    }

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0), Rgb::RED);
        assert_eq!(Rgb::from_hsv(1.0 / 3.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_hsv(2.0 / 3.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_hsv(0.5, 0.0, 1.0), Rgb::WHITE);
    }
}
