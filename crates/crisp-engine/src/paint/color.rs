/// Linear RGBA color with straight alpha.
///
/// Filtering happens on straight colors (matching hardware filtering of an
/// sRGB texture); the alpha correction in [`alpha_corrected`](Self::alpha_corrected)
/// is applied after filtering, right before blending.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Decodes straight sRGB bytes into linear color. Alpha is linear already.
    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: srgb_to_linear(r as f32 / 255.0),
            g: srgb_to_linear(g as f32 / 255.0),
            b: srgb_to_linear(b as f32 / 255.0),
            a: a as f32 / 255.0,
        }
    }

    /// Encodes to straight sRGB bytes, rounding to nearest.
    #[inline]
    pub fn to_srgb_u8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
        [
            q(linear_to_srgb(self.r)),
            q(linear_to_srgb(self.g)),
            q(linear_to_srgb(self.b)),
            q(self.a),
        ]
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Linear interpolation of all four channels.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Alpha-dependent gamma correction for semi-transparent sprite texels:
    /// `rgb * sqrt(a)`, alpha unchanged.
    ///
    /// Keeps the smooth band produced by edge snapping from darkening or
    /// lightening translucent edges once blended. `a = 1` is the identity and
    /// `a = 0` yields black.
    #[inline]
    pub fn alpha_corrected(self) -> Color {
        let k = self.a.clamp(0.0, 1.0).sqrt();
        Color::new(self.r * k, self.g * k, self.b * k, self.a)
    }

    /// Straight-alpha "over" blending: `src * src.a + dst * (1 - src.a)`.
    ///
    /// Same equation as `wgpu::BlendState::ALPHA_BLENDING`.
    #[inline]
    pub fn over(self, dst: Color) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let inv = 1.0 - a;
        Color::new(
            self.r * a + dst.r * inv,
            self.g * a + dst.g * inv,
            self.b * a + dst.b * inv,
            self.a * a + dst.a * inv,
        )
    }

    /// Largest absolute channel difference.
    #[inline]
    pub fn max_abs_diff(self, other: Color) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
            .max((self.a - other.a).abs())
    }
}

/// sRGB transfer function, decode direction.
#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, encode direction.
#[inline]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_one_leaves_color_unchanged() {
        let c = Color::new(0.2, 0.4, 0.8, 1.0);
        assert_eq!(c.alpha_corrected(), c);
    }

    #[test]
    fn alpha_zero_zeroes_color() {
        let c = Color::new(0.9, 0.5, 0.3, 0.0).alpha_corrected();
        assert_eq!(c, Color::TRANSPARENT);
    }

    #[test]
    fn alpha_quarter_scales_by_half() {
        let c = Color::new(0.8, 0.4, 0.2, 0.25).alpha_corrected();
        assert!(c.max_abs_diff(Color::new(0.4, 0.2, 0.1, 0.25)) < 1e-6);
    }

    #[test]
    fn srgb_round_trips_every_byte() {
        for v in 0..=255u8 {
            let c = Color::from_srgb_u8(v, v, v, v);
            assert_eq!(c.to_srgb_u8(), [v, v, v, v]);
        }
    }

    #[test]
    fn over_with_opaque_source_replaces_destination() {
        let src = Color::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(src.over(Color::WHITE), src);
        assert_eq!(Color::TRANSPARENT.over(Color::WHITE), Color::WHITE);
    }
}
