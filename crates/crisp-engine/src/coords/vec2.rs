use core::ops::{Add, Div, Mul, Neg, Sub};

/// 2D vector used for pixel, texel and normalized coordinates alike.
///
/// Component-wise `*` and `/` with another `Vec2` are provided because almost
/// every sampling step scales a coordinate by a per-axis resolution.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2::new(0.0, 0.0);
    pub const ONE: Vec2 = Vec2::new(1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Applies `f` to each component.
    #[inline]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self::new(f(self.x), f(self.y))
    }

    /// Combines two vectors component-wise.
    #[inline]
    pub fn zip(self, rhs: Vec2, f: impl Fn(f32, f32) -> f32) -> Self {
        Self::new(f(self.x, rhs.x), f(self.y, rhs.y))
    }

    #[inline]
    pub fn floor(self) -> Self {
        self.map(f32::floor)
    }

    #[inline]
    pub fn abs(self) -> Self {
        self.map(f32::abs)
    }

    /// Fractional part in `[0, 1)` (GLSL/WGSL `fract`, not `f32::fract`).
    #[inline]
    pub fn fract(self) -> Self {
        self.map(|v| v - v.floor())
    }

    #[inline]
    pub fn min(self, rhs: Vec2) -> Self {
        self.zip(rhs, f32::min)
    }

    #[inline]
    pub fn max(self, rhs: Vec2) -> Self {
        self.zip(rhs, f32::max)
    }

    #[inline]
    pub fn clamp(self, lo: Vec2, hi: Vec2) -> Self {
        self.max(lo).min(hi)
    }

    #[inline]
    pub fn max_element(self) -> f32 {
        self.x.max(self.y)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl From<[f32; 2]> for Vec2 {
    #[inline]
    fn from(v: [f32; 2]) -> Self {
        Vec2::new(v[0], v[1])
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Div<Vec2> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x / rhs.x, self.y / rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fract_wraps_negative_values_into_unit_range() {
        let f = Vec2::new(-0.25, 2.75).fract();
        assert_eq!(f, Vec2::new(0.75, 0.75));
    }

    #[test]
    fn component_wise_ops() {
        let a = Vec2::new(2.0, 9.0);
        let b = Vec2::new(4.0, 3.0);
        assert_eq!(a * b, Vec2::new(8.0, 27.0));
        assert_eq!(a / b, Vec2::new(0.5, 3.0));
        assert_eq!(a.clamp(Vec2::splat(3.0), Vec2::splat(5.0)), Vec2::new(3.0, 5.0));
    }
}
