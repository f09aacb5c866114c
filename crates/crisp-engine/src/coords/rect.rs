use std::ops::Range;

use super::{PixelSize, Vec2};

/// Axis-aligned rectangle in pixel space (top-left origin, +Y down).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self::from_origin_size(min, max - min).normalized()
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let min = self.origin.min(self.origin + self.size);
        let max = self.origin.max(self.origin + self.size);
        Rect::from_origin_size(min, max - min)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x
            && p.y >= r.origin.y
            && p.x < (r.origin.x + r.size.x)
            && p.y < (r.origin.y + r.size.y)
    }

    /// Pixel indices whose centers (`i + 0.5`) fall inside the rectangle,
    /// clipped to `[0, bounds)`.
    ///
    /// This is the rasterizer coverage rule: a pixel belongs to a primitive
    /// when its center is inside the half-open rect.
    pub fn covered_pixels(self, bounds: PixelSize) -> (Range<u32>, Range<u32>) {
        let r = self.normalized();
        let span = |lo: f32, hi: f32, limit: u32| {
            let start = (lo - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            let end = (hi - 0.5).ceil().clamp(0.0, limit as f32) as u32;
            start..end.max(start)
        };
        (
            span(r.min().x, r.max().x, bounds.width),
            span(r.min().y, r.max().y, bounds.height),
        )
    }
}
