use crate::coords::{PixelSize, Vec2};

/// View onto the world, in canvas pixel units.
///
/// World space is +X right, +Y down, like the canvas. `to_ndc` maps the
/// camera rectangle onto `[-1, 1]²` with `(-1, -1)` at the top-left; the
/// vertex shader flips Y when writing clip space.
///
/// With `width_height` equal to the canvas size and an integer `top_left`,
/// integer world positions land on integer canvas pixel boundaries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub top_left: Vec2,
    pub width_height: Vec2,
}

impl Camera {
    #[inline]
    pub const fn new(top_left: Vec2, width_height: Vec2) -> Self {
        Self {
            top_left,
            width_height,
        }
    }

    /// 1:1 camera showing the canvas-sized region starting at the origin.
    #[inline]
    pub fn for_canvas(canvas: PixelSize) -> Self {
        Self::new(Vec2::ZERO, canvas.as_vec2())
    }

    /// Non-zero, finite extent. Rendering with an invalid camera is a caller bug.
    ///
    /// A negative extent is valid and mirrors the view along that axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.top_left.is_finite()
            && self.width_height.is_finite()
            && self.width_height.x != 0.0
            && self.width_height.y != 0.0
    }

    #[inline]
    pub fn translated(self, delta: Vec2) -> Self {
        Self::new(self.top_left + delta, self.width_height)
    }

    /// `((p - top_left) / width_height) * 2 - 1`
    #[inline]
    pub fn to_ndc(&self, p: Vec2) -> Vec2 {
        (p - self.top_left) / self.width_height * 2.0 - Vec2::ONE
    }

    /// World point → canvas pixel coordinates (top-left origin).
    ///
    /// Same mapping as `to_ndc` followed by the viewport transform, written so
    /// a 1:1 camera involves no rounding.
    #[inline]
    pub fn to_canvas(&self, p: Vec2, canvas: PixelSize) -> Vec2 {
        (p - self.top_left) * (canvas.as_vec2() / self.width_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: PixelSize = PixelSize::new(320, 240);

    #[test]
    fn corners_map_to_ndc_corners() {
        let cam = Camera::new(Vec2::new(100.0, 50.0), Vec2::new(320.0, 240.0));
        assert_eq!(cam.to_ndc(Vec2::new(100.0, 50.0)), Vec2::new(-1.0, -1.0));
        assert_eq!(cam.to_ndc(Vec2::new(420.0, 290.0)), Vec2::new(1.0, 1.0));
        assert_eq!(cam.to_ndc(Vec2::new(260.0, 170.0)), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn integer_world_points_land_on_integer_pixels() {
        let cam = Camera::for_canvas(CANVAS).translated(Vec2::new(-7.0, 13.0));
        for (x, y) in [(0.0, 0.0), (17.0, 3.0), (250.0, 199.0)] {
            let px = cam.to_canvas(Vec2::new(x, y), CANVAS);
            assert_eq!(px, px.floor(), "({x}, {y}) -> {px:?}");
            assert_eq!(px, Vec2::new(x + 7.0, y - 13.0));
        }
    }

    #[test]
    fn negative_extent_mirrors_canvas_mapping() {
        let cam = Camera::new(Vec2::new(4.0, 0.0), Vec2::new(-4.0, 1.0));
        assert!(cam.is_valid());
        assert_eq!(cam.to_canvas(Vec2::new(0.0, 0.0), PixelSize::new(4, 1)), Vec2::new(4.0, 0.0));
        assert_eq!(cam.to_canvas(Vec2::new(4.0, 1.0), PixelSize::new(4, 1)), Vec2::new(0.0, 1.0));
        assert_eq!(cam.to_ndc(Vec2::ZERO), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn zero_extent_is_invalid() {
        assert!(Camera::for_canvas(CANVAS).is_valid());
        assert!(!Camera::new(Vec2::ZERO, Vec2::new(0.0, 240.0)).is_valid());
    }
}
