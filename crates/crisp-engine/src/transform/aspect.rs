use crate::coords::{PixelSize, Rect, Vec2};

/// Per-axis scale that fits the canvas into the display surface while
/// preserving its aspect ratio (letterbox or pillarbox).
///
/// `scale` is the fraction of the display's NDC range the canvas quad spans on
/// each axis; one component is always `1`. Recompute on every surface resize.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AspectScale {
    pub scale: Vec2,
}

impl AspectScale {
    /// Full-surface scale (no bars).
    pub const FULL: AspectScale = AspectScale { scale: Vec2::ONE };

    /// `r = canvas / surface` per axis, `scale = r / max(r)`.
    pub fn fit(canvas: PixelSize, surface: PixelSize) -> Self {
        if !canvas.is_valid() || !surface.is_valid() {
            return Self::FULL;
        }
        let ratio = canvas.as_vec2() / surface.as_vec2();
        Self {
            scale: ratio / ratio.max_element(),
        }
    }

    /// Display rectangle covered by the canvas, centered, in display pixels.
    pub fn covered_rect(&self, surface: PixelSize) -> Rect {
        let full = surface.as_vec2();
        let size = full * self.scale;
        Rect::from_origin_size((full - size) * 0.5, size)
    }

    /// Display pixel position → canvas `uv`, or `None` in the bars.
    pub fn display_to_canvas_uv(&self, p: Vec2, surface: PixelSize) -> Option<Vec2> {
        let rect = self.covered_rect(surface);
        rect.contains(p).then(|| (p - rect.origin) / rect.size)
    }

    /// Canvas texels spanned by one display pixel, per axis.
    pub fn footprint(&self, canvas: PixelSize, surface: PixelSize) -> Vec2 {
        canvas.as_vec2() / (surface.as_vec2() * self.scale)
    }
}

impl Default for AspectScale {
    fn default() -> Self {
        Self::FULL
    }
}
