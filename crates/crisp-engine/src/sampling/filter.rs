//! CPU emulation of the hardware texture filters used by the passes.
//!
//! Coordinates are in texel space (`t = uv * size`), addressing is
//! clamp-to-edge, and filtering happens on linear straight-alpha colors.

use crate::coords::Vec2;
use crate::paint::Color;
use crate::raster::TexelImage;

/// Texels and weight for linear filtering along one axis.
///
/// Returns `(i0, i1, w)` where the result is `lerp(T[i0], T[i1], w)`; `i1` is
/// `i0` or `i0 + 1`, so at most two adjacent texels ever contribute.
#[inline]
pub fn linear_taps(t: f32, len: u32) -> (u32, u32, f32) {
    let last = len.saturating_sub(1) as f32;
    let p = t - 0.5;
    let base = p.floor();
    let w = p - base;
    let i0 = base.clamp(0.0, last) as u32;
    let i1 = (base + 1.0).clamp(0.0, last) as u32;
    (i0, i1, w)
}

/// Bilinear sample.
pub fn bilinear(image: &TexelImage, t: Vec2) -> Color {
    let size = image.size();
    let (x0, x1, wx) = linear_taps(t.x, size.width);
    let (y0, y1, wy) = linear_taps(t.y, size.height);

    let top = image.get(x0, y0).lerp(image.get(x1, y0), wx);
    let bottom = image.get(x0, y1).lerp(image.get(x1, y1), wx);
    top.lerp(bottom, wy)
}
