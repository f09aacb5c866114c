//! Edge snapping.
//!
//! Given a texel-space coordinate `t`, bilinear filtering at `t` blends the
//! two texels whose centers bracket it, weighted by `f = fract(t - 0.5)`.
//! Snapping replaces that weight with a smooth threshold of width `2h`
//! centered on the texel edge (`f = 0.5`), where `h` is half of the output
//! pixel's footprint in texels:
//!
//! - far from an edge the weight is exactly 0 or 1 (nearest-neighbor)
//! - within `h` of an edge it ramps smoothly (no jitter under sub-pixel motion)
//!
//! The corrected coordinate is `t + (snapped - f)`.

use crate::coords::Vec2;

/// Upper bound for the half-width.
///
/// At `h = 0.5` the ramp spans the whole `[0, 1)` interval, which is the
/// largest width for which the corrected coordinate stays continuous where
/// `f` wraps from 1 back to 0.
pub const MAX_HALF_WIDTH: f32 = 0.5;

/// Hermite smoothstep, clamped. Requires `e0 < e1`.
#[inline]
pub fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Screen-space footprint in texels: `|dt/dx| + |dt/dy|` (WGSL `fwidth`).
#[inline]
pub fn footprint(dt_dx: Vec2, dt_dy: Vec2) -> Vec2 {
    dt_dx.abs() + dt_dy.abs()
}

/// Transition half-width for a footprint, in texels.
///
/// Zero, negative and non-finite footprints collapse to `0`, i.e. exact
/// nearest-texel snapping.
#[inline]
pub fn half_width(footprint: f32) -> f32 {
    if footprint.is_finite() && footprint > 0.0 {
        (footprint * 0.5).min(MAX_HALF_WIDTH)
    } else {
        0.0
    }
}

/// Snaps one texel-space coordinate with half-width `h`.
#[inline]
pub fn snap_texel(t: f32, h: f32) -> f32 {
    let g = t - 0.5;
    let f = g - g.floor();
    let snapped = if h > 0.0 {
        smoothstep(0.5 - h, 0.5 + h, f)
    } else if f >= 0.5 {
        1.0
    } else {
        0.0
    };
    t + (snapped - f)
}

/// Corrects a normalized coordinate before bilinear sampling.
///
/// - `c`: normalized coordinate (`[0, 1]` across the texture)
/// - `resolution`: texture size in texels along each axis
/// - `footprint`: texels covered by one output pixel along each axis
///
/// Pure function of its inputs; equivalent to `c + (snapped - f) / resolution`.
#[inline]
pub fn snap_coord(c: Vec2, resolution: Vec2, footprint: Vec2) -> Vec2 {
    let t = c * resolution;
    let snapped = Vec2::new(
        snap_texel(t.x, half_width(footprint.x)),
        snap_texel(t.y, half_width(footprint.y)),
    );
    snapped / resolution
}

/// Keeps a texel-space coordinate inside `[0.5, bound - 0.5]` so the bilinear
/// footprint never reaches texels past the valid region.
#[inline]
pub fn clamp_to_bound(t: Vec2, bound: Vec2) -> Vec2 {
    let lo = Vec2::splat(0.5);
    let hi = (bound - lo).max(lo);
    t.clamp(lo, hi)
}
