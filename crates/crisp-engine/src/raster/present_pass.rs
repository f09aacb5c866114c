use rayon::prelude::*;

use crate::coords::Vec2;
use crate::paint::Color;
use crate::sampling::{clamp_to_bound, filter, snap_coord};
use crate::transform::AspectScale;

use super::TexelImage;

/// Upscales the canvas onto the display with edge snapping.
///
/// The canvas is treated as a single atlas slot covering the whole texture.
/// No alpha correction happens here.
#[derive(Debug, Copy, Clone)]
pub struct PresentPass {
    /// Color of the letterbox / pillarbox bars.
    pub clear: Color,
}

impl Default for PresentPass {
    fn default() -> Self {
        Self { clear: Color::BLACK }
    }
}

impl PresentPass {
    pub fn new(clear: Color) -> Self {
        Self { clear }
    }

    /// Overwrites every pixel of `display`.
    pub fn render(&self, display: &mut TexelImage, canvas: &TexelImage, scale: AspectScale) {
        let surface = display.size();
        let width = surface.width as usize;
        if width == 0 {
            return;
        }

        let resolution = canvas.size().as_vec2();
        let footprint = scale.footprint(canvas.size(), surface);
        let clear = self.clear;

        display
            .texels_mut()
            .par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, dst) in row.iter_mut().enumerate() {
                    let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    *dst = match scale.display_to_canvas_uv(center, surface) {
                        Some(uv) => {
                            let snapped = snap_coord(uv, resolution, footprint);
                            let t = clamp_to_bound(snapped * resolution, resolution);
                            filter::bilinear(canvas, t)
                        }
                        None => clear,
                    };
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::PixelSize;

    const CANVAS: PixelSize = PixelSize::new(320, 240);

    fn columns() -> TexelImage {
        TexelImage::from_fn(CANVAS, |x, _| if x % 2 == 0 { Color::BLACK } else { Color::WHITE })
    }

    fn rows() -> TexelImage {
        TexelImage::from_fn(CANVAS, |_, y| if y % 2 == 0 { Color::BLACK } else { Color::WHITE })
    }

    fn checker() -> TexelImage {
        TexelImage::from_fn(CANVAS, |x, y| {
            Color::new(x as f32 / 319.0, y as f32 / 239.0, ((x + y) % 2) as f32, 1.0)
        })
    }

    fn present(canvas: &TexelImage, surface: PixelSize) -> TexelImage {
        let mut display = TexelImage::new(surface);
        PresentPass::default().render(&mut display, canvas, AspectScale::fit(canvas.size(), surface));
        display
    }

    fn is_blend(v: f32) -> bool {
        v > 1e-3 && v < 1.0 - 1e-3
    }

    #[test]
    fn exact_triple_scale_copies_texels() {
        let canvas = checker();
        let display = present(&canvas, PixelSize::new(960, 720));
        for y in 0..720 {
            for x in 0..960 {
                let expected = canvas.get(x / 3, y / 3);
                assert!(
                    display.get(x, y).max_abs_diff(expected) < 1e-3,
                    "({x}, {y}): {:?} vs {expected:?}",
                    display.get(x, y)
                );
            }
        }
    }

    #[test]
    fn pillarbox_bars_get_clear_color() {
        let display = present(&checker(), PixelSize::new(1000, 720));
        for y in [0, 359, 719] {
            for x in (0..20).chain(980..1000) {
                assert_eq!(display.get(x, y), Color::BLACK, "({x}, {y})");
            }
        }
        assert!(display.get(21, 0).max_abs_diff(checker().get(0, 0)) < 1e-3);
    }

    #[test]
    fn non_integer_scale_blends_only_across_one_texel_edge() {
        // 1366x768 fits 320x240 at 3.2x. Any blended output pixel must sit on a
        // single source edge: its neighbors are unblended and on opposite sides.
        let display = present(&columns(), PixelSize::new(1366, 768));
        let row: Vec<f32> = (0..1366).map(|x| display.get(x, 384).r).collect();

        let mut blended = 0;
        for x in 1..row.len() - 1 {
            if !is_blend(row[x]) {
                continue;
            }
            blended += 1;
            assert!(!is_blend(row[x - 1]) && !is_blend(row[x + 1]), "x={x}");
            assert_ne!(row[x - 1].round(), row[x + 1].round(), "x={x}");
        }
        assert!(blended > 0 && blended < 320);
    }

    #[test]
    fn non_integer_pillarbox_stays_within_two_texels() {
        // 1000x720 and 1366x768: every pixel is either pure or a mix of two
        // horizontally adjacent columns (values of a 0/1 pattern stay in [0, 1]
        // and blends never occur twice in a row).
        for surface in [PixelSize::new(1000, 720), PixelSize::new(1366, 768)] {
            let display = present(&columns(), surface);
            for y in [0, surface.height / 2, surface.height - 1] {
                let mut prev_blend = false;
                for x in 0..surface.width {
                    let v = display.get(x, y).r;
                    assert!((0.0..=1.0).contains(&v));
                    let blend = is_blend(v);
                    assert!(!(blend && prev_blend), "{surface}: ({x}, {y})");
                    prev_blend = blend;
                }
            }
        }
    }

    #[test]
    fn non_integer_vertical_scale_stays_within_two_texels() {
        // 1366x768 scales rows by 3.2; 1024x1000 is letterboxed at 3.2 too.
        for surface in [PixelSize::new(1366, 768), PixelSize::new(1024, 1000)] {
            let display = present(&rows(), surface);
            let mut blended = 0;
            for x in [surface.width / 2 - 1, surface.width / 2, surface.width / 2 + 1] {
                let col: Vec<f32> = (0..surface.height).map(|y| display.get(x, y).r).collect();
                for y in 0..col.len() {
                    assert!((0.0..=1.0).contains(&col[y]));
                    if !is_blend(col[y]) {
                        continue;
                    }
                    blended += 1;
                    assert!(y > 0 && y + 1 < col.len(), "{surface}: ({x}, {y})");
                    assert!(!is_blend(col[y - 1]) && !is_blend(col[y + 1]), "{surface}: ({x}, {y})");
                    assert_ne!(col[y - 1].round(), col[y + 1].round(), "{surface}: ({x}, {y})");
                }
            }
            assert!(blended > 0, "{surface}");
        }
    }
}
