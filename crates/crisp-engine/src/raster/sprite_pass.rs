use rayon::prelude::*;

use crate::atlas::{address, AtlasCoord, AtlasLayers};
use crate::coords::{Rect, Vec2};
use crate::paint::Color;
use crate::sampling::{clamp_to_bound, filter, snap_coord};
use crate::scene::SpriteBatch;
use crate::transform::Camera;

use super::TexelImage;

/// Composites sprites from the atlas into the low-resolution canvas.
#[derive(Debug, Copy, Clone)]
pub struct SpritePass {
    /// Canvas clear color applied before the first sprite.
    pub clear: Color,
}

impl Default for SpritePass {
    fn default() -> Self {
        Self {
            clear: Color::new(0.1, 0.15, 0.1, 1.0),
        }
    }
}

impl SpritePass {
    pub fn new(clear: Color) -> Self {
        Self { clear }
    }

    /// Clears `canvas` and draws `batch` in submission order.
    ///
    /// Sprites are axis-aligned quads. Sprites with an empty world rect or a
    /// missing atlas layer are skipped, as is everything under an invalid
    /// camera. A negative camera extent mirrors the image along that axis.
    pub fn render(
        &self,
        canvas: &mut TexelImage,
        atlas: &AtlasLayers,
        batch: &SpriteBatch,
        camera: &Camera,
    ) {
        canvas.fill(self.clear);

        if !camera.is_valid() {
            log::warn!("sprite pass: invalid camera {camera:?}; canvas left cleared");
            return;
        }

        let canvas_size = canvas.size();
        let width = canvas_size.width as usize;
        let layout = atlas.layout();

        for sprite in batch.items() {
            let Some(layer) = atlas.layer(sprite.descriptor.layer()) else {
                log::warn!(
                    "sprite pass: layer {} out of range ({} layers)",
                    sprite.descriptor.layer(),
                    layout.layers
                );
                continue;
            };

            if sprite.rect().is_empty() {
                continue;
            }

            // Corners keep their orientation so a sign-flipped camera mirrors
            // the sprite exactly as the vertex shader does.
            let p0 = camera.to_canvas(sprite.position, canvas_size);
            let p1 = camera.to_canvas(sprite.position + sprite.size, canvas_size);
            let extent = p1 - p0;
            let quad = Rect::from_min_max(p0, p1);
            if quad.is_empty() {
                continue;
            }

            // Axis-aligned quad: d(uv)/dx = 1 / width, so the texel footprint
            // per canvas pixel is the valid extent over the quad extent.
            let valid = sprite.descriptor.valid_size(layout).as_vec2();
            let footprint = (valid / extent).abs();
            let (xs, ys) = quad.covered_pixels(canvas_size);
            if xs.is_empty() || ys.is_empty() {
                continue;
            }

            canvas
                .texels_mut()
                .par_chunks_exact_mut(width)
                .enumerate()
                .skip(ys.start as usize)
                .take(ys.len())
                .for_each(|(y, row)| {
                    for x in xs.clone() {
                        let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                        let uv = (center - p0) / extent;
                        let coord = address(uv, sprite.descriptor, layout);
                        let color = sample_sprite(layer, coord, footprint).alpha_corrected();
                        let dst = &mut row[x as usize];
                        *dst = color.over(*dst);
                    }
                });
        }
    }
}

/// Samples one addressed atlas coordinate through the edge-snapping sampler.
///
/// `layer` is the atlas layer named by `coord.layer`; `footprint` is in
/// texels per output pixel.
pub fn sample_sprite(layer: &TexelImage, coord: AtlasCoord, footprint: Vec2) -> Color {
    let resolution = layer.size().as_vec2();
    let snapped = snap_coord(coord.uv, resolution, footprint);
    let t = clamp_to_bound(snapped * resolution, coord.bound);
    filter::bilinear(layer, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::{AtlasDescriptor, AtlasLayout};
    use crate::coords::PixelSize;
    use crate::scene::SpriteDraw;

    const CANVAS: PixelSize = PixelSize::new(64, 48);

    fn approx_color(a: Color, b: Color) -> bool {
        a.max_abs_diff(b) < 1e-4
    }

    /// Opaque texel whose channels encode its coordinates.
    fn coded(x: u32, y: u32) -> Color {
        Color::new(x as f32 / 64.0, y as f32 / 64.0, 0.5, 1.0)
    }

    fn atlas_with(layout: AtlasLayout, layer: u32, image: &TexelImage) -> (AtlasLayers, AtlasDescriptor) {
        let mut atlas = AtlasLayers::new(layout);
        let d = atlas.write_layer(layer, image).unwrap();
        (atlas, d)
    }

    #[test]
    fn native_sprite_reproduces_its_texels() {
        let layout = AtlasLayout::new(16, 16, 2);
        let sprite = TexelImage::from_fn(PixelSize::new(10, 7), coded);
        let (atlas, d) = atlas_with(layout, 1, &sprite);

        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::new(5.0, 9.0), d, layout));

        let pass = SpritePass::new(Color::BLACK);
        let mut canvas = TexelImage::new(CANVAS);
        pass.render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));

        for y in 0..7 {
            for x in 0..10 {
                assert!(approx_color(canvas.get(x + 5, y + 9), coded(x, y)), "({x}, {y})");
            }
        }
        assert_eq!(canvas.get(4, 9), Color::BLACK);
        assert_eq!(canvas.get(15, 9), Color::BLACK);
        assert_eq!(canvas.get(5, 16), Color::BLACK);
    }

    #[test]
    fn bounded_sprite_center_addresses_its_own_center() {
        let layout = AtlasLayout::new(64, 64, 1);
        let sprite = TexelImage::from_fn(PixelSize::new(32, 48), coded);
        let (atlas, d) = atlas_with(layout, 0, &sprite);

        let coord = address(Vec2::new(0.5, 0.5), d, layout);
        assert_eq!(coord.texel(layout), (16, 24));

        let mut canvas = TexelImage::new(CANVAS);
        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, d, layout));
        SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));
        assert!(approx_color(canvas.get(16, 24), coded(16, 24)));
    }

    #[test]
    fn scaled_and_shifted_sprite_never_reads_padding() {
        // Layer holds green content in its 4x4 corner and red everywhere else;
        // a bounded descriptor must keep every output pixel free of red.
        let layout = AtlasLayout::new(8, 8, 1);
        let green = Color::new(0.0, 1.0, 0.0, 1.0);
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        let layer = TexelImage::from_fn(layout.slot, |x, y| if x < 4 && y < 4 { green } else { red });
        let (atlas, _) = atlas_with(layout, 0, &layer);
        let d = AtlasDescriptor::Bounded { valid_width: 4, valid_height: 4, layer: 0 };

        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::new(3.0, 2.0), d, layout).with_size(Vec2::new(10.0, 9.0)));

        for shift in [0.0, 0.3, 0.5, 0.77] {
            let camera = Camera::for_canvas(CANVAS).translated(Vec2::splat(shift));
            let mut canvas = TexelImage::new(CANVAS);
            SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &camera);
            assert!(canvas.texels().iter().all(|c| c.r == 0.0), "shift {shift}");
            assert!(canvas.texels().iter().any(|c| c.g > 0.99));
        }
    }

    #[test]
    fn translucent_texels_are_alpha_corrected() {
        let layout = AtlasLayout::new(4, 4, 1);
        let sprite = TexelImage::filled(layout.slot, Color::new(1.0, 1.0, 1.0, 0.25));
        let (atlas, d) = atlas_with(layout, 0, &sprite);

        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, d, layout));
        let mut canvas = TexelImage::new(CANVAS);
        SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));

        // rgb * sqrt(0.25) = 0.5, then blended at a = 0.25 over black.
        let c = canvas.get(1, 1);
        assert!((c.r - 0.125).abs() < 1e-5, "{c:?}");
    }

    #[test]
    fn later_sprites_draw_over_earlier_ones() {
        let layout = AtlasLayout::new(4, 4, 2);
        let mut atlas = AtlasLayers::new(layout);
        let under = atlas.write_layer(0, &TexelImage::filled(layout.slot, Color::WHITE)).unwrap();
        let over = atlas
            .write_layer(1, &TexelImage::filled(layout.slot, Color::new(0.0, 0.0, 1.0, 1.0)))
            .unwrap();

        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, under, layout));
        batch.push(SpriteDraw::native(Vec2::new(2.0, 2.0), over, layout));

        let mut canvas = TexelImage::new(CANVAS);
        SpritePass::default().render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));
        assert_eq!(canvas.get(1, 1), Color::WHITE);
        assert_eq!(canvas.get(3, 3), Color::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn missing_layer_is_skipped() {
        let layout = AtlasLayout::new(4, 4, 1);
        let atlas = AtlasLayers::new(layout);
        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, AtlasDescriptor::Indexed { layer: 7 }, layout));

        let mut canvas = TexelImage::new(CANVAS);
        SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));
        assert!(canvas.texels().iter().all(|c| *c == Color::BLACK));
    }

    #[test]
    fn flipped_camera_mirrors_the_sprite() {
        let layout = AtlasLayout::new(4, 1, 1);
        let ramp = TexelImage::from_fn(layout.slot, |x, _| {
            let v = x as f32 / 3.0;
            Color::new(v, v, v, 1.0)
        });
        let (atlas, d) = atlas_with(layout, 0, &ramp);
        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, d, layout));

        let canvas_size = PixelSize::new(4, 1);
        let camera = Camera::new(Vec2::new(4.0, 0.0), Vec2::new(-4.0, 1.0));
        assert!(camera.is_valid());

        let mut canvas = TexelImage::new(canvas_size);
        SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &camera);
        for x in 0..4 {
            assert!(approx_color(canvas.get(x, 0), ramp.get(3 - x, 0)), "x={x}: {:?}", canvas.get(x, 0));
        }
    }

    #[test]
    fn negative_sprite_size_is_skipped() {
        let layout = AtlasLayout::new(4, 4, 1);
        let (atlas, d) = atlas_with(layout, 0, &TexelImage::filled(layout.slot, Color::WHITE));
        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::new(8.0, 8.0), d, layout).with_size(Vec2::new(-4.0, 4.0)));

        let mut canvas = TexelImage::new(CANVAS);
        SpritePass::new(Color::BLACK).render(&mut canvas, &atlas, &batch, &Camera::for_canvas(CANVAS));
        assert!(canvas.texels().iter().all(|c| *c == Color::BLACK));
    }
}
