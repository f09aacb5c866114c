use anyhow::Result;

use crate::atlas::{AtlasDescriptor, AtlasLayout};
use crate::coords::PixelSize;
use crate::paint::Color;
use crate::raster::TexelImage;
use crate::render::{PresentRenderer, RenderCtx, RenderTarget, SpriteRenderer};
use crate::scene::SpriteBatch;
use crate::transform::{AspectScale, Camera};

/// Configuration for the two-pass pixel renderer.
#[derive(Debug, Clone, Copy)]
pub struct PixelInit {
    /// Low-resolution canvas the sprite pass draws into.
    pub canvas: PixelSize,
    pub atlas: AtlasLayout,
    /// Canvas clear color (linear, straight alpha).
    pub clear: Color,
    /// Color of the bars outside the scaled canvas.
    pub letterbox: Color,
}

impl Default for PixelInit {
    fn default() -> Self {
        Self {
            canvas: PixelSize::new(320, 240),
            atlas: AtlasLayout::default(),
            clear: Color::new(0.1, 0.15, 0.1, 1.0),
            letterbox: Color::BLACK,
        }
    }
}

/// Sprite pass into the canvas followed by the present pass onto the surface.
///
/// The aspect scale is recomputed whenever the surface size changes.
pub struct PixelRenderer {
    sprites: SpriteRenderer,
    present: PresentRenderer,
    surface: PixelSize,
    scale: AspectScale,
}

impl PixelRenderer {
    pub fn new(init: PixelInit) -> Self {
        Self {
            sprites: SpriteRenderer::new(init.canvas, init.atlas, init.clear),
            present: PresentRenderer::new(init.letterbox),
            surface: init.canvas,
            scale: AspectScale::FULL,
        }
    }

    #[inline]
    pub fn canvas_size(&self) -> PixelSize {
        self.sprites.canvas_size()
    }

    #[inline]
    pub fn atlas_layout(&self) -> AtlasLayout {
        self.sprites.layout()
    }

    #[inline]
    pub fn aspect_scale(&self) -> AspectScale {
        self.scale
    }

    pub fn upload_layer(
        &mut self,
        ctx: &RenderCtx<'_>,
        layer: u32,
        size: PixelSize,
        srgba8: &[u8],
    ) -> Result<AtlasDescriptor> {
        self.sprites.upload_layer(ctx, layer, size, srgba8)
    }

    pub fn upload_image(
        &mut self,
        ctx: &RenderCtx<'_>,
        layer: u32,
        image: &TexelImage,
    ) -> Result<AtlasDescriptor> {
        self.sprites.upload_image(ctx, layer, image)
    }

    /// Recomputes the aspect scale for a new surface size.
    pub fn resize(&mut self, surface: PixelSize) {
        if surface == self.surface || !surface.is_valid() {
            return;
        }
        self.surface = surface;
        self.scale = AspectScale::fit(self.canvas_size(), surface);
        log::debug!(
            "PixelRenderer: surface {surface}, scale ({:.4}, {:.4})",
            self.scale.scale.x,
            self.scale.scale.y
        );
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batch: &SpriteBatch,
        camera: Camera,
    ) {
        self.resize(ctx.surface_size);
        self.sprites.render(ctx, target.encoder, batch, camera);

        let Some(canvas_view) = self.sprites.canvas_view() else { return };
        self.present.render(
            ctx,
            target,
            canvas_view,
            self.sprites.canvas_generation(),
            self.sprites.canvas_size(),
            self.scale,
        );
    }
}
