use anyhow::{Context, Result};

use crate::coords::PixelSize;
use crate::raster::TexelImage;

use super::{AtlasDescriptor, AtlasLayout};

/// CPU-side layered atlas used by the reference passes.
///
/// Mirrors the GPU `texture_2d_array`: every layer is `layout.slot` texels and
/// starts fully transparent.
#[derive(Debug, Clone)]
pub struct AtlasLayers {
    layout: AtlasLayout,
    layers: Vec<TexelImage>,
}

impl AtlasLayers {
    pub fn new(layout: AtlasLayout) -> Self {
        let layers = (0..layout.layers)
            .map(|_| TexelImage::new(layout.slot))
            .collect();
        Self { layout, layers }
    }

    #[inline]
    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    #[inline]
    pub fn layer(&self, index: u32) -> Option<&TexelImage> {
        self.layers.get(index as usize)
    }

    /// Copies `image` into the top-left corner of `layer` and returns the
    /// descriptor sprites should use to address it.
    ///
    /// The rest of the layer is cleared so stale content from a previous
    /// occupant never sits next to the new sprite.
    pub fn write_layer(&mut self, layer: u32, image: &TexelImage) -> Result<AtlasDescriptor> {
        let descriptor = self
            .layout
            .descriptor_for(layer, image.size())
            .with_context(|| {
                format!(
                    "sprite {} does not fit layer {layer} of a {} x {} atlas",
                    image.size(),
                    self.layout.slot,
                    self.layout.layers
                )
            })?;

        let slot = &mut self.layers[layer as usize];
        slot.fill(crate::paint::Color::TRANSPARENT);
        slot.blit(image, 0, 0);

        log::debug!("atlas layer {layer} <- {} ({descriptor:?})", image.size());
        Ok(descriptor)
    }

    /// Size of the content stored for `descriptor`.
    #[inline]
    pub fn valid_size(&self, descriptor: AtlasDescriptor) -> PixelSize {
        descriptor.valid_size(self.layout)
    }
}
