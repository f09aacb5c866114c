use anyhow::{ensure, Result};

use crate::atlas::AtlasLayout;
use crate::coords::PixelSize;

/// GPU setup for the pixel renderer.
///
/// `atlas` and `canvas` describe the textures the renderer will allocate; the
/// device is requested with exactly the limits they need, and creation fails
/// up front when the adapter cannot provide them.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format. The canvas shares the surface format,
    /// so sRGB keeps sprite blending in linear space.
    pub prefer_srgb: bool,

    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Hint only.
    pub frame_latency: u32,

    pub atlas: AtlasLayout,
    pub canvas: PixelSize,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            frame_latency: 2,
            atlas: AtlasLayout::default(),
            canvas: PixelSize::new(320, 240),
        }
    }
}

impl GpuInit {
    /// Same settings, sized for another atlas and canvas.
    pub fn with_pixels(self, atlas: AtlasLayout, canvas: PixelSize) -> Self {
        Self {
            atlas,
            canvas,
            ..self
        }
    }

    /// Device limits for the atlas array and the canvas, checked against what
    /// the adapter supports.
    ///
    /// Starts from wgpu's defaults and only raises the texture limits, so a
    /// default-sized atlas asks for nothing beyond them.
    pub fn required_limits(&self, adapter: &wgpu::Limits) -> Result<wgpu::Limits> {
        let atlas = self.atlas;
        ensure!(atlas.layers > 0, "atlas has no layers");
        ensure!(atlas.slot.is_valid(), "atlas slot {} is empty", atlas.slot);
        ensure!(self.canvas.is_valid(), "canvas {} is empty", self.canvas);

        let mut limits = wgpu::Limits::default();
        let dim = atlas
            .slot
            .width
            .max(atlas.slot.height)
            .max(self.canvas.width)
            .max(self.canvas.height);
        limits.max_texture_dimension_2d = limits.max_texture_dimension_2d.max(dim);
        limits.max_texture_array_layers = limits.max_texture_array_layers.max(atlas.layers);

        ensure!(
            limits.max_texture_array_layers <= adapter.max_texture_array_layers,
            "atlas needs {} layers, adapter allows {}",
            atlas.layers,
            adapter.max_texture_array_layers
        );
        ensure!(
            limits.max_texture_dimension_2d <= adapter.max_texture_dimension_2d,
            "canvas {} / atlas slot {} exceed adapter texture limit {}",
            self.canvas,
            atlas.slot,
            adapter.max_texture_dimension_2d
        );
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(layers: u32, dim: u32) -> wgpu::Limits {
        wgpu::Limits {
            max_texture_array_layers: layers,
            max_texture_dimension_2d: dim,
            ..wgpu::Limits::default()
        }
    }

    #[test]
    fn default_atlas_needs_default_limits() {
        let limits = GpuInit::default().required_limits(&wgpu::Limits::default()).unwrap();
        assert_eq!(limits.max_texture_array_layers, wgpu::Limits::default().max_texture_array_layers);
        assert_eq!(limits.max_texture_dimension_2d, wgpu::Limits::default().max_texture_dimension_2d);
    }

    #[test]
    fn large_atlas_raises_layer_limit() {
        let init = GpuInit::default().with_pixels(AtlasLayout::new(32, 32, 1024), PixelSize::new(320, 240));
        let limits = init.required_limits(&adapter(2048, 16384)).unwrap();
        assert_eq!(limits.max_texture_array_layers, 1024);
        assert!(init.required_limits(&adapter(512, 16384)).is_err());
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let init = GpuInit::default().with_pixels(AtlasLayout::default(), PixelSize::new(12000, 240));
        assert!(init.required_limits(&adapter(256, 8192)).is_err());
        let limits = init.required_limits(&adapter(256, 16384)).unwrap();
        assert_eq!(limits.max_texture_dimension_2d, 12000);
    }

    #[test]
    fn empty_resources_are_rejected() {
        let limits = wgpu::Limits::default();
        let no_layers = GpuInit::default().with_pixels(AtlasLayout::new(32, 32, 0), PixelSize::new(320, 240));
        assert!(no_layers.required_limits(&limits).is_err());
        let no_canvas = GpuInit::default().with_pixels(AtlasLayout::default(), PixelSize::new(0, 240));
        assert!(no_canvas.required_limits(&limits).is_err());
    }
}
