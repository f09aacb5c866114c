use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::atlas::AtlasDescriptor;
use crate::coords::PixelSize;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::raster::TexelImage;
use crate::render::{PixelRenderer, RenderCtx, RenderTarget};
use crate::scene::SpriteBatch;
use crate::time::FrameTime;
use crate::transform::Camera;

use super::app::AppControl;

/// Per-window handles and immutable window metadata.
pub struct WindowCtx<'a> {
    pub id:     WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Returns the drawable size in physical pixels.
    pub fn surface_size(&self) -> PixelSize {
        let phys = self.window.inner_size();
        PixelSize::new(phys.width, phys.height)
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window:   WindowCtx<'a>,
    pub gpu:      &'a mut Gpu<'w>,
    pub renderer: &'a mut PixelRenderer,
    pub time:     FrameTime,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Uploads a sprite image into atlas `layer`.
    pub fn upload_image(&mut self, layer: u32, image: &TexelImage) -> Result<AtlasDescriptor> {
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.gpu.surface_size(),
        );
        self.renderer.upload_image(&rctx, layer, image)
    }

    /// Runs the sprite pass and the present pass, then presents the frame.
    ///
    /// A minimized window skips the frame. Surface errors are handled here;
    /// only a fatal one asks the runtime to exit.
    pub fn render(&mut self, batch: &SpriteBatch, camera: Camera) -> AppControl {
        if !self.gpu.surface_size().is_valid() {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => AppControl::Exit,
                    _ => AppControl::Continue,
                };
            }
        };

        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            frame.size,
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            self.renderer.render(&rctx, &mut target, batch, camera);
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
