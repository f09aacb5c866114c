//! GPU rendering subsystem.
//!
//! Two passes produce every frame:
//! - `SpriteRenderer` draws the sprite batch into a low-resolution canvas texture,
//!   sampling a 2D array atlas with edge snapping and alpha correction.
//! - `PresentRenderer` upscales the canvas onto the surface with an
//!   aspect-preserving scale, using the same snapping so texel edges stay crisp.
//!
//! `PixelRenderer` owns both and is what the runtime drives.
//!
//! Convention:
//! - World/canvas geometry is top-left origin, +Y down.
//! - Vertex shaders flip Y when producing clip-space positions.

mod common;
mod ctx;
mod pixel;
mod present;
mod sprite;

pub use ctx::{RenderCtx, RenderTarget};
pub use pixel::{PixelInit, PixelRenderer};
pub use present::PresentRenderer;
pub use sprite::SpriteRenderer;
