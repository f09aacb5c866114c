//! Crisp pixel-art rendering engine.
//!
//! Sprites packed into a layered atlas are drawn into a low-resolution canvas,
//! which is then upscaled onto the window at any (possibly non-integer) scale.
//! Both steps sample through an edge-snapping filter so texel edges stay sharp
//! without the shimmer of nearest filtering.
//!
//! The sampling math lives in `sampling` and is shared by the GPU passes in
//! `render` and the CPU reference passes in `raster`.

pub mod atlas;
pub mod coords;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod raster;
pub mod render;
pub mod sampling;
pub mod scene;
pub mod time;
pub mod transform;
pub mod window;
