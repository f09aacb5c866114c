//! Color model shared by the CPU passes and the GPU uniforms.
//!
//! Colors are linear RGBA with straight (non-premultiplied) alpha. Atlas data
//! arrives as sRGB bytes and is decoded once on upload, which is what an
//! `Rgba8UnormSrgb` texture does on the GPU.

pub mod color;

pub use color::{linear_to_srgb, srgb_to_linear, Color};
