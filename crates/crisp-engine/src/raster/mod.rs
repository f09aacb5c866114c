//! CPU reference implementation of the two passes.
//!
//! Every pixel is an independent pure function of the pass inputs, so rows
//! are shaded in parallel with rayon. Output matches the WGSL passes up to
//! float precision and 8-bit quantization.

mod image;
mod present_pass;
mod sprite_pass;

pub use image::TexelImage;
pub use present_pass::PresentPass;
pub use sprite_pass::{sample_sprite, SpritePass};
