//! The two coordinate transforms of the pipeline.
//!
//! - [`Camera`]: world pixels → canvas normalized device range (sprite pass)
//! - [`AspectScale`]: canvas → letterboxed display surface (present pass)

mod aspect;
mod camera;

pub use aspect::AspectScale;
pub use camera::Camera;
