//! Coordinate and geometry types shared by the passes.
//!
//! Three spaces show up throughout the crate:
//! - pixel space: canvas or display pixels, integer pixel `i` covers `[i, i+1)`
//! - texel space: the same convention applied to a texture's texels
//! - normalized space: `[0, 1]` across a texture, `t = uv * resolution`

mod rect;
mod size;
mod vec2;

pub use rect::Rect;
pub use size::PixelSize;
pub use vec2::Vec2;
