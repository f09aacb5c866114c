//! Edge-snapping sampler and the CPU texture filters it feeds.
//!
//! The same math runs in `render/shaders/snap.wgsl`; keep the two in step.

pub mod filter;
mod snap;

pub use snap::{
    clamp_to_bound, footprint, half_width, smoothstep, snap_coord, snap_texel, MAX_HALF_WIDTH,
};
