//! GPU device and window surface.
//!
//! [`Gpu`] requests a device sized for the atlas array and the canvas
//! described by [`GpuInit`], keeps the surface configured across resizes, and
//! hands out one [`GpuFrame`] per redraw.

mod context;
mod init;
mod surface;

pub use context::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
