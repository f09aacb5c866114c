//! Per-frame sprite submissions consumed by both sprite passes.

mod batch;

pub use batch::{SpriteBatch, SpriteDraw};
