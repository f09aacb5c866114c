//! Atlas addressing.
//!
//! Sprites live in a layered atlas where every layer has the same texel
//! dimensions (`W × H`). A sprite either owns a whole layer
//! ([`AtlasDescriptor::Indexed`]) or only the top-left sub-rectangle of one
//! ([`AtlasDescriptor::Bounded`]). Addressing maps the sprite's local
//! `uv ∈ [0,1]²` onto that footprint.
//!
//! Deciding which sprite goes into which layer is the caller's job.

mod address;
mod layers;

pub use address::{address, AtlasCoord, AtlasDescriptor, AtlasLayout};
pub use layers::AtlasLayers;
