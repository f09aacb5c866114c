use crate::atlas::{AtlasDescriptor, AtlasLayout};
use crate::coords::{Rect, Vec2};

/// One sprite quad: where it goes in the world and where it lives in the atlas.
///
/// `position` is the world-space top-left corner, `size` its world extent.
/// Local `uv` runs from `(0, 0)` at `position` to `(1, 1)` at
/// `position + size`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpriteDraw {
    pub position: Vec2,
    pub size: Vec2,
    /// Passed through to clip-space depth; must be within `[0, 1]`.
    pub z: f32,
    pub descriptor: AtlasDescriptor,
}

impl SpriteDraw {
    /// Sprite drawn at its native size (one texel per world pixel).
    pub fn native(position: Vec2, descriptor: AtlasDescriptor, layout: AtlasLayout) -> Self {
        Self {
            position,
            size: descriptor.valid_size(layout).as_vec2(),
            z: 0.0,
            descriptor,
        }
    }

    #[inline]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    #[inline]
    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    /// World-space rectangle.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }
}

/// Sprites recorded for a frame, drawn in submission order.
///
/// `clear` keeps the allocation so steady-state frames do not allocate.
#[derive(Debug, Default, Clone)]
pub struct SpriteBatch {
    items: Vec<SpriteDraw>,
}

impl SpriteBatch {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, sprite: SpriteDraw) {
        self.items.push(sprite);
    }

    #[inline]
    pub fn items(&self) -> &[SpriteDraw] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<SpriteDraw> for SpriteBatch {
    fn extend<T: IntoIterator<Item = SpriteDraw>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}
