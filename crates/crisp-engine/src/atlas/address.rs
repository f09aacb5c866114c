use crate::coords::{PixelSize, Vec2};

/// Dimensions shared by every layer of an atlas.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Texel size of each layer (the max sprite slot).
    pub slot: PixelSize,
    /// Number of layers.
    pub layers: u32,
}

impl AtlasLayout {
    #[inline]
    pub const fn new(slot_width: u32, slot_height: u32, layers: u32) -> Self {
        Self {
            slot: PixelSize::new(slot_width, slot_height),
            layers,
        }
    }

    /// Picks the descriptor for a sprite of `size` placed at the top-left of `layer`.
    ///
    /// Returns `None` if the sprite does not fit the slot or the layer is out of range.
    pub fn descriptor_for(&self, layer: u32, size: PixelSize) -> Option<AtlasDescriptor> {
        if layer >= self.layers || !size.is_valid() || !self.slot.contains(size) {
            return None;
        }
        if size == self.slot {
            Some(AtlasDescriptor::Indexed { layer })
        } else {
            Some(AtlasDescriptor::Bounded {
                valid_width: size.width,
                valid_height: size.height,
                layer,
            })
        }
    }
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self::new(32, 32, 256)
    }
}

/// Where a sprite lives in the atlas.
///
/// Invariant for `Bounded`: `valid_width <= slot.width` and
/// `valid_height <= slot.height`, both non-zero. Violations are a packer bug
/// and are not detected here.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AtlasDescriptor {
    /// The whole layer is the sprite.
    Indexed { layer: u32 },
    /// Only `[0, valid_width) × [0, valid_height)` texels hold the sprite.
    Bounded {
        valid_width: u32,
        valid_height: u32,
        layer: u32,
    },
}

impl AtlasDescriptor {
    #[inline]
    pub fn layer(self) -> u32 {
        match self {
            AtlasDescriptor::Indexed { layer } | AtlasDescriptor::Bounded { layer, .. } => layer,
        }
    }

    /// Texel extent holding real content.
    #[inline]
    pub fn valid_size(self, layout: AtlasLayout) -> PixelSize {
        match self {
            AtlasDescriptor::Indexed { .. } => layout.slot,
            AtlasDescriptor::Bounded {
                valid_width,
                valid_height,
                ..
            } => PixelSize::new(valid_width, valid_height),
        }
    }
}

/// Result of addressing: a normalized coordinate over the whole layer plus the
/// texel bound the sampler must not read past.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AtlasCoord {
    /// Normalized over the full `W × H` layer.
    pub uv: Vec2,
    pub layer: u32,
    /// Valid content extent in texels.
    pub bound: Vec2,
}

impl AtlasCoord {
    /// Texel-space position (`uv * (W, H)`).
    #[inline]
    pub fn texel_pos(self, layout: AtlasLayout) -> Vec2 {
        self.uv * layout.slot.as_vec2()
    }

    /// Index of the texel this coordinate falls in, never past the last valid texel.
    pub fn texel(self, layout: AtlasLayout) -> (u32, u32) {
        let t = self.texel_pos(layout).floor();
        let last = self.bound - Vec2::ONE;
        let t = t.clamp(Vec2::ZERO, last.max(Vec2::ZERO));
        (t.x as u32, t.y as u32)
    }
}

/// Maps a sprite-local `uv` onto its atlas slot.
///
/// `Indexed` passes `uv` through; `Bounded` scales it by
/// `(valid_width / W, valid_height / H)` so `uv = (1, 1)` lands on the far
/// corner of the sprite's own content instead of the oversized slot.
#[inline]
pub fn address(uv: Vec2, descriptor: AtlasDescriptor, layout: AtlasLayout) -> AtlasCoord {
    let slot = layout.slot.as_vec2();
    match descriptor {
        AtlasDescriptor::Indexed { layer } => AtlasCoord {
            uv,
            layer,
            bound: slot,
        },
        AtlasDescriptor::Bounded {
            valid_width,
            valid_height,
            layer,
        } => {
            let valid = Vec2::new(valid_width as f32, valid_height as f32);
            AtlasCoord {
                uv: uv * (valid / slot),
                layer,
                bound: valid,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: AtlasLayout = AtlasLayout::new(64, 64, 4);

    fn bounded(w: u32, h: u32) -> AtlasDescriptor {
        AtlasDescriptor::Bounded { valid_width: w, valid_height: h, layer: 2 }
    }

    #[test]
    fn indexed_slot_passes_uv_through() {
        let uv = Vec2::new(0.3, 0.7);
        let c = address(uv, AtlasDescriptor::Indexed { layer: 1 }, LAYOUT);
        assert_eq!(c.uv, uv);
        assert_eq!(c.layer, 1);
        assert_eq!(c.bound, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn full_size_bounded_slot_is_identity() {
        for i in 0..=16 {
            for j in 0..=16 {
                let uv = Vec2::new(i as f32 / 16.0, j as f32 / 16.0);
                assert_eq!(address(uv, bounded(64, 64), LAYOUT).uv, uv);
            }
        }
    }

    #[test]
    fn bounded_center_addresses_sprite_center() {
        let c = address(Vec2::new(0.5, 0.5), bounded(32, 48), LAYOUT);
        assert_eq!(c.texel_pos(LAYOUT), Vec2::new(16.0, 24.0));
        assert_eq!(c.texel(LAYOUT), (16, 24));
        assert_eq!(c.layer, 2);
    }

    #[test]
    fn far_corner_resolves_to_last_valid_texel() {
        for (w, h) in [(1, 1), (7, 13), (32, 48), (64, 64)] {
            let c = address(Vec2::ONE, bounded(w, h), LAYOUT);
            assert_eq!(c.texel(LAYOUT), (w - 1, h - 1));
        }
    }

    #[test]
    fn descriptor_for_picks_variant_by_size() {
        assert_eq!(
            LAYOUT.descriptor_for(3, PixelSize::new(64, 64)),
            Some(AtlasDescriptor::Indexed { layer: 3 })
        );
        assert_eq!(
            LAYOUT.descriptor_for(0, PixelSize::new(10, 64)),
            Some(AtlasDescriptor::Bounded { valid_width: 10, valid_height: 64, layer: 0 })
        );
        assert_eq!(LAYOUT.descriptor_for(4, PixelSize::new(8, 8)), None);
        assert_eq!(LAYOUT.descriptor_for(0, PixelSize::new(65, 8)), None);
        assert_eq!(LAYOUT.descriptor_for(0, PixelSize::new(0, 8)), None);
    }
}
