use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crisp_engine::atlas::{AtlasDescriptor, AtlasLayout};
use crisp_engine::coords::PixelSize;
use crisp_engine::core::FrameCtx;
use crisp_engine::raster::TexelImage;

/// Where a sprite's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteSource {
    Builtin(&'static str),
    File(PathBuf),
}

/// Identity of a sprite: its source and the sub-rectangle taken from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteKey {
    pub source: SpriteSource,
    pub top_left: (u32, u32),
    pub size: PixelSize,
}

/// Handle to a registered sprite. The value is its atlas layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SpriteHandle(u32);

impl SpriteHandle {
    #[inline]
    pub fn layer(self) -> u32 {
        self.0
    }
}

struct Entry {
    key: SpriteKey,
    image: TexelImage,
    descriptor: AtlasDescriptor,
}

/// Deduplicating sprite registry.
///
/// Registering the same key twice returns the first handle. New sprites take
/// the next free atlas layer. Pixels stay on the CPU until `sync` uploads them.
pub struct SpriteLibrary {
    layout: AtlasLayout,
    entries: Vec<Entry>,
    uploaded: usize,
}

impl SpriteLibrary {
    pub fn new(layout: AtlasLayout) -> Self {
        Self {
            layout,
            entries: Vec::new(),
            uploaded: 0,
        }
    }

    #[inline]
    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Registers a sprite, building its pixels only if the key is new.
    pub fn insert(
        &mut self,
        key: SpriteKey,
        build: impl FnOnce() -> Result<TexelImage>,
    ) -> Result<SpriteHandle> {
        if let Some(existing) = self.entries.iter().position(|e| e.key == key) {
            return Ok(SpriteHandle(existing as u32));
        }

        let layer = self.entries.len() as u32;
        let descriptor = self.layout.descriptor_for(layer, key.size).with_context(|| {
            format!(
                "no room for {:?}: slot {}, {} of {} layers used",
                key.source,
                self.layout.slot,
                layer,
                self.layout.layers
            )
        })?;
        let image = build()?;
        anyhow::ensure!(
            image.size() == key.size,
            "sprite {key:?} built a {} image",
            image.size()
        );

        log::debug!("sprite {:?} -> layer {layer} ({descriptor:?})", key.source);
        self.entries.push(Entry {
            key,
            image,
            descriptor,
        });
        Ok(SpriteHandle(layer))
    }

    /// Registers a procedurally generated sprite.
    pub fn builtin(
        &mut self,
        name: &'static str,
        size: PixelSize,
        build: impl FnOnce() -> TexelImage,
    ) -> Result<SpriteHandle> {
        let key = SpriteKey {
            source: SpriteSource::Builtin(name),
            top_left: (0, 0),
            size,
        };
        self.insert(key, || Ok(build()))
    }

    /// Registers a rectangle of an image file; `None` takes the whole image.
    pub fn load_file(
        &mut self,
        path: &Path,
        rect: Option<((u32, u32), PixelSize)>,
    ) -> Result<SpriteHandle> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode sprite {}", path.display()))?;

        let (top_left, size) = rect.unwrap_or_else(|| {
            ((0, 0), PixelSize::new(decoded.width(), decoded.height()))
        });
        let key = SpriteKey {
            source: SpriteSource::File(path.to_path_buf()),
            top_left,
            size,
        };

        self.insert(key, || {
            anyhow::ensure!(
                top_left.0 + size.width <= decoded.width()
                    && top_left.1 + size.height <= decoded.height(),
                "rect {top_left:?}+{size} outside {}x{} image",
                decoded.width(),
                decoded.height()
            );
            let rgba = decoded
                .crop_imm(top_left.0, top_left.1, size.width, size.height)
                .to_rgba8();
            TexelImage::from_srgba8(size, rgba.as_raw())
        })
    }

    pub fn descriptor(&self, handle: SpriteHandle) -> Option<AtlasDescriptor> {
        self.entries.get(handle.0 as usize).map(|e| e.descriptor)
    }

    /// Sprites registered since the last upload, as `(layer, image)`.
    fn pending(&self) -> impl Iterator<Item = (u32, &TexelImage)> {
        self.entries
            .iter()
            .enumerate()
            .skip(self.uploaded)
            .map(|(i, e)| (i as u32, &e.image))
    }

    /// Uploads every pending sprite to the GPU atlas.
    pub fn sync(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        for (layer, image) in self.pending() {
            ctx.upload_image(layer, image)?;
        }
        self.uploaded = self.entries.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisp_engine::paint::Color;

    fn solid(size: PixelSize) -> Result<TexelImage> {
        Ok(TexelImage::filled(size, Color::WHITE))
    }

    fn key(name: &'static str, w: u32, h: u32) -> SpriteKey {
        SpriteKey {
            source: SpriteSource::Builtin(name),
            top_left: (0, 0),
            size: PixelSize::new(w, h),
        }
    }

    #[test]
    fn same_key_returns_same_handle_without_rebuilding() {
        let mut lib = SpriteLibrary::new(AtlasLayout::new(32, 32, 4));
        let a = lib.insert(key("tree", 16, 24), || solid(PixelSize::new(16, 24))).unwrap();
        let b = lib
            .insert(key("tree", 16, 24), || panic!("rebuilt a known sprite"))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(lib.len(), 1);
    }

    #[test]
    fn new_sprites_take_next_layer_and_matching_descriptor() {
        let mut lib = SpriteLibrary::new(AtlasLayout::new(32, 32, 4));
        let tree = lib.insert(key("tree", 16, 24), || solid(PixelSize::new(16, 24))).unwrap();
        let tank = lib.insert(key("tank", 32, 32), || solid(PixelSize::new(32, 32))).unwrap();
        assert_eq!(tree.layer(), 0);
        assert_eq!(tank.layer(), 1);
        assert_eq!(
            lib.descriptor(tree),
            Some(AtlasDescriptor::Bounded { valid_width: 16, valid_height: 24, layer: 0 })
        );
        assert_eq!(lib.descriptor(tank), Some(AtlasDescriptor::Indexed { layer: 1 }));
    }

    #[test]
    fn same_source_different_rect_is_a_new_sprite() {
        let mut lib = SpriteLibrary::new(AtlasLayout::new(32, 32, 4));
        let mut k = key("sheet", 8, 8);
        let a = lib.insert(k.clone(), || solid(PixelSize::new(8, 8))).unwrap();
        k.top_left = (8, 0);
        let b = lib.insert(k, || solid(PixelSize::new(8, 8))).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn full_atlas_and_oversize_sprites_are_rejected() {
        let mut lib = SpriteLibrary::new(AtlasLayout::new(32, 32, 1));
        assert!(lib.insert(key("big", 40, 8), || solid(PixelSize::new(40, 8))).is_err());
        lib.insert(key("a", 8, 8), || solid(PixelSize::new(8, 8))).unwrap();
        assert!(lib.insert(key("b", 8, 8), || solid(PixelSize::new(8, 8))).is_err());
    }

    #[test]
    fn pending_tracks_unuploaded_sprites() {
        let mut lib = SpriteLibrary::new(AtlasLayout::new(32, 32, 4));
        lib.insert(key("a", 8, 8), || solid(PixelSize::new(8, 8))).unwrap();
        lib.insert(key("b", 8, 8), || solid(PixelSize::new(8, 8))).unwrap();
        assert_eq!(lib.pending().count(), 2);
        lib.uploaded = 1;
        let layers: Vec<u32> = lib.pending().map(|(l, _)| l).collect();
        assert_eq!(layers, vec![1]);
    }
}
