use anyhow::Result;

use crate::coords::PixelSize;
use crate::paint::Color;

/// Owned linear RGBA image, row-major, top row first.
///
/// Used for atlas layers, the low-resolution canvas and the display surface
/// of the CPU reference passes.
#[derive(Debug, Clone, PartialEq)]
pub struct TexelImage {
    size: PixelSize,
    texels: Vec<Color>,
}

impl TexelImage {
    /// Fully transparent image.
    pub fn new(size: PixelSize) -> Self {
        Self::filled(size, Color::TRANSPARENT)
    }

    pub fn filled(size: PixelSize, color: Color) -> Self {
        Self {
            size,
            texels: vec![color; size.area()],
        }
    }

    pub fn from_fn(size: PixelSize, f: impl Fn(u32, u32) -> Color) -> Self {
        let mut texels = Vec::with_capacity(size.area());
        for y in 0..size.height {
            for x in 0..size.width {
                texels.push(f(x, y));
            }
        }
        Self { size, texels }
    }

    /// Decodes tightly packed straight-alpha sRGB bytes (`Rgba8UnormSrgb` layout).
    pub fn from_srgba8(size: PixelSize, bytes: &[u8]) -> Result<Self> {
        anyhow::ensure!(
            bytes.len() == size.area() * 4,
            "expected {} bytes for a {size} RGBA8 image, got {}",
            size.area() * 4,
            bytes.len()
        );
        let texels = bytes
            .chunks_exact(4)
            .map(|p| Color::from_srgb_u8(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self { size, texels })
    }

    /// Encodes to tightly packed straight-alpha sRGB bytes.
    pub fn to_srgba8(&self) -> Vec<u8> {
        self.texels.iter().flat_map(|c| c.to_srgb_u8()).collect()
    }

    #[inline]
    pub fn size(&self) -> PixelSize {
        self.size
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.height
    }

    #[inline]
    pub fn texels(&self) -> &[Color] {
        &self.texels
    }

    /// Texel at `(x, y)`. Panics when out of range.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.texels[self.index(x, y)]
    }

    pub fn fill(&mut self, color: Color) {
        self.texels.fill(color);
    }

    /// Copies `src` with its top-left corner at `(x, y)`, clipped to `self`.
    pub fn blit(&mut self, src: &TexelImage, x: u32, y: u32) {
        let w = src.width().min(self.width().saturating_sub(x));
        let h = src.height().min(self.height().saturating_sub(y));
        if w == 0 || h == 0 {
            return;
        }
        for row in 0..h {
            let d = self.index(x, y + row);
            let s = src.index(0, row);
            self.texels[d..d + w as usize].copy_from_slice(&src.texels[s..s + w as usize]);
        }
    }

    /// Mutable texel storage; passes split it into rows for parallel writes.
    #[inline]
    pub(crate) fn texels_mut(&mut self) -> &mut [Color] {
        &mut self.texels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.size.width && y < self.size.height);
        y as usize * self.size.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_clips_to_destination() {
        let mut dst = TexelImage::new(PixelSize::new(4, 4));
        let src = TexelImage::filled(PixelSize::new(3, 3), Color::WHITE);
        dst.blit(&src, 2, 3);

        assert_eq!(dst.get(2, 3), Color::WHITE);
        assert_eq!(dst.get(3, 3), Color::WHITE);
        assert_eq!(dst.get(1, 3), Color::TRANSPARENT);
        assert_eq!(dst.get(3, 2), Color::TRANSPARENT);

        let before = dst.clone();
        dst.blit(&src, 9, 0);
        assert_eq!(dst, before);
    }

    #[test]
    fn srgba8_length_is_checked() {
        assert!(TexelImage::from_srgba8(PixelSize::new(2, 2), &[0; 15]).is_err());
        let img = TexelImage::from_srgba8(PixelSize::new(1, 2), &[255, 0, 0, 255, 0, 0, 0, 0]).unwrap();
        assert!(img.get(0, 0).max_abs_diff(Color::new(1.0, 0.0, 0.0, 1.0)) < 1e-6);
        assert_eq!(img.to_srgba8(), vec![255, 0, 0, 255, 0, 0, 0, 0]);
    }
}
