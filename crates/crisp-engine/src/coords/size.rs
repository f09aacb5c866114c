use super::Vec2;

/// Integer extent in pixels or texels (canvas, display surface, atlas slot).
///
/// Zero-sized extents are representable but are never valid render targets;
/// use [`is_valid`](Self::is_valid) at the boundary where sizes come in.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Returns true when `other` fits inside `self` on both axes.
    #[inline]
    pub fn contains(self, other: PixelSize) -> bool {
        other.width <= self.width && other.height <= self.height
    }
}

impl std::fmt::Display for PixelSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for PixelSize {
    type Err = anyhow::Error;

    /// Parses `WIDTHxHEIGHT` (e.g. `320x240`).
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got {s:?}"))?;
        let size = PixelSize::new(w.trim().parse()?, h.trim().parse()?);
        anyhow::ensure!(size.is_valid(), "size must be non-zero, got {size}");
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_by_height() {
        let s: PixelSize = "320x240".parse().unwrap();
        assert_eq!(s, PixelSize::new(320, 240));
        assert_eq!(s.to_string(), "320x240");
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!("0x240".parse::<PixelSize>().is_err());
        assert!("320".parse::<PixelSize>().is_err());
        assert!("axb".parse::<PixelSize>().is_err());
    }

    #[test]
    fn contains_is_per_axis() {
        let slot = PixelSize::new(64, 64);
        assert!(slot.contains(PixelSize::new(32, 64)));
        assert!(!slot.contains(PixelSize::new(65, 1)));
    }
}
