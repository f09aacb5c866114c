//! Procedural sprites used when no image paths are given.

use crisp_engine::coords::PixelSize;
use crisp_engine::paint::Color;
use crisp_engine::raster::TexelImage;

pub const TREE_SIZE: PixelSize = PixelSize::new(16, 24);
pub const TANK_SIZE: PixelSize = PixelSize::new(32, 32);

/// 16x24 tree: smaller than a slot, so it lands in a bounded slot.
///
/// The canopy rim is half transparent to show alpha correction.
pub fn tree() -> TexelImage {
    let leaves = Color::from_srgb_u8(46, 125, 50, 255);
    let rim = Color::from_srgb_u8(102, 187, 106, 128);
    let trunk = Color::from_srgb_u8(109, 76, 65, 255);

    TexelImage::from_fn(TREE_SIZE, |x, y| {
        let dx = x as f32 + 0.5 - 8.0;
        let dy = y as f32 + 0.5 - 8.0;
        let d2 = dx * dx + dy * dy;
        if d2 < 6.0 * 6.0 {
            leaves
        } else if d2 < 7.5 * 7.5 {
            rim
        } else if (6..10).contains(&x) && y >= 14 {
            trunk
        } else {
            Color::TRANSPARENT
        }
    })
}

/// 32x32 tank filling a whole slot.
pub fn tank() -> TexelImage {
    let hull = Color::from_srgb_u8(85, 107, 47, 255);
    let turret = Color::from_srgb_u8(107, 142, 35, 255);
    let tread = Color::from_srgb_u8(60, 60, 60, 255);
    let tread_link = Color::from_srgb_u8(120, 120, 120, 255);

    TexelImage::from_fn(TANK_SIZE, |x, y| match (x, y) {
        (22..=30, 11..=12) => turret,
        (10..=21, 8..=15) => turret,
        (2..=29, 22..=27) if x % 3 == 0 => tread_link,
        (2..=29, 22..=27) => tread,
        (2..=29, 14..=21) => hull,
        _ => Color::TRANSPARENT,
    })
}
