//! Shared GPU types and utilities used by both passes.

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

// ── shader sources ────────────────────────────────────────────────────────

pub(super) const SPRITE_WGSL: &str = concat!(
    include_str!("shaders/snap.wgsl"),
    include_str!("shaders/sprite.wgsl"),
);

pub(super) const PRESENT_WGSL: &str = concat!(
    include_str!("shaders/snap.wgsl"),
    include_str!("shaders/present.wgsl"),
);

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct SpriteUniform {
    pub camera_top_left: [f32; 2],
    pub camera_size: [f32; 2],
    pub atlas_slot: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct PresentUniform {
    pub scale: [f32; 2],
    pub canvas_size: [f32; 2],
}

/// Returns the `wgpu` minimum binding size for a uniform struct.
///
/// Both uniforms are 16 or 32 bytes so the size is never zero.
pub(super) fn ubo_min_binding_size<T: Pod>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── misc ──────────────────────────────────────────────────────────────────

pub(super) fn clear_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

/// Linear clamp-to-edge sampler; snapping turns it into crisp texels.
pub(super) fn snapping_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

pub(super) fn quad_primitive() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_carry_shared_snapping_and_both_entry_points() {
        for src in [SPRITE_WGSL, PRESENT_WGSL] {
            assert!(src.contains("fn snap_uv"));
            assert!(src.contains("fn vs_main"));
            assert!(src.contains("fn fs_main"));
        }
        assert!(SPRITE_WGSL.contains("alpha_corrected(color)"));
    }

    #[test]
    fn uniforms_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<SpriteUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<PresentUniform>() % 16, 0);
        assert!(ubo_min_binding_size::<PresentUniform>().is_some());
    }
}
