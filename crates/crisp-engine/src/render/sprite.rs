use anyhow::{ensure, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::atlas::{AtlasDescriptor, AtlasLayout};
use crate::coords::PixelSize;
use crate::paint::Color;
use crate::raster::TexelImage;
use crate::render::RenderCtx;
use crate::scene::{SpriteBatch, SpriteDraw};
use crate::transform::Camera;

use super::common::{
    clear_color, quad_primitive, snapping_sampler, ubo_min_binding_size, QuadVertex,
    SpriteUniform, QUAD_INDICES, QUAD_VERTICES, SPRITE_WGSL,
};

const ATLAS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Sprite pass: draws a `SpriteBatch` into the low-resolution canvas texture.
///
/// The atlas is a 2D texture array with one sprite per layer. Sprites are
/// sampled through a linear sampler whose coordinates are edge-snapped in the
/// fragment shader, then alpha-corrected and blended with straight alpha.
///
/// The canvas uses the surface format so the present pass can sample it
/// directly. Recreating it (format change) bumps `canvas_generation`.
pub struct SpriteRenderer {
    layout: AtlasLayout,
    canvas_size: PixelSize,
    clear: Color,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    sprite_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,

    canvas_texture: Option<wgpu::Texture>,
    canvas_view: Option<wgpu::TextureView>,
    canvas_generation: u64,

    quad_vbo: Option<wgpu::Buffer>,
    quad_ibo: Option<wgpu::Buffer>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,

    warned_invalid_camera: bool,
    warned_bad_layer: bool,
}

impl SpriteRenderer {
    pub fn new(canvas_size: PixelSize, layout: AtlasLayout, clear: Color) -> Self {
        Self {
            layout,
            canvas_size,
            clear,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            sprite_ubo: None,
            sampler: None,
            atlas_texture: None,
            atlas_view: None,
            canvas_texture: None,
            canvas_view: None,
            canvas_generation: 0,
            quad_vbo: None,
            quad_ibo: None,
            instance_vbo: None,
            instance_capacity: 0,
            warned_invalid_camera: false,
            warned_bad_layer: false,
        }
    }

    #[inline]
    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    #[inline]
    pub fn canvas_size(&self) -> PixelSize {
        self.canvas_size
    }

    /// Canvas view, available after the first `render`.
    #[inline]
    pub fn canvas_view(&self) -> Option<&wgpu::TextureView> {
        self.canvas_view.as_ref()
    }

    /// Incremented every time the canvas texture is recreated.
    #[inline]
    pub fn canvas_generation(&self) -> u64 {
        self.canvas_generation
    }

    /// Uploads sRGB RGBA8 pixels into atlas `layer`.
    ///
    /// The rest of the slot is cleared to transparent. Images smaller than the
    /// slot yield a `Bounded` descriptor so sampling stays inside the pixels
    /// written here.
    pub fn upload_layer(
        &mut self,
        ctx: &RenderCtx<'_>,
        layer: u32,
        size: PixelSize,
        srgba8: &[u8],
    ) -> Result<AtlasDescriptor> {
        let Some(descriptor) = self.layout.descriptor_for(layer, size) else {
            anyhow::bail!(
                "sprite {size} does not fit atlas slot {} (layer {layer} of {})",
                self.layout.slot,
                self.layout.layers
            );
        };
        ensure!(
            srgba8.len() == size.area() * 4,
            "expected {} bytes for a {size} sprite, got {}",
            size.area() * 4,
            srgba8.len()
        );

        self.ensure_atlas(ctx);
        let Some(atlas) = self.atlas_texture.as_ref() else {
            anyhow::bail!("atlas texture unavailable");
        };

        // Pad into a full slot so stale texels from an earlier upload vanish.
        let slot = self.layout.slot;
        let row = size.width as usize * 4;
        let slot_row = slot.width as usize * 4;
        let mut padded = vec![0u8; slot.area() * 4];
        for (y, src) in srgba8.chunks_exact(row.max(1)).enumerate() {
            padded[y * slot_row..y * slot_row + row].copy_from_slice(src);
        }

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            &padded,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(slot.width * 4),
                rows_per_image: Some(slot.height),
            },
            wgpu::Extent3d {
                width: slot.width,
                height: slot.height,
                depth_or_array_layers: 1,
            },
        );

        log::debug!("SpriteRenderer: uploaded {size} sprite to layer {layer}");
        Ok(descriptor)
    }

    /// Convenience wrapper over `upload_layer` for CPU-side images.
    pub fn upload_image(
        &mut self,
        ctx: &RenderCtx<'_>,
        layer: u32,
        image: &TexelImage,
    ) -> Result<AtlasDescriptor> {
        self.upload_layer(ctx, layer, image.size(), &image.to_srgba8())
    }

    /// Clears the canvas and draws `batch` in submission order.
    ///
    /// An invalid camera (non-finite or zero-sized) clears the canvas and
    /// draws nothing.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        batch: &SpriteBatch,
        camera: Camera,
    ) {
        self.ensure_atlas(ctx);
        self.ensure_canvas(ctx);
        self.ensure_pipeline(ctx);
        self.ensure_static_buffers(ctx);
        self.ensure_bindings(ctx);

        let instances = if camera.is_valid() {
            self.collect_instances(batch)
        } else {
            if !self.warned_invalid_camera {
                log::warn!("SpriteRenderer: invalid camera {camera:?}; canvas cleared only");
                self.warned_invalid_camera = true;
            }
            Vec::new()
        };

        // Mutating methods must happen before borrowing pipeline/buffers immutably.
        self.write_uniform(ctx, camera);
        if !instances.is_empty() {
            self.ensure_instance_capacity(ctx, instances.len());
            if let Some(vbo) = self.instance_vbo.as_ref() {
                ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&instances));
            }
        }

        let Some(canvas_view) = self.canvas_view.as_ref() else { return };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("crisp sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: canvas_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(self.clear)),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if instances.is_empty() {
            return;
        }

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };
        let Some(quad_vbo) = self.quad_vbo.as_ref() else { return };
        let Some(quad_ibo) = self.quad_ibo.as_ref() else { return };
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..instances.len() as u32);
    }

    fn collect_instances(&mut self, batch: &SpriteBatch) -> Vec<SpriteInstance> {
        let mut out = Vec::with_capacity(batch.len());
        for sprite in batch.items() {
            if sprite.descriptor.layer() >= self.layout.layers {
                if !self.warned_bad_layer {
                    log::warn!(
                        "SpriteRenderer: layer {} outside atlas of {}; sprite skipped",
                        sprite.descriptor.layer(),
                        self.layout.layers
                    );
                    self.warned_bad_layer = true;
                }
                continue;
            }
            if sprite.rect().is_empty() {
                continue;
            }
            out.push(SpriteInstance::from_draw(sprite, self.layout));
        }
        out
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, camera: Camera) {
        let Some(ubo) = self.sprite_ubo.as_ref() else { return };
        let slot = self.layout.slot.as_vec2();
        let u = SpriteUniform {
            camera_top_left: camera.top_left.to_array(),
            camera_size: camera.width_height.to_array(),
            atlas_slot: slot.to_array(),
            _pad: [0.0; 2],
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_atlas(&mut self, ctx: &RenderCtx<'_>) {
        if self.atlas_texture.is_some() {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("crisp sprite atlas"),
            size: wgpu::Extent3d {
                width: self.layout.slot.width,
                height: self.layout.slot.height,
                depth_or_array_layers: self.layout.layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ATLAS_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("crisp sprite atlas view"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        }));
        self.atlas_texture = Some(texture);
        self.bind_group = None;
    }

    fn ensure_canvas(&mut self, ctx: &RenderCtx<'_>) {
        if self.canvas_texture.is_some() && self.pipeline_format == Some(ctx.surface_format) {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("crisp canvas"),
            size: wgpu::Extent3d {
                width: self.canvas_size.width,
                height: self.canvas_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.surface_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        self.canvas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.canvas_texture = Some(texture);
        self.canvas_generation += 1;
        log::debug!(
            "SpriteRenderer: canvas {} ({:?}) generation {}",
            self.canvas_size,
            ctx.surface_format,
            self.canvas_generation
        );
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("crisp sprite shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_WGSL.into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("crisp sprite bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: ubo_min_binding_size::<SpriteUniform>(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("crisp sprite pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("crisp sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), SpriteInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: quad_primitive(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.sprite_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.sprite_ubo.is_some() {
            return;
        }
        if self.sampler.is_none() {
            self.sampler = Some(snapping_sampler(ctx.device, "crisp sprite sampler"));
        }

        let Some(bgl) = self.bind_group_layout.as_ref() else { return };
        let Some(atlas_view) = self.atlas_view.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        let sprite_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("crisp sprite ubo"),
            size: std::mem::size_of::<SpriteUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("crisp sprite bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: sprite_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.sprite_ubo = Some(sprite_ubo);
        self.bind_group = Some(bind_group);
    }

    fn ensure_static_buffers(&mut self, ctx: &RenderCtx<'_>) {
        if self.quad_vbo.is_some() && self.quad_ibo.is_some() {
            return;
        }

        self.quad_vbo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("crisp sprite quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.quad_ibo = Some(ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("crisp sprite quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    fn ensure_instance_capacity(&mut self, ctx: &RenderCtx<'_>, required_instances: usize) {
        if required_instances <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required_instances.next_power_of_two().max(64);
        let new_size = (new_cap * std::mem::size_of::<SpriteInstance>()) as u64;

        self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("crisp sprite instance vbo"),
            size: new_size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, PartialEq)]
struct SpriteInstance {
    origin: [f32; 2],
    size: [f32; 2],
    valid: [f32; 2],
    z: f32,
    layer: u32,
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x2, // valid texels
        4 => Float32,   // z
        5 => Uint32     // layer
    ];

    fn from_draw(sprite: &SpriteDraw, layout: AtlasLayout) -> Self {
        let r = sprite.rect().normalized();
        Self {
            origin: r.origin.to_array(),
            size: r.size.to_array(),
            valid: sprite.descriptor.valid_size(layout).as_vec2().to_array(),
            z: sprite.z,
            layer: sprite.descriptor.layer(),
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    fn layout() -> AtlasLayout {
        AtlasLayout::new(32, 32, 4)
    }

    #[test]
    fn bounded_sprite_instance_carries_valid_extent() {
        let desc = layout().descriptor_for(2, PixelSize::new(16, 24)).unwrap();
        let draw = SpriteDraw::native(Vec2::new(3.0, 4.0), desc, layout()).with_z(0.25);
        let inst = SpriteInstance::from_draw(&draw, layout());
        assert_eq!(inst.origin, [3.0, 4.0]);
        assert_eq!(inst.size, [16.0, 24.0]);
        assert_eq!(inst.valid, [16.0, 24.0]);
        assert_eq!(inst.z, 0.25);
        assert_eq!(inst.layer, 2);
    }

    #[test]
    fn indexed_sprite_uses_full_slot() {
        let draw = SpriteDraw::native(Vec2::ZERO, AtlasDescriptor::Indexed { layer: 1 }, layout());
        let inst = SpriteInstance::from_draw(&draw, layout());
        assert_eq!(inst.valid, [32.0, 32.0]);
    }

    #[test]
    fn out_of_range_layers_are_skipped() {
        let mut r = SpriteRenderer::new(PixelSize::new(8, 8), layout(), Color::BLACK);
        let mut batch = SpriteBatch::new();
        batch.push(SpriteDraw::native(Vec2::ZERO, AtlasDescriptor::Indexed { layer: 9 }, layout()));
        batch.push(SpriteDraw::native(Vec2::ZERO, AtlasDescriptor::Indexed { layer: 3 }, layout()));
        let out = r.collect_instances(&batch);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].layer, 3);
        assert!(r.warned_bad_layer);
    }

    #[test]
    fn instance_stride_matches_attributes() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }
}
