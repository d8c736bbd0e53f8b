use std::borrow::Cow;
use std::mem::size_of;

use bytemuck::{bytes_of, cast_slice, Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::config::PointStyle;
use super::field::ParticleField;
use crate::driver::FrameInput;
use crate::sprite::SpriteTexture;

/// position.xyz
const POSITION_STRIDE_BYTES: u64 = 12;
/// One billboard quad, two triangles.
const VERTICES_PER_PARTICLE: u32 = 6;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    point_size: f32,
    aspect: f32,
    _pad: [f32; 2],
}

impl FrameUniform {
    pub fn new(frame: &FrameInput<'_>, style: PointStyle) -> Self {
        let [r, g, b] = style.color;
        Self {
            view_proj: frame.viewport.view_projection().to_cols_array_2d(),
            model: frame.field.model_matrix().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            point_size: style.size,
            aspect: frame.viewport.aspect(),
            _pad: [0.0; 2],
        }
    }
}

/// GPU resources for drawing a [`ParticleField`] as textured point sprites.
pub struct ParticleFieldGpu {
    style: PointStyle,
    instance_count: u32,
    position_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    _sprite_texture: wgpu::Texture,
}

impl ParticleFieldGpu {
    pub fn init(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        field: &ParticleField,
        sprite: &SpriteTexture,
        target_format: wgpu::TextureFormat,
        style: PointStyle,
    ) -> Self {
        let position_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particles.positions"),
            contents: cast_slice(field.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles.uniform"),
            size: size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sprite_size = wgpu::Extent3d {
            width: sprite.size(),
            height: sprite.size(),
            depth_or_array_layers: 1,
        };
        let sprite_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("particles.sprite"),
            size: sprite_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &sprite_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            sprite.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(sprite.size() * 4),
                rows_per_image: Some(sprite.size()),
            },
            sprite_size,
        );
        let sprite_view = sprite_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("particles.sprite.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("particles.render.bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
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

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("particles.render.bg"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particles.render.pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader_source = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/shaders/particle_field.wgsl"
        ));
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particles.render.shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(shader_source)),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("particles.render.pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: POSITION_STRIDE_BYTES,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(additive_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Sprites are transparent and never occlude each other.
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            style,
            instance_count: field.len() as u32,
            position_buffer,
            uniform_buffer,
            bind_group,
            pipeline,
            _sprite_texture: sprite_texture,
        }
    }

    pub fn particle_count(&self) -> u32 {
        self.instance_count
    }

    /// Clears `target` to transparent and draws the field into it.
    pub fn encode_draw(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        frame: &FrameInput<'_>,
    ) {
        let uniform = FrameUniform::new(frame, self.style);
        queue.write_buffer(&self.uniform_buffer, 0, bytes_of(&uniform));

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("particles.render.pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.position_buffer.slice(..));
        pass.draw(0..VERTICES_PER_PARTICLE, 0..self.instance_count);
    }
}

fn additive_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::One,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{additive_blend, FrameUniform, POSITION_STRIDE_BYTES};
    use crate::driver::FrameInput;
    use crate::particles::{Orientation, ParticleField, PointStyle};
    use crate::viewport::Viewport;

    #[test]
    fn frame_uniform_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>(), 160);
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }

    #[test]
    fn position_stride_matches_field_layout() {
        assert_eq!(POSITION_STRIDE_BYTES as usize, std::mem::size_of::<[f32; 3]>());
    }

    #[test]
    fn frame_uniform_carries_orientation_and_aspect() {
        let mut field = ParticleField::create(4, 1.0).unwrap();
        field.set_orientation(Orientation::new(0.3, -0.2));
        let viewport = Viewport::new(1600, 800, 1.0);
        let frame = FrameInput {
            field: &field,
            viewport: &viewport,
        };

        let uniform = FrameUniform::new(&frame, PointStyle::default());
        assert_eq!(uniform.model, field.model_matrix().to_cols_array_2d());
        assert_eq!(uniform.aspect, 2.0);
        assert_eq!(uniform.point_size, 0.05);
        assert_eq!(uniform.color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn blending_is_additive() {
        let blend = additive_blend();
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }
}
