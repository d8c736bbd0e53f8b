use std::sync::mpsc;
use std::sync::Arc;

use winit::window::Window;

use crate::driver::{FrameInput, FrameRenderer};
use crate::error::RenderError;
use crate::particles::{ParticleField, ParticleFieldGpu, PointStyle};
use crate::sprite::SpriteTexture;

const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

async fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface,
            force_fallback_adapter: false,
        })
        .await
        .ok_or(RenderError::NoAdapter)?;

    let info = adapter.get_info();
    log::info!("using GPU: {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("ambient_field.device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
            },
            None,
        )
        .await?;
    Ok((adapter, device, queue))
}

struct SurfaceState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    particles: ParticleFieldGpu,
}

impl SurfaceState {
    fn reconfigure(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}

/// Draws into a window surface composited with transparency.
pub struct SurfaceRenderer {
    state: Option<SurfaceState>,
}

impl SurfaceRenderer {
    /// Fails when no adapter, device or surface is available; the caller is
    /// expected to carry on without a background.
    pub async fn new(
        window: Arc<Window>,
        field: &ParticleField,
        sprite: &SpriteTexture,
        style: PointStyle,
        target_size: (u32, u32),
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;
        let (adapter, device, queue) = request_device(&instance, Some(&surface)).await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::NoAdapter)?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            log::warn!("surface has no premultiplied alpha mode; background may be opaque");
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: target_size.0.max(1),
            height: target_size.1.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let particles = ParticleFieldGpu::init(&device, &queue, field, sprite, format, style);
        Ok(Self {
            state: Some(SurfaceState {
                surface,
                device,
                queue,
                config,
                particles,
            }),
        })
    }
}

impl FrameRenderer for SurfaceRenderer {
    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::Released)?;

        let (width, height) = frame.viewport.render_target_size();
        if (width, height) != (state.config.width, state.config.height) {
            log::debug!("reconfiguring surface to {width}x{height}");
            state.reconfigure(width, height);
        }

        let output = match state.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(other) => {
                // Outdated or timed out: skip this frame, the next one gets a
                // freshly configured surface.
                log::debug!("skipping frame: {other}");
                let (w, h) = (state.config.width, state.config.height);
                state.reconfigure(w, h);
                return Ok(());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = state
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particles.frame.encoder"),
            });
        state
            .particles
            .encode_draw(&state.queue, &mut encoder, &view, frame);
        state.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.state.take().is_some() {
            log::debug!("window surface released");
        }
    }
}

struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("particles.offscreen.target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }
}

struct OffscreenState {
    device: wgpu::Device,
    queue: wgpu::Queue,
    particles: ParticleFieldGpu,
    target: Option<OffscreenTarget>,
}

/// Renders into an RGBA8 texture sized to the viewport's render target.
pub struct OffscreenRenderer {
    state: Option<OffscreenState>,
}

impl OffscreenRenderer {
    pub fn new(
        field: &ParticleField,
        sprite: &SpriteTexture,
        style: PointStyle,
    ) -> Result<Self, RenderError> {
        pollster::block_on(Self::new_async(field, sprite, style))
    }

    async fn new_async(
        field: &ParticleField,
        sprite: &SpriteTexture,
        style: PointStyle,
    ) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let (_adapter, device, queue) = request_device(&instance, None).await?;
        let particles =
            ParticleFieldGpu::init(&device, &queue, field, sprite, OFFSCREEN_FORMAT, style);
        Ok(Self {
            state: Some(OffscreenState {
                device,
                queue,
                particles,
                target: None,
            }),
        })
    }

    /// Reads back the last rendered frame as tightly packed RGBA8 rows.
    pub fn read_pixels(&self) -> Result<(u32, u32, Vec<u8>), RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::Released)?;
        let Some(target) = &state.target else {
            return Ok((0, 0, Vec::new()));
        };

        let unpadded_row = target.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row = unpadded_row.div_ceil(align) * align;
        let staging = state.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles.offscreen.staging"),
            size: (padded_row * target.height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = state
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particles.offscreen.copy.encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(target.height),
                },
            },
            wgpu::Extent3d {
                width: target.width,
                height: target.height,
                depth_or_array_layers: 1,
            },
        );
        state.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        state.device.poll(wgpu::Maintain::Wait);

        let map_result = rx.recv().map_err(|_| RenderError::MapFailed)?;
        map_result.map_err(|_| RenderError::MapFailed)?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded_row * target.height) as usize);
        for row in data.chunks(padded_row as usize) {
            pixels.extend_from_slice(&row[..unpadded_row as usize]);
        }
        drop(data);
        staging.unmap();

        Ok((target.width, target.height, pixels))
    }
}

impl FrameRenderer for OffscreenRenderer {
    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::Released)?;

        let (width, height) = frame.viewport.render_target_size();
        let stale = state
            .target
            .as_ref()
            .map_or(true, |t| (t.width, t.height) != (width, height));
        if stale {
            state.target = Some(OffscreenTarget::new(&state.device, width, height));
        }
        let Some(target) = &state.target else {
            return Err(RenderError::Released);
        };

        let mut encoder = state
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particles.offscreen.encoder"),
            });
        state
            .particles
            .encode_draw(&state.queue, &mut encoder, &target.view, frame);
        state.queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn release(&mut self) {
        self.state = None;
    }
}
