use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::AppConfig;
use crate::driver::{AnimationDriver, FrameScheduler, MonotonicClock};
use crate::input::{InputState, ScrollOffset, LINE_HEIGHT_PX};
use crate::particles::ParticleField;
use crate::sprite::{self, SpriteTexture};
use crate::surface::SurfaceRenderer;
use crate::viewport::Viewport;

/// Schedules ticks through winit redraw requests.
pub struct WindowScheduler {
    window: Arc<Window>,
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

type WindowDriver = AnimationDriver<SurfaceRenderer, MonotonicClock, WindowScheduler>;

pub fn run(config: AppConfig, field: ParticleField) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut app = BackdropApp::new(config, field);
    event_loop.run_app(&mut app)
}

struct BackdropApp {
    config: AppConfig,
    field: ParticleField,
    sprite: SpriteTexture,
    input: InputState,
    scroll: ScrollOffset,
    viewport: Viewport,
    window: Option<Arc<Window>>,
    driver: Option<WindowDriver>,
}

impl BackdropApp {
    fn new(config: AppConfig, field: ParticleField) -> Self {
        let input = InputState::with_config(&config.motion);
        let viewport = Viewport::new(1, 1, 1.0).with_max_pixel_density(config.max_pixel_density());
        Self {
            config,
            field,
            sprite: sprite::generate(),
            input,
            scroll: ScrollOffset::default(),
            viewport,
            window: None,
            driver: None,
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    fn resize_viewport(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let logical: LogicalSize<u32> = size.to_logical(scale_factor);
        self.viewport
            .resize(logical.width, logical.height, scale_factor as f32);
    }

    fn start_driver(&mut self, window: Arc<Window>) {
        let renderer = pollster::block_on(SurfaceRenderer::new(
            window.clone(),
            &self.field,
            &self.sprite,
            self.config.style,
            self.viewport.render_target_size(),
        ));
        match renderer {
            Ok(renderer) => {
                let mut driver = AnimationDriver::new(
                    self.field.clone(),
                    renderer,
                    MonotonicClock::default(),
                    WindowScheduler { window },
                    self.config.motion,
                );
                driver.start();
                self.driver = Some(driver);
            }
            Err(err) => {
                log::error!("background animation unavailable: {err}");
            }
        }
    }

    fn stop_driver(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
    }
}

impl ApplicationHandler for BackdropApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window = match &self.window {
            Some(window) => window.clone(),
            None => {
                let attributes = Window::default_attributes()
                    .with_title("ambient field")
                    .with_transparent(true)
                    .with_inner_size(LogicalSize::new(1280.0, 720.0));
                match event_loop.create_window(attributes) {
                    Ok(window) => Arc::new(window),
                    Err(err) => {
                        log::error!("failed to create window: {err}");
                        event_loop.exit();
                        return;
                    }
                }
            }
        };
        self.window = Some(window.clone());
        self.resize_viewport(window.inner_size(), window.scale_factor());

        if self.driver.is_none() {
            self.start_driver(window);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop_driver();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.scale_factor());
                self.input.on_pointer_move(
                    logical.x,
                    logical.y,
                    self.viewport.width() as f32,
                    self.viewport.height() as f32,
                );
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Wheel up reports positive y; the document scrolls the other way.
                let delta_px = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT_PX,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y / self.scale_factor()) as f32,
                };
                let offset = self.scroll.apply(delta_px);
                self.input.on_scroll(offset);
            }
            WindowEvent::Resized(size) => {
                let scale_factor = self.scale_factor();
                self.resize_viewport(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.viewport.resize(
                    self.viewport.width(),
                    self.viewport.height(),
                    scale_factor as f32,
                );
            }
            WindowEvent::RedrawRequested => {
                if let Some(driver) = &mut self.driver {
                    if let Err(err) = driver.tick(&self.input, &self.viewport) {
                        log::error!("background animation halted: {err}");
                    }
                }
            }
            WindowEvent::CloseRequested => {
                self.stop_driver();
                event_loop.exit();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop_driver();
    }
}
