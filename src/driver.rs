use std::time::Instant;

use crate::config::MotionConfig;
use crate::error::{DriverError, RenderError};
use crate::input::{InputSnapshot, InputState};
use crate::particles::{Orientation, ParticleField};
use crate::viewport::Viewport;

pub trait FrameClock {
    fn restart(&mut self);
    fn elapsed_seconds(&self) -> f32;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl FrameClock for MonotonicClock {
    fn restart(&mut self) {
        self.start = Instant::now();
    }

    fn elapsed_seconds(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f32,
}

impl ManualClock {
    pub fn set(&mut self, seconds: f32) {
        self.now = seconds.max(0.0);
    }

    pub fn advance(&mut self, dt_seconds: f32) {
        self.now += dt_seconds.max(0.0);
    }
}

impl FrameClock for ManualClock {
    fn restart(&mut self) {
        self.now = 0.0;
    }

    fn elapsed_seconds(&self) -> f32 {
        self.now
    }
}

pub trait FrameScheduler {
    /// Ask the host for one more tick at the next display refresh.
    fn request_frame(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountingScheduler {
    requested: u64,
    pending: bool,
}

impl CountingScheduler {
    pub fn requested(&self) -> u64 {
        self.requested
    }

    /// Consumes the outstanding request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) {
        self.requested += 1;
        self.pending = true;
    }
}

pub struct FrameInput<'a> {
    pub field: &'a ParticleField,
    pub viewport: &'a Viewport,
}

pub trait FrameRenderer {
    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError>;

    /// Drop the render target. Rendering afterwards is an error.
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CountingRenderer {
    renders: u64,
    releases: u32,
    last_orientation: Option<Orientation>,
}

impl CountingRenderer {
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn releases(&self) -> u32 {
        self.releases
    }

    pub fn last_orientation(&self) -> Option<Orientation> {
        self.last_orientation
    }
}

impl FrameRenderer for CountingRenderer {
    fn render(&mut self, frame: &FrameInput<'_>) -> Result<(), RenderError> {
        self.renders += 1;
        self.last_orientation = Some(frame.field.orientation());
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Rendered(Orientation),
    Idle,
}

pub fn orientation_at(t: f32, input: InputSnapshot, motion: &MotionConfig) -> Orientation {
    let [px, py] = input.pointer_offset;
    Orientation {
        yaw: t * motion.time_rate + px * motion.pointer_yaw_gain + input.scroll_rotation,
        pitch: -py * motion.pointer_pitch_gain,
    }
}

pub struct AnimationDriver<R, C, S> {
    field: ParticleField,
    renderer: R,
    clock: C,
    scheduler: S,
    motion: MotionConfig,
    state: DriverState,
    frames_rendered: u64,
}

impl<R, C, S> AnimationDriver<R, C, S>
where
    R: FrameRenderer,
    C: FrameClock,
    S: FrameScheduler,
{
    pub fn new(field: ParticleField, renderer: R, clock: C, scheduler: S, motion: MotionConfig) -> Self {
        Self {
            field,
            renderer,
            clock,
            scheduler,
            motion,
            state: DriverState::Stopped,
            frames_rendered: 0,
        }
    }

    pub fn start(&mut self) {
        if self.state == DriverState::Running {
            return;
        }
        self.state = DriverState::Running;
        self.clock.restart();
        log::info!("animation started ({} particles)", self.field.len());
        self.scheduler.request_frame();
    }

    pub fn stop(&mut self) {
        if self.state == DriverState::Stopped {
            return;
        }
        self.state = DriverState::Stopped;
        self.renderer.release();
        log::info!("animation stopped after {} frames", self.frames_rendered);
    }

    pub fn tick(
        &mut self,
        input: &InputState,
        viewport: &Viewport,
    ) -> Result<TickOutcome, DriverError> {
        if self.state != DriverState::Running {
            return Ok(TickOutcome::Idle);
        }

        let elapsed_seconds = self.clock.elapsed_seconds();
        let snapshot = input.snapshot();
        let orientation = orientation_at(elapsed_seconds, snapshot, &self.motion);
        self.field.set_orientation(orientation);

        let frame = FrameInput {
            field: &self.field,
            viewport,
        };
        if let Err(err) = self.renderer.render(&frame) {
            log::error!("render failed, stopping animation: {err}");
            self.stop();
            return Err(err.into());
        }

        self.frames_rendered += 1;
        self.scheduler.request_frame();
        Ok(TickOutcome::Rendered(orientation))
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
