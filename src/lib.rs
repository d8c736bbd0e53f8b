pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod particles;
pub mod quality;
pub mod reveal;
pub mod sprite;
pub mod surface;
pub mod viewport;

pub use config::{AppConfig, MotionConfig};
pub use driver::{AnimationDriver, DriverState, FrameClock, FrameRenderer, FrameScheduler, TickOutcome};
pub use error::{ConfigError, DriverError, FieldError, RenderError};
pub use input::{InputSnapshot, InputState};
pub use particles::{FieldConfig, Orientation, ParticleField, PointStyle};
pub use sprite::SpriteTexture;
pub use viewport::Viewport;
