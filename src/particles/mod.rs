pub mod config;
pub mod field;
pub mod gpu;

pub use config::{FieldConfig, PointStyle};
pub use field::{Orientation, ParticleField};
pub use gpu::{FrameUniform, ParticleFieldGpu};
