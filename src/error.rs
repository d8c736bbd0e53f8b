use std::path::PathBuf;

use thiserror::Error;

/// Rejected particle-field construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("particle count must be greater than zero, got {0}")]
    InvalidParticleCount(usize),
    #[error("bound half-width must be positive with a finite span, got {0}")]
    InvalidBound(f32),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("rendering surface lost")]
    SurfaceLost,
    #[error("GPU ran out of memory")]
    OutOfMemory,
    #[error("render target already released")]
    Released,
    #[error("failed to map GPU readback buffer")]
    MapFailed,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("frame render failed: {0}")]
    Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Field(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::{DriverError, FieldError, RenderError};

    #[test]
    fn field_error_names_the_bad_value() {
        let err = FieldError::InvalidParticleCount(0);
        assert_eq!(err.to_string(), "particle count must be greater than zero, got 0");
    }

    #[test]
    fn driver_error_wraps_render_error() {
        let err = DriverError::from(RenderError::SurfaceLost);
        assert_eq!(err.to_string(), "frame render failed: rendering surface lost");
    }
}
