use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub particle_count: usize,
    pub half_width: f32,
    /// Fixed seed for reproducible layouts; `None` draws from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 8_000,
            half_width: 12.5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointStyle {
    /// Sprite edge length in world units at unit view depth.
    pub size: f32,
    pub color: [f32; 3],
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            size: 0.05,
            color: [1.0, 1.0, 1.0],
        }
    }
}
