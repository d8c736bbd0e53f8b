use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    Standard,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetProfile {
    pub particle_count: usize,
    pub max_pixel_density: f32,
}

impl QualityTier {
    pub fn budget(self) -> BudgetProfile {
        match self {
            Self::Low => BudgetProfile {
                particle_count: 4_000,
                max_pixel_density: 1.0,
            },
            Self::Standard => BudgetProfile {
                particle_count: 8_000,
                max_pixel_density: 2.0,
            },
            Self::High => BudgetProfile {
                particle_count: 16_000,
                max_pixel_density: 2.0,
            },
        }
    }
}
