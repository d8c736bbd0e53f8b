use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particles::{FieldConfig, ParticleField, PointStyle};
use crate::quality::QualityTier;

/// Coefficients that turn time, pointer and scroll into field orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Yaw radians per elapsed second.
    pub time_rate: f32,
    pub pointer_yaw_gain: f32,
    pub pointer_pitch_gain: f32,
    /// Scroll rotation radians per scrolled pixel.
    pub scroll_rate: f32,
    pub wrap_scroll_rotation: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            time_rate: 0.03,
            pointer_yaw_gain: 0.2,
            pointer_pitch_gain: 0.2,
            scroll_rate: 0.0008,
            wrap_scroll_rotation: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field: FieldConfig,
    pub motion: MotionConfig,
    pub style: PointStyle,
    pub tier: Option<QualityTier>,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Field parameters after the quality tier, if any, has been applied.
    pub fn effective_field(&self) -> FieldConfig {
        match self.tier {
            Some(tier) => FieldConfig {
                particle_count: tier.budget().particle_count,
                ..self.field
            },
            None => self.field,
        }
    }

    pub fn build_field(&self) -> Result<ParticleField, ConfigError> {
        Ok(ParticleField::from_config(&self.effective_field())?)
    }

    pub fn max_pixel_density(&self) -> f32 {
        self.tier
            .map(|tier| tier.budget().max_pixel_density)
            .unwrap_or(crate::viewport::MAX_PIXEL_DENSITY)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{AppConfig, MotionConfig};
    use crate::error::ConfigError;
    use crate::quality::QualityTier;

    #[test]
    fn empty_json_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.field.particle_count, 8_000);
        assert_eq!(config.motion, MotionConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            AppConfig::from_json(r#"{"field": {"particle_count": 500}, "tier": "low"}"#).unwrap();
        assert_eq!(config.field.particle_count, 500);
        assert_eq!(config.field.half_width, 12.5);
        assert_eq!(config.tier, Some(QualityTier::Low));
        assert_eq!(config.effective_field().particle_count, 4_000);
        assert_eq!(config.max_pixel_density(), 1.0);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"motion": {{"wrap_scroll_rotation": true}}}}"#).unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert!(config.motion.wrap_scroll_rotation);
        assert_eq!(config.motion.time_rate, 0.03);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn invalid_field_surfaces_as_config_error() {
        let config = AppConfig::from_json(r#"{"field": {"particle_count": 0}}"#).unwrap();
        assert!(matches!(config.build_field(), Err(ConfigError::Field(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
