use glam::Mat4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::FieldConfig;
use crate::error::FieldError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    /// Euler XYZ: pitch applied after yaw.
    pub fn matrix(self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch) * Mat4::from_rotation_y(self.yaw)
    }
}

/// Fixed set of point positions sampled once inside a cube.
#[derive(Debug, Clone)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    half_width: f32,
    orientation: Orientation,
}

impl ParticleField {
    pub fn create(count: usize, half_width: f32) -> Result<Self, FieldError> {
        Self::create_with_rng(count, half_width, &mut rand::thread_rng())
    }

    pub fn create_with_rng<R: Rng>(
        count: usize,
        half_width: f32,
        rng: &mut R,
    ) -> Result<Self, FieldError> {
        if count == 0 {
            return Err(FieldError::InvalidParticleCount(count));
        }
        // The sampled span is 2 * half_width and must stay finite.
        if !(2.0 * half_width).is_finite() || half_width <= 0.0 {
            return Err(FieldError::InvalidBound(half_width));
        }

        let positions = (0..count)
            .map(|_| {
                [
                    rng.gen_range(-half_width..=half_width),
                    rng.gen_range(-half_width..=half_width),
                    rng.gen_range(-half_width..=half_width),
                ]
            })
            .collect();

        Ok(Self {
            positions,
            half_width,
            orientation: Orientation::default(),
        })
    }

    pub fn from_config(config: &FieldConfig) -> Result<Self, FieldError> {
        match config.seed {
            Some(seed) => Self::create_with_rng(
                config.particle_count,
                config.half_width,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => Self::create(config.particle_count, config.half_width),
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.orientation.matrix()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{FieldConfig, Orientation, ParticleField};
    use crate::error::FieldError;

    #[test]
    fn create_fills_requested_count_within_bounds() {
        let field = ParticleField::create(8_000, 12.5).unwrap();
        assert_eq!(field.len(), 8_000);
        assert!(field
            .positions()
            .iter()
            .flatten()
            .all(|c| (-12.5..=12.5).contains(c)));
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = ParticleField::create(0, 12.5).unwrap_err();
        assert_eq!(err, FieldError::InvalidParticleCount(0));
    }

    #[test]
    fn non_positive_bound_is_rejected() {
        assert!(matches!(
            ParticleField::create(10, -1.0),
            Err(FieldError::InvalidBound(_))
        ));
        assert!(matches!(
            ParticleField::create(10, f32::NAN),
            Err(FieldError::InvalidBound(_))
        ));
    }

    #[test]
    fn bound_whose_span_overflows_is_rejected() {
        for half_width in [f32::MAX, 2.0e38, f32::INFINITY] {
            assert_eq!(
                ParticleField::create(4, half_width).unwrap_err(),
                FieldError::InvalidBound(half_width)
            );
        }
        assert_eq!(ParticleField::create(4, 1.0e38).unwrap().len(), 4);
    }

    #[test]
    fn seeded_fields_are_reproducible() {
        let config = FieldConfig {
            particle_count: 64,
            half_width: 3.0,
            seed: Some(7),
        };
        let a = ParticleField::from_config(&config).unwrap();
        let b = ParticleField::from_config(&config).unwrap();
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn orientation_changes_leave_positions_untouched() {
        let mut field =
            ParticleField::create_with_rng(16, 1.0, &mut StdRng::seed_from_u64(1)).unwrap();
        let before = field.positions().to_vec();
        field.set_orientation(Orientation::new(0.6, 0.1));
        assert_eq!(field.positions(), before.as_slice());
        assert_eq!(field.orientation(), Orientation::new(0.6, 0.1));
    }

    #[test]
    fn yaw_rotates_about_y() {
        let m = Orientation::new(std::f32::consts::FRAC_PI_2, 0.0).matrix();
        let v = m.transform_point3(Vec3::X);
        assert!((v - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
