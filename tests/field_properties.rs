use ambient_field::particles::ParticleField;
use ambient_field::FieldError;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn positions_fill_count_and_stay_in_bounds(
        count in 1usize..2_000,
        half_width in 0.01f32..100.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let field = ParticleField::create_with_rng(count, half_width, &mut rng).unwrap();
        prop_assert_eq!(field.len(), count);
        for p in field.positions() {
            for c in p {
                prop_assert!((-half_width..=half_width).contains(c), "{} outside ±{}", c, half_width);
            }
        }
    }

    #[test]
    fn non_positive_bounds_are_rejected(half_width in -100.0f32..=0.0) {
        prop_assert_eq!(
            ParticleField::create(10, half_width).unwrap_err(),
            FieldError::InvalidBound(half_width)
        );
    }

    #[test]
    fn bounds_with_overflowing_span_are_rejected(half_width in 1.8e38f32..=f32::MAX) {
        prop_assert_eq!(
            ParticleField::create(10, half_width).unwrap_err(),
            FieldError::InvalidBound(half_width)
        );
    }
}

#[test]
fn zero_particles_is_an_error_not_a_clamp() {
    assert_eq!(
        ParticleField::create(0, 12.5).unwrap_err(),
        FieldError::InvalidParticleCount(0)
    );
}
