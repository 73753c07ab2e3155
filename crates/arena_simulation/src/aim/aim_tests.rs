//! Tests for aim resolution.

#[cfg(test)]
mod tests {
    use super::super::*;
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Пустой мир: ничего не блокирует
    struct OpenSky;

    impl LineTracer for OpenSky {
        fn line_trace(&self, _start: Vec3, _end: Vec3, _ignore: Option<Entity>) -> Option<Vec3> {
            None
        }
    }

    fn source() -> AimSource {
        AimSource {
            origin: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::NEG_Z,
        }
    }

    #[test]
    fn test_aim_defaults() {
        let tuning = AimTuning::default();
        assert_eq!(tuning.aim_range, 100.0);
        assert_eq!(tuning.variance_half_angle_deg, 10.0);
        assert_eq!(tuning.offset_range(), (-0.60, -0.35));
    }

    #[test]
    fn test_cone_samples_stay_inside_half_angle() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let axis = Vec3::new(1.0, 0.2, -0.5).normalize();
        let half_angle = 10.0f32.to_radians();

        for _ in 0..500 {
            let dir = random_unit_vector_in_cone(axis, half_angle, &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
            assert!(dir.angle_between(axis) <= half_angle + 1e-3);
        }
    }

    #[test]
    fn test_zero_cone_returns_axis() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dir = random_unit_vector_in_cone(Vec3::X * 3.0, 0.0, &mut rng);
        assert_eq!(dir, Vec3::X);
    }

    #[test]
    fn test_target_ahead_respects_vertical_offset_range() {
        // Без конуса точка лежит на луче через target + offset
        let tuning = AimTuning {
            variance_half_angle_deg: 0.0,
            ..AimTuning::default()
        };
        let target = Vec3::new(0.0, 1.6, -20.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..100 {
            let point = resolve_fire_target(&source(), Some(target), &tuning, &OpenSky, None, &mut rng);
            let dir = (point - source().origin).normalize();
            // Высота луча на дистанции цели
            let height_at_target = source().origin.y + dir.y / -dir.z * 20.0;
            let offset = height_at_target - target.y;
            assert!(
                (-0.60 - 1e-3..=-0.35 + 1e-3).contains(&offset),
                "offset {offset} outside range"
            );
            assert!((point.distance(source().origin) - tuning.aim_range).abs() < 1e-2);
        }
    }

    #[test]
    fn test_target_ahead_stays_inside_cone() {
        let tuning = AimTuning::default();
        let target = Vec3::new(0.0, 1.6, -20.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // Конус + максимальный угол, который может дать вертикальный bias
        let bias_angle = (0.60f32 / 20.0).atan();
        let limit = tuning.variance_half_angle_deg.to_radians() + bias_angle + 1e-3;

        for _ in 0..200 {
            let point = resolve_fire_target(&source(), Some(target), &tuning, &OpenSky, None, &mut rng);
            let dir = point - source().origin;
            assert!(dir.angle_between(target - source().origin) <= limit);
        }
    }

    #[test]
    fn test_no_target_uses_forward() {
        let tuning = AimTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let point = resolve_fire_target(&source(), None, &tuning, &OpenSky, None, &mut rng);
        let dir = point - source().origin;
        assert!(dir.angle_between(Vec3::NEG_Z) <= 10.0f32.to_radians() + 1e-3);
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let tuning = AimTuning::default();
        let target = Some(Vec3::new(5.0, 1.0, -30.0));

        let mut rng_a = ChaCha8Rng::seed_from_u64(99);
        let mut rng_b = ChaCha8Rng::seed_from_u64(99);

        let a = resolve_fire_target(&source(), target, &tuning, &OpenSky, None, &mut rng_a);
        let b = resolve_fire_target(&source(), target, &tuning, &OpenSky, None, &mut rng_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_obstruction_stops_trace() {
        let mut field = ObstacleField::default();
        field.add_box(Vec3::new(0.0, 1.6, -10.0), Vec3::new(5.0, 5.0, 0.5));
        let tracer = ArenaTracer::new(&field);

        let tuning = AimTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let point = resolve_fire_target(
            &source(),
            Some(Vec3::new(0.0, 1.6, -30.0)),
            &tuning,
            &tracer,
            None,
            &mut rng,
        );
        assert!((point.z + 9.5).abs() < 1e-3, "stopped at {point}");
    }

    #[test]
    fn test_pilot_trace_straight_ahead() {
        let point = resolve_pilot_target(&source(), 100.0, &OpenSky, None);
        assert!((point - Vec3::new(0.0, 1.6, -100.0)).length() < 1e-4);
    }
}
