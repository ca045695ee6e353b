use cinematic::math::AABB;
use glam::{Affine3A, Vec3};

#[cfg(test)]
mod aabb_tests {
    use super::*;

    #[test]
    fn test_aabb_union_creates_bounding_box() {
        let aabb1 = AABB::new(Vec3::ZERO, Vec3::splat(10.0));
        let aabb2 = AABB::new(Vec3::splat(5.0), Vec3::splat(15.0));

        let union = aabb1.union(&aabb2);

        assert_eq!(union.min, Vec3::ZERO);
        assert_eq!(union.max, Vec3::splat(15.0));
    }

    #[test]
    fn test_aabb_union_with_contained_box() {
        let aabb1 = AABB::new(Vec3::ZERO, Vec3::splat(10.0));
        let aabb2 = AABB::new(Vec3::splat(2.0), Vec3::splat(8.0));

        assert_eq!(aabb1.union(&aabb2), aabb1);
    }

    #[test]
    fn test_centered_box() {
        let aabb = AABB::centered(Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert!((aabb.bounding_radius() - Vec3::new(1.0, 2.0, 3.0).length()).abs() < 1e-6);
    }

    #[test]
    fn test_translated_bounds() {
        let aabb = AABB::centered(Vec3::splat(2.0));
        let moved = aabb.transformed(&Affine3A::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(moved.min, Vec3::new(2.0, -1.0, -1.0));
        assert_eq!(moved.max, Vec3::new(4.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotated_bounds_grow() {
        let aabb = AABB::centered(Vec3::new(2.0, 2.0, 0.0));
        let rotated = aabb.transformed(&Affine3A::from_rotation_z(std::f32::consts::FRAC_PI_4));
        let diagonal = 2.0_f32.sqrt();
        assert!((rotated.max.x - diagonal).abs() < 1e-5);
        assert!((rotated.max.y - diagonal).abs() < 1e-5);
    }
}
