use glam::{Affine3A, Vec3};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin with the given full extents
    pub fn centered(size: Vec3) -> Self {
        Self::new(-size * 0.5, size * 0.5)
    }

    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the sphere around `center` that encloses the box
    pub fn bounding_radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }

    /// Bounds of this box after an affine transform
    pub fn transformed(&self, transform: &Affine3A) -> AABB {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let first = transform.transform_point3(corners[0]);
        corners[1..].iter().fold(AABB::new(first, first), |acc, &c| {
            let p = transform.transform_point3(c);
            AABB::new(acc.min.min(p), acc.max.max(p))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_center() {
        let aabb = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_aabb_centered() {
        let aabb = AABB::centered(Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.center(), Vec3::ZERO);
    }

    #[test]
    fn test_aabb_union_non_overlapping() {
        let aabb1 = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let aabb2 = AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        let union = aabb1.union(&aabb2);
        assert_eq!(union.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(union.max, Vec3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_aabb_transformed_translation() {
        let aabb = AABB::centered(Vec3::ONE);
        let moved = aabb.transformed(&Affine3A::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.center(), Vec3::new(5.0, 0.0, 0.0));
        assert!((moved.max.x - 5.5).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_transformed_rotation_grows() {
        let aabb = AABB::centered(Vec3::new(2.0, 1.0, 2.0));
        let rotated = aabb.transformed(&Affine3A::from_rotation_y(std::f32::consts::FRAC_PI_4));
        assert!(rotated.max.x > 1.0);
        assert!((rotated.max.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_radius() {
        let aabb = AABB::centered(Vec3::new(2.0, 2.0, 1.0));
        assert!((aabb.bounding_radius() - 1.5).abs() < 1e-6);
    }
}
