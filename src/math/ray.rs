use glam::Vec3;

/// Hits closer than this are treated as self-intersection
const T_MIN: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Slab test. Returns the entry distance, or the exit distance when the ray
/// starts inside the box.
pub fn intersect_aabb(ray: &Ray, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-8;

    // Clamp near-zero components so the inverse stays finite
    let inv = |d: f32| {
        if d.abs() < EPSILON {
            1.0 / EPSILON.copysign(d)
        } else {
            1.0 / d
        }
    };
    let inv_dir = Vec3::new(inv(ray.direction.x), inv(ray.direction.y), inv(ray.direction.z));

    let t_min = (box_min - ray.origin) * inv_dir;
    let t_max = (box_max - ray.origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.max_element();
    let t_far = t2.min_element();

    if t_near > t_far || t_far < 0.0 {
        return None;
    }

    if t_near < T_MIN {
        (t_far > T_MIN).then_some(t_far)
    } else {
        Some(t_near)
    }
}

/// Sphere centered at `center`. Direction need not be normalized.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.length_squared();
    let half_b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = (-half_b - sqrt_d) / a;
    if near > T_MIN {
        return Some(near);
    }
    let far = (-half_b + sqrt_d) / a;
    (far > T_MIN).then_some(far)
}

/// Quad spanning [-0.5, 0.5] on x and y in the z = 0 plane, facing +z.
/// Hits from behind are ignored, matching single-sided plane geometry.
pub fn intersect_unit_quad(ray: &Ray) -> Option<f32> {
    if ray.direction.z >= -1e-8 {
        return None;
    }
    let t = -ray.origin.z / ray.direction.z;
    if t <= T_MIN {
        return None;
    }
    let p = ray.at(t);
    (p.x.abs() <= 0.5 && p.y.abs() <= 0.5).then_some(t)
}

/// Capped cone frustum around the y axis, y in [-height/2, height/2], with
/// `radius_bottom` at the bottom cap and `radius_top` at the top cap.
/// Equal radii give a plain cylinder.
pub fn intersect_capped_frustum(ray: &Ray, radius_bottom: f32, radius_top: f32, height: f32) -> Option<f32> {
    let half_h = height * 0.5;
    let mut best: Option<f32> = None;
    let mut consider = |t: f32| {
        if t > T_MIN && best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };

    // Side wall: x^2 + z^2 = (r0 + k*y)^2
    let slope = frustum_slope(radius_bottom, radius_top, height);
    let r0 = (radius_bottom + radius_top) * 0.5;
    let (o, d) = (ray.origin, ray.direction);
    let r_origin = r0 + slope * o.y;
    let a = d.x * d.x + d.z * d.z - slope * slope * d.y * d.y;
    let half_b = o.x * d.x + o.z * d.z - slope * d.y * r_origin;
    let c = o.x * o.x + o.z * o.z - r_origin * r_origin;

    let mut side = |t: f32| {
        if ray.at(t).y.abs() <= half_h {
            consider(t);
        }
    };
    if a.abs() > 1e-12 {
        let discriminant = half_b * half_b - a * c;
        if discriminant >= 0.0 {
            let sqrt_d = discriminant.sqrt();
            side((-half_b - sqrt_d) / a);
            side((-half_b + sqrt_d) / a);
        }
    } else if half_b.abs() > 1e-12 {
        side(-c / (2.0 * half_b));
    }

    // Caps
    if d.y.abs() > 1e-8 {
        for (cap_y, radius) in [(-half_h, radius_bottom), (half_h, radius_top)] {
            let t = (cap_y - o.y) / d.y;
            let p = ray.at(t);
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(t);
            }
        }
    }

    best
}

/// Radius change per unit of height
pub fn frustum_slope(radius_bottom: f32, radius_top: f32, height: f32) -> f32 {
    if height > 0.0 {
        (radius_top - radius_bottom) / height
    } else {
        0.0
    }
}
