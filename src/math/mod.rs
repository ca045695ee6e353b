mod aabb;
mod color;
mod ray;

pub use aabb::AABB;
pub use color::{hsl_to_rgb, parse_hex, rgb_hex};
pub use ray::{frustum_slope, intersect_aabb, intersect_capped_frustum, intersect_sphere, intersect_unit_quad, Ray};
