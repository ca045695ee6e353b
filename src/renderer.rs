//! CPU ray caster for frame descriptions.
//!
//! One primary ray per pixel, direct lighting only, with an optional shadow
//! ray for shadow-casting directional lights. Rows are split into bands and
//! rendered on scoped threads.

use glam::{Affine3A, Mat3A, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraBasis};
use crate::core::canvas::rgba_len;
use crate::math::{
    frustum_slope, intersect_aabb, intersect_capped_frustum, intersect_sphere, intersect_unit_quad, rgb_hex, Ray,
};
use crate::scene::{FrameDescription, Light, Material, Mesh, Shape};

pub const BACKGROUND: &str = "#0b0f14";

/// Offset applied to shadow ray origins along the surface normal
const SHADOW_BIAS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Trace shadow rays for shadow-casting lights
    pub shadows: bool,
    /// Uniform image-based fill light added to every lit surface
    pub environment: f32,
    /// Internal resolution relative to the window, in (0, 1]
    pub render_scale: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            shadows: true,
            environment: 0.35,
            render_scale: 0.5,
        }
    }
}

/// Mesh prepared for intersection: cached inverse transform and bounds
struct PreparedMesh<'a> {
    mesh: &'a Mesh,
    inverse: Affine3A,
    normal_matrix: Mat3A,
    center: Vec3,
    radius: f32,
}

impl<'a> PreparedMesh<'a> {
    fn new(mesh: &'a Mesh) -> Self {
        let inverse = mesh.transform.inverse();
        let bounds = mesh.bounds();
        Self {
            mesh,
            inverse,
            normal_matrix: inverse.matrix3.transpose(),
            center: bounds.center(),
            radius: bounds.bounding_radius(),
        }
    }

    /// Nearest hit along the ray, with the local-space hit point
    fn intersect(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        intersect_sphere(ray, self.center, self.radius)?;

        let local = Ray::new(
            self.inverse.transform_point3(ray.origin),
            self.inverse.transform_vector3(ray.direction),
        );
        let t = match self.mesh.shape {
            Shape::Box { size } => intersect_aabb(&local, -size * 0.5, size * 0.5)?,
            Shape::Plane { width, height } => {
                let scale = Vec3::new(1.0 / width, 1.0 / height, 1.0);
                intersect_unit_quad(&Ray::new(local.origin * scale, local.direction * scale))?
            }
            Shape::Sphere { radius } => intersect_sphere(&local, Vec3::ZERO, radius)?,
            Shape::Cylinder { radius_top, radius_bottom, height } => {
                intersect_capped_frustum(&local, radius_bottom, radius_top, height)?
            }
        };
        Some((t, local.at(t)))
    }

    /// Local-space normal and texture coordinate at a local hit point
    fn surface(&self, p: Vec3) -> (Vec3, [f32; 2]) {
        match self.mesh.shape {
            Shape::Box { size } => {
                let q = p / (size * 0.5);
                let a = q.abs();
                let n = if a.x >= a.y && a.x >= a.z {
                    Vec3::new(q.x.signum(), 0.0, 0.0)
                } else if a.y >= a.z {
                    Vec3::new(0.0, q.y.signum(), 0.0)
                } else {
                    Vec3::new(0.0, 0.0, q.z.signum())
                };
                (n, [0.0, 0.0])
            }
            Shape::Plane { width, height } => (Vec3::Z, [p.x / width + 0.5, p.y / height + 0.5]),
            Shape::Sphere { .. } => (p, [0.0, 0.0]),
            Shape::Cylinder { radius_top, radius_bottom, height } => {
                let cap = height * 0.5 - 1e-4;
                let n = if p.y >= cap {
                    Vec3::Y
                } else if p.y <= -cap {
                    Vec3::NEG_Y
                } else {
                    // Gradient of x^2 + z^2 - r(y)^2
                    let slope = frustum_slope(radius_bottom, radius_top, height);
                    let r = (radius_bottom + radius_top) * 0.5 + slope * p.y;
                    Vec3::new(p.x, -slope * r, p.z)
                };
                (n, [0.0, 0.0])
            }
        }
    }

    fn world_normal(&self, local: Vec3) -> Vec3 {
        Vec3::from(self.normal_matrix * glam::Vec3A::from(local)).normalize_or(Vec3::Y)
    }
}

/// Ray caster holding per-run settings
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    settings: RenderSettings,
    background: [f32; 3],
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            background: rgb_hex(BACKGROUND),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Internal render size for a window of the given size
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.settings.render_scale.clamp(0.05, 1.0);
        (
            ((width as f32 * scale).round() as u32).max(1),
            ((height as f32 * scale).round() as u32).max(1),
        )
    }

    /// Render into a new RGBA8 buffer
    pub fn render(&self, frame: &FrameDescription, camera: &Camera, width: u32, height: u32) -> Vec<u8> {
        let mut pixels = vec![0u8; rgba_len(width, height).unwrap_or(0)];
        self.render_into(frame, camera, width, height, &mut pixels);
        pixels
    }

    /// Render into an existing RGBA8 buffer of `width * height * 4` bytes
    pub fn render_into(
        &self,
        frame: &FrameDescription,
        camera: &Camera,
        width: u32,
        height: u32,
        pixels: &mut [u8],
    ) {
        if width == 0 || height == 0 {
            return;
        }
        if rgba_len(width, height) != Some(pixels.len()) {
            log::warn!("pixel buffer of {} bytes does not fit {}x{}", pixels.len(), width, height);
            return;
        }
        let meshes: Vec<PreparedMesh> = frame.meshes.iter().map(PreparedMesh::new).collect();
        let basis = camera.basis(width, height);
        let row_bytes = width as usize * 4;

        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let rows_per_band = (height as usize).div_ceil(threads).max(1);

        std::thread::scope(|scope| {
            for (band, chunk) in pixels.chunks_mut(rows_per_band * row_bytes).enumerate() {
                let meshes = &meshes;
                let lights = &frame.lights;
                scope.spawn(move || {
                    let first_row = band * rows_per_band;
                    for (i, row) in chunk.chunks_exact_mut(row_bytes).enumerate() {
                        self.render_row(meshes, lights, &basis, (first_row + i) as u32, width, row);
                    }
                });
            }
        });
    }

    fn render_row(
        &self,
        meshes: &[PreparedMesh],
        lights: &[Light],
        basis: &CameraBasis,
        y: u32,
        width: u32,
        row: &mut [u8],
    ) {
        for x in 0..width {
            let ray = basis.ray(x, y);
            let color = self.trace(meshes, lights, &ray);
            let idx = x as usize * 4;
            for c in 0..3 {
                row[idx + c] = (color[c].clamp(0.0, 1.0) * 255.0).round() as u8;
            }
            row[idx + 3] = 255;
        }
    }

    fn trace(&self, meshes: &[PreparedMesh], lights: &[Light], ray: &Ray) -> [f32; 3] {
        let hit = meshes
            .iter()
            .filter_map(|m| m.intersect(ray).map(|(t, local)| (t, local, m)))
            .min_by(|a, b| a.0.total_cmp(&b.0));

        let Some((t, local, mesh)) = hit else {
            return self.background;
        };

        let (local_normal, uv) = mesh.surface(local);
        let mut normal = mesh.world_normal(local_normal);
        if normal.dot(ray.direction) > 0.0 {
            normal = -normal;
        }
        let point = ray.at(t);
        self.shade(meshes, lights, &mesh.mesh.material, point, normal, -ray.direction, uv)
    }

    #[allow(clippy::too_many_arguments)]
    fn shade(
        &self,
        meshes: &[PreparedMesh],
        lights: &[Light],
        material: &Material,
        point: Vec3,
        normal: Vec3,
        view: Vec3,
        uv: [f32; 2],
    ) -> [f32; 3] {
        let base = match &material.map {
            Some(map) => {
                let s = map.sample(uv[0], uv[1]);
                Vec3::from(s) * Vec3::from(material.color)
            }
            None => Vec3::from(material.color),
        };

        if !material.lit {
            return base.to_array();
        }

        let shininess = 2.0 + (1.0 - material.roughness).powi(2) * 126.0;
        let specular_strength = (1.0 - material.roughness) * (0.04 + 0.96 * material.metalness);
        let diffuse_color = base * (1.0 - material.metalness * 0.9);

        let mut diffuse = Vec3::splat(self.settings.environment);
        let mut specular = Vec3::ZERO;

        for light in lights {
            let (to_light, intensity) = match *light {
                Light::Ambient { intensity } => {
                    diffuse += Vec3::splat(intensity);
                    continue;
                }
                Light::Directional { position, intensity, cast_shadow } => {
                    let dir = position.normalize_or(Vec3::Y);
                    if cast_shadow && self.settings.shadows && self.occluded(meshes, point, normal, dir) {
                        continue;
                    }
                    (dir, intensity)
                }
                Light::Spot { position, angle, penumbra, intensity } => {
                    let dir = (position - point).normalize_or(Vec3::Y);
                    let axis = (-position).normalize_or(Vec3::NEG_Y);
                    let cos_theta = (-dir).dot(axis);
                    let outer = angle.cos();
                    let inner = (angle * (1.0 - penumbra)).cos();
                    (dir, intensity * smoothstep(outer, inner, cos_theta))
                }
            };

            let n_dot_l = normal.dot(to_light).max(0.0);
            if n_dot_l <= 0.0 || intensity <= 0.0 {
                continue;
            }
            diffuse += Vec3::splat(intensity * n_dot_l);

            let half = (to_light + view).normalize_or(normal);
            specular += Vec3::splat(intensity * normal.dot(half).max(0.0).powf(shininess) * specular_strength);
        }

        let emissive = Vec3::from(material.emissive) * material.emissive_intensity;
        (diffuse_color * diffuse + specular + emissive).to_array()
    }

    fn occluded(&self, meshes: &[PreparedMesh], point: Vec3, normal: Vec3, dir: Vec3) -> bool {
        let ray = Ray::new(point + normal * SHADOW_BIAS, dir);
        meshes
            .iter()
            .filter(|m| m.mesh.cast_shadow)
            .any(|m| m.intersect(&ray).is_some())
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x >= edge1 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        Renderer::new(RenderSettings {
            shadows: true,
            environment: 0.0,
            render_scale: 1.0,
        })
    }

    #[test]
    fn empty_frame_is_background() {
        let pixels = renderer().render(&FrameDescription::new(), &Camera::default(), 8, 6);
        assert_eq!(&pixels[0..4], &[0x0b, 0x0f, 0x14, 255]);
        assert!(pixels.chunks_exact(4).all(|p| p == [0x0b, 0x0f, 0x14, 255]));
    }

    #[test]
    fn unlit_sphere_covers_center() {
        let mut frame = FrameDescription::new();
        let mut material = Material::standard([1.0, 0.0, 0.0]);
        material.lit = false;
        frame.mesh(Mesh::new(Shape::Sphere { radius: 1.0 }, material));

        let pixels = renderer().render(&frame, &Camera::default(), 33, 33);
        let center = ((16 * 33 + 16) * 4) as usize;
        assert_eq!(&pixels[center..center + 4], &[255, 0, 0, 255]);
        // Corner still shows the background
        assert_eq!(&pixels[0..4], &[0x0b, 0x0f, 0x14, 255]);
    }

    #[test]
    fn zero_weight_lights_leave_surfaces_dark() {
        let mut frame = FrameDescription::new();
        frame.mesh(Mesh::new(Shape::Box { size: Vec3::splat(2.0) }, Material::standard([1.0; 3])));
        frame.light(Light::Ambient { intensity: 0.0 });

        let pixels = renderer().render(&frame, &Camera::default(), 17, 17);
        let center = ((8 * 17 + 8) * 4) as usize;
        assert_eq!(&pixels[center..center + 3], &[0, 0, 0]);
    }

    #[test]
    fn directional_light_brightens_facing_side() {
        let mut frame = FrameDescription::new();
        frame.mesh(Mesh::new(Shape::Box { size: Vec3::splat(2.0) }, Material::standard([1.0; 3])));
        frame.light(Light::Directional {
            position: Vec3::new(8.0, 6.0, 12.0),
            intensity: 1.0,
            cast_shadow: false,
        });

        let pixels = renderer().render(&frame, &Camera::default(), 17, 17);
        let center = ((8 * 17 + 8) * 4) as usize;
        assert!(pixels[center] > 100);
    }

    #[test]
    fn shadow_blocks_directional_light() {
        let settings = RenderSettings { shadows: true, environment: 0.0, render_scale: 1.0 };
        let renderer = Renderer::new(settings);
        let floor = Mesh::new(Shape::Plane { width: 40.0, height: 40.0 }, Material::standard([1.0; 3]))
            .rotated(-std::f32::consts::FRAC_PI_2, 0.0, 0.0);
        let blocker = Mesh::new(Shape::Box { size: Vec3::new(4.0, 0.2, 4.0) }, Material::standard([1.0; 3]))
            .at(Vec3::new(0.0, 3.0, 0.0))
            .casting_shadow();

        let lights = [Light::Directional { position: Vec3::Y, intensity: 1.0, cast_shadow: true }];
        let meshes = [PreparedMesh::new(&floor), PreparedMesh::new(&blocker)];

        let lit = renderer.shade(&meshes, &lights, &floor.material, Vec3::new(10.0, 0.0, 0.0), Vec3::Y, Vec3::Y, [0.0; 2]);
        let shadowed = renderer.shade(&meshes, &lights, &floor.material, Vec3::ZERO, Vec3::Y, Vec3::Y, [0.0; 2]);
        assert!(lit[0] > 0.9);
        assert!(shadowed[0] < 1e-6);
    }

    #[test]
    fn tapered_cylinder_uses_both_radii() {
        let torso = Mesh::new(
            Shape::Cylinder { radius_top: 0.5, radius_bottom: 1.0, height: 2.0 },
            Material::standard([1.0; 3]),
        );
        let prepared = PreparedMesh::new(&torso);

        let (low, _) = prepared.intersect(&Ray::new(Vec3::new(-5.0, -0.5, 0.0), Vec3::X)).unwrap();
        let (high, hit) = prepared.intersect(&Ray::new(Vec3::new(-5.0, 0.5, 0.0), Vec3::X)).unwrap();
        assert!((low - 4.125).abs() < 1e-4);
        assert!((high - 4.375).abs() < 1e-4);

        // Wider at the bottom, so the side leans up
        let (normal, _) = prepared.surface(hit);
        assert!(normal.x < 0.0);
        assert!(normal.y > 0.0);
    }

    #[test]
    fn mismatched_buffer_is_left_untouched() {
        let mut pixels = vec![7u8; 10];
        renderer().render_into(&FrameDescription::new(), &Camera::default(), 4, 4, &mut pixels);
        assert!(pixels.iter().all(|&b| b == 7));
        assert!(renderer().render(&FrameDescription::new(), &Camera::default(), u32::MAX, u32::MAX).is_empty());
    }

    #[test]
    fn scaled_size_never_zero() {
        let renderer = Renderer::new(RenderSettings { render_scale: 0.5, ..Default::default() });
        assert_eq!(renderer.scaled_size(800, 600), (400, 300));
        assert_eq!(renderer.scaled_size(1, 1), (1, 1));
    }

    #[test]
    fn smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
