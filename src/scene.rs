//! Declarative per-frame scene description.
//!
//! Scenes do not keep any motion state: each frame they build a fresh
//! `FrameDescription` from elapsed time and blend weight, and the renderer
//! and overlay UI consume it.

use std::sync::Arc;

use glam::{Affine3A, Quat, Vec3};

use crate::math::AABB;
use crate::texture::Texture;

/// Primitive geometry in local space, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box { size: Vec3 },
    /// Lies in the local XY plane facing +Z
    Plane { width: f32, height: f32 },
    Sphere { radius: f32 },
    /// Axis along local Y
    Cylinder { radius_top: f32, radius_bottom: f32, height: f32 },
}

impl Shape {
    /// Local-space bounds
    pub fn bounds(&self) -> AABB {
        match *self {
            Shape::Box { size } => AABB::centered(size),
            Shape::Plane { width, height } => AABB::centered(Vec3::new(width, height, 0.0)),
            Shape::Sphere { radius } => AABB::centered(Vec3::splat(radius * 2.0)),
            Shape::Cylinder { radius_top, radius_bottom, height } => {
                let r = radius_top.max(radius_bottom);
                AABB::centered(Vec3::new(r * 2.0, height, r * 2.0))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub map: Option<Arc<Texture>>,
    /// Unlit materials ignore scene lights and show their color or map as-is
    pub lit: bool,
}

impl Material {
    /// Lit material with default surface response
    pub fn standard(color: [f32; 3]) -> Self {
        Self {
            color,
            metalness: 0.0,
            roughness: 1.0,
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            map: None,
            lit: true,
        }
    }

    pub fn unlit_map(map: Arc<Texture>) -> Self {
        Self {
            color: [1.0; 3],
            map: Some(map),
            lit: false,
            ..Self::standard([1.0; 3])
        }
    }

    pub fn with_surface(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness;
        self.roughness = roughness;
        self
    }

    pub fn with_emissive(mut self, emissive: [f32; 3], intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub shape: Shape,
    pub transform: Affine3A,
    pub material: Material,
    pub cast_shadow: bool,
}

impl Mesh {
    pub fn new(shape: Shape, material: Material) -> Self {
        Self {
            shape,
            transform: Affine3A::IDENTITY,
            material,
            cast_shadow: false,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.transform = Affine3A::from_translation(position) * self.transform;
        self
    }

    /// Euler rotation applied in XYZ order, as three.js does
    pub fn rotated(mut self, x: f32, y: f32, z: f32) -> Self {
        let rotation = Quat::from_euler(glam::EulerRot::XYZ, x, y, z);
        self.transform = self.transform * Affine3A::from_quat(rotation);
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// World-space bounds
    pub fn bounds(&self) -> AABB {
        self.shape.bounds().transformed(&self.transform)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient { intensity: f32 },
    Directional { position: Vec3, intensity: f32, cast_shadow: bool },
    /// Cone pointing at the origin; `angle` is the half angle in radians
    Spot { position: Vec3, angle: f32, penumbra: f32, intensity: f32 },
}

impl Light {
    pub fn intensity(&self) -> f32 {
        match *self {
            Light::Ambient { intensity }
            | Light::Directional { intensity, .. }
            | Light::Spot { intensity, .. } => intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayContent {
    Label(String),
    Card {
        title: String,
        subtitle: String,
        tiles: Vec<(String, String)>,
    },
    Link { text: String, href: String },
}

/// Screen-space UI anchored to a point in the 3D scene
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub anchor: Vec3,
    pub opacity: f32,
    pub content: OverlayContent,
}

#[derive(Debug, Clone, Default)]
pub struct FrameDescription {
    pub meshes: Vec<Mesh>,
    pub lights: Vec<Light>,
    pub overlays: Vec<Overlay>,
}

impl FrameDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&mut self, mesh: Mesh) -> &mut Self {
        self.meshes.push(mesh);
        self
    }

    pub fn light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    pub fn overlay(&mut self, overlay: Overlay) -> &mut Self {
        self.overlays.push(overlay);
        self
    }

    /// Add a group of meshes under a parent transform
    pub fn group(&mut self, parent: Affine3A, meshes: impl IntoIterator<Item = Mesh>) -> &mut Self {
        self.meshes.extend(meshes.into_iter().map(|mut mesh| {
            mesh.transform = parent * mesh.transform;
            mesh
        }));
        self
    }

    /// Merge another frame into this one; both render into the same canvas
    pub fn merge(&mut self, other: FrameDescription) -> &mut Self {
        self.meshes.extend(other.meshes);
        self.lights.extend(other.lights);
        self.overlays.extend(other.overlays);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_at_then_rotated_keeps_position() {
        let mesh = Mesh::new(Shape::Box { size: Vec3::ONE }, Material::standard([1.0; 3]))
            .at(Vec3::new(1.0, 2.0, 3.0))
            .rotated(0.0, 1.0, 0.0);
        assert!((mesh.transform.translation - glam::Vec3A::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn group_applies_parent_transform() {
        let mut frame = FrameDescription::new();
        let child = Mesh::new(Shape::Sphere { radius: 1.0 }, Material::standard([1.0; 3]))
            .at(Vec3::new(0.0, 1.0, 0.0));
        frame.group(Affine3A::from_translation(Vec3::new(5.0, 0.0, 0.0)), [child]);

        let center = frame.meshes[0].bounds().center();
        assert!((center - Vec3::new(5.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn merge_concatenates() {
        let mut a = FrameDescription::new();
        a.light(Light::Ambient { intensity: 0.3 });
        let mut b = FrameDescription::new();
        b.light(Light::Ambient { intensity: 0.5 });
        b.overlay(Overlay {
            anchor: Vec3::ZERO,
            opacity: 1.0,
            content: OverlayContent::Label("x".into()),
        });

        a.merge(b);
        assert_eq!(a.lights.len(), 2);
        assert_eq!(a.overlays.len(), 1);
    }

    #[test]
    fn cylinder_bounds_use_wider_radius() {
        let shape = Shape::Cylinder { radius_top: 0.22, radius_bottom: 0.25, height: 0.6 };
        let bounds = shape.bounds();
        assert!((bounds.max.x - 0.25).abs() < 1e-6);
        assert!((bounds.max.y - 0.3).abs() < 1e-6);
    }
}
