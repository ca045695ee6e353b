use glam::{Affine3A, Vec3};

use crate::math::rgb_hex;
use crate::scene::{FrameDescription, Light, Material, Mesh, Overlay, OverlayContent, Shape};
use crate::traits::SceneProvider;

pub const DEFAULT_CONTACT: &str = "mailto:hello@excelservicehub.example";

const FLOATING_BOXES: usize = 16;
const BOX_COLORS: [&str; 3] = ["#22c55e", "#eab308", "#ef4444"];

/// Services offered, as (title, description)
pub const SERVICES: [(&str, &str); 3] = [
    ("Data Entry", "Fast and accurate input"),
    ("Data Validation", "Clean, consistent, trustworthy"),
    ("Bulk Import", "Google Sheets at scale"),
];

/// Glowing title card surrounded by floating boxes, with a call to action
pub struct ServicesScene {
    contact: String,
}

impl ServicesScene {
    pub fn new(contact: impl Into<String>) -> Self {
        Self { contact: contact.into() }
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    /// Transform of floating box `i` at `t` seconds
    pub fn box_transform(i: usize, t: f32) -> Affine3A {
        let fi = i as f32;
        let position = Vec3::new(
            (t * 0.5 + fi).sin() * (4.0 + (i % 4) as f32),
            0.6 + (i % 5) as f32 * 0.4,
            (t * 0.4 + fi).cos() * (4.5 + (i % 3) as f32),
        );
        let rotation = glam::Quat::from_euler(glam::EulerRot::XYZ, t * 0.2 + fi, t * 0.1 + fi, 0.0);
        Affine3A::from_rotation_translation(rotation, position)
    }

    pub fn box_size(i: usize) -> Vec3 {
        Vec3::new(
            0.35 + (i % 3) as f32 * 0.08,
            0.35 + ((i + 1) % 3) as f32 * 0.08,
            0.35,
        )
    }
}

impl Default for ServicesScene {
    fn default() -> Self {
        Self::new(DEFAULT_CONTACT)
    }
}

impl SceneProvider for ServicesScene {
    fn describe(&self, elapsed_ms: f64, weight: f32) -> FrameDescription {
        let t = (elapsed_ms / 1000.0) as f32;
        let mut frame = FrameDescription::new();

        frame
            .light(Light::Ambient { intensity: 0.5 * weight })
            .light(Light::Directional {
                position: Vec3::new(4.0, 8.0, 6.0),
                intensity: 0.9 * weight,
                cast_shadow: false,
            });

        frame.mesh(
            Mesh::new(
                Shape::Box { size: Vec3::new(7.5, 4.2, 0.2) },
                Material::standard(rgb_hex("#0e1726"))
                    .with_surface(0.2, 0.6)
                    .with_emissive(rgb_hex("#2dd4bf"), 0.12 * weight),
            )
            .rotated(0.0, (t * 0.3).sin() * 0.08, 0.0)
            .at(Vec3::new(0.0, 2.2, 0.0))
            .casting_shadow(),
        );

        frame.overlay(Overlay {
            anchor: Vec3::new(0.0, 2.2, 0.0),
            opacity: weight,
            content: OverlayContent::Card {
                title: "Excel Service Hub".to_string(),
                subtitle: "Your Data, Our Responsibility".to_string(),
                tiles: SERVICES
                    .iter()
                    .map(|(k, d)| (k.to_string(), d.to_string()))
                    .collect(),
            },
        });

        for i in 0..FLOATING_BOXES {
            let mut mesh = Mesh::new(
                Shape::Box { size: Self::box_size(i) },
                Material::standard(rgb_hex(BOX_COLORS[i % 3]))
                    .with_emissive(rgb_hex("#0a1626"), 0.06 * weight),
            )
            .casting_shadow();
            mesh.transform = Self::box_transform(i, t);
            frame.mesh(mesh);
        }

        frame.overlay(Overlay {
            anchor: Vec3::new(0.0, -2.8, 0.0),
            opacity: 0.95 * weight,
            content: OverlayContent::Link {
                text: "Get a Quote".to_string(),
                href: self.contact.clone(),
            },
        });

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition() {
        let frame = ServicesScene::default().describe(0.0, 1.0);
        assert_eq!(frame.meshes.len(), 1 + FLOATING_BOXES);
        assert_eq!(frame.lights.len(), 2);
        assert_eq!(frame.overlays.len(), 2);
    }

    #[test]
    fn card_glow_follows_weight() {
        let frame = ServicesScene::default().describe(0.0, 0.5);
        assert!((frame.meshes[0].material.emissive_intensity - 0.06).abs() < 1e-6);
        assert!((frame.overlays[0].opacity - 0.5).abs() < 1e-6);
    }

    #[test]
    fn box_layout_formulas() {
        let first = ServicesScene::box_transform(0, 0.0);
        assert!((first.translation.x).abs() < 1e-6);
        assert!((first.translation.y - 0.6).abs() < 1e-6);
        assert!((first.translation.z - 4.5).abs() < 1e-6);

        assert!(ServicesScene::box_size(0).abs_diff_eq(Vec3::new(0.35, 0.43, 0.35), 1e-6));
        assert!(ServicesScene::box_size(2).abs_diff_eq(Vec3::new(0.51, 0.35, 0.35), 1e-6));
    }

    #[test]
    fn call_to_action_uses_contact() {
        let frame = ServicesScene::new("mailto:sales@example.com").describe(20_000.0, 1.0);
        let link = frame.overlays.iter().find_map(|o| match &o.content {
            OverlayContent::Link { text, href } => Some((text.clone(), href.clone(), o.opacity)),
            _ => None,
        });
        let (text, href, opacity) = link.expect("link overlay");
        assert_eq!(text, "Get a Quote");
        assert_eq!(href, "mailto:sales@example.com");
        assert!((opacity - 0.95).abs() < 1e-6);
    }
}
