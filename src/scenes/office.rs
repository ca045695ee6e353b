use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Affine3A, Vec3};
use rand::Rng;

use crate::math::rgb_hex;
use crate::scene::{FrameDescription, Light, Material, Mesh, Overlay, OverlayContent, Shape};
use crate::texture::{generate_dashboard, Texture, DASHBOARD_HEIGHT, DASHBOARD_WIDTH};
use crate::traits::SceneProvider;

pub const OFFICE_LABEL: &str = "Excel Dashboards • Data Entry • Validation • Import";

const ROWS: usize = 3;
const COLS: usize = 3;
const DESK_SPACING_X: f32 = 8.0;
const DESK_SPACING_Z: f32 = 6.0;

/// Office floor with a 3x3 grid of desks, each with a monitor showing a
/// dashboard and a person typing. The whole rig drifts slowly.
pub struct OfficeScene {
    dashboards: [Arc<Texture>; 3],
}

impl OfficeScene {
    pub fn new() -> Self {
        Self::with_rng(&mut rand::rng())
    }

    /// Build with a caller-provided random source for the dashboards
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let dashboards = std::array::from_fn(|_| {
            Arc::new(generate_dashboard(DASHBOARD_WIDTH, DASHBOARD_HEIGHT, rng))
        });
        log::debug!("generated {} dashboard textures", 3);
        Self { dashboards }
    }

    pub fn dashboards(&self) -> &[Arc<Texture>; 3] {
        &self.dashboards
    }

    /// Position and yaw of the whole office rig at `t` seconds
    pub fn rig_motion(t: f32) -> (Vec3, f32) {
        let offset = Vec3::new((t * 0.25).sin() * 2.2, 0.0, (t * 0.2).cos() * 1.2);
        let yaw = (t * 0.15).sin() * 0.15;
        (offset, yaw)
    }

    /// Vertical offsets of the right and left hands of the person at a desk
    pub fn hand_heights(elapsed_ms: f64, row: usize, col: usize) -> (f32, f32) {
        let phase = (row + col) as f64;
        let right = 0.45 + (elapsed_ms / 200.0 + phase).sin() * 0.05;
        let left = 0.45 + (elapsed_ms / 210.0 + phase).cos() * 0.05;
        (right as f32, left as f32)
    }

    fn desk(&self, elapsed_ms: f64, row: usize, col: usize) -> Vec<Mesh> {
        let skin = Material::standard(rgb_hex("#b9d6ff"));
        let monitor = Affine3A::from_translation(Vec3::new(0.0, 1.5, -0.9));
        let person = Affine3A::from_translation(Vec3::new(0.0, 0.95, 0.2));
        let (right_y, left_y) = Self::hand_heights(elapsed_ms, row, col);

        let place = |parent: Affine3A, mesh: Mesh| Mesh {
            transform: parent * mesh.transform,
            ..mesh
        };

        vec![
            Mesh::new(
                Shape::Box { size: Vec3::new(5.5, 0.2, 2.4) },
                Material::standard(rgb_hex("#192334")).with_surface(0.1, 0.8),
            )
            .at(Vec3::new(0.0, 0.4, 0.0))
            .casting_shadow(),
            place(
                monitor,
                Mesh::new(
                    Shape::Box { size: Vec3::new(2.8, 1.7, 0.06) },
                    Material::standard(rgb_hex("#0b1220")),
                ),
            ),
            place(
                monitor,
                Mesh::new(
                    Shape::Plane { width: 2.6, height: 1.5 },
                    Material::unlit_map(self.dashboards[(row * 3 + col) % self.dashboards.len()].clone()),
                )
                .at(Vec3::new(0.0, 0.0, 0.04)),
            ),
            place(
                person,
                Mesh::new(Shape::Sphere { radius: 0.28 }, skin.clone())
                    .at(Vec3::new(0.0, 0.8, 0.0))
                    .casting_shadow(),
            ),
            place(
                person,
                Mesh::new(
                    Shape::Cylinder { radius_top: 0.22, radius_bottom: 0.25, height: 0.6 },
                    Material::standard(rgb_hex("#6aa9ff")),
                )
                .at(Vec3::new(0.0, 0.35, 0.0))
                .casting_shadow(),
            ),
            place(
                person,
                Mesh::new(Shape::Box { size: Vec3::new(0.12, 0.12, 0.4) }, skin.clone())
                    .at(Vec3::new(0.35, right_y, 0.1))
                    .casting_shadow(),
            ),
            place(
                person,
                Mesh::new(Shape::Box { size: Vec3::new(0.12, 0.12, 0.4) }, skin)
                    .at(Vec3::new(-0.35, left_y, 0.1))
                    .casting_shadow(),
            ),
        ]
    }
}

impl Default for OfficeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneProvider for OfficeScene {
    fn describe(&self, elapsed_ms: f64, weight: f32) -> FrameDescription {
        let t = (elapsed_ms / 1000.0) as f32;
        let (offset, yaw) = Self::rig_motion(t);
        let rig = Affine3A::from_translation(offset) * Affine3A::from_rotation_y(yaw);

        let mut frame = FrameDescription::new();

        let floor = Mesh::new(
            Shape::Plane { width: 40.0, height: 24.0 },
            Material::standard(rgb_hex("#0f1722")).with_surface(0.0, 1.0),
        )
        .rotated(-FRAC_PI_2, 0.0, 0.0)
        .at(Vec3::new(0.0, -0.01, 0.0));
        frame.group(rig, [floor]);

        for row in 0..ROWS {
            for col in 0..COLS {
                let desk = Affine3A::from_translation(Vec3::new(
                    -DESK_SPACING_X + col as f32 * DESK_SPACING_X,
                    0.0,
                    -DESK_SPACING_Z + row as f32 * DESK_SPACING_Z,
                ));
                frame.group(rig * desk, self.desk(elapsed_ms, row, col));
            }
        }

        // Lights ride along with the rig
        frame
            .light(Light::Ambient { intensity: 0.3 * weight })
            .light(Light::Directional {
                position: rig.transform_point3(Vec3::new(6.0, 10.0, 6.0)),
                intensity: 0.9 * weight,
                cast_shadow: true,
            })
            .light(Light::Spot {
                position: rig.transform_point3(Vec3::new(-8.0, 12.0, -6.0)),
                angle: 0.5,
                penumbra: 0.5,
                intensity: 0.5 * weight,
            });

        frame.overlay(Overlay {
            anchor: Vec3::new(0.0, 5.0, 0.0),
            opacity: 0.9 * weight,
            content: OverlayContent::Label(OFFICE_LABEL.to_string()),
        });

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> OfficeScene {
        OfficeScene::with_rng(&mut StdRng::seed_from_u64(42))
    }

    #[test]
    fn mesh_and_light_counts() {
        let frame = scene().describe(0.0, 1.0);
        // floor + 9 desks * (desk, monitor, screen, head, torso, two hands)
        assert_eq!(frame.meshes.len(), 1 + 9 * 7);
        assert_eq!(frame.lights.len(), 3);
        assert_eq!(frame.overlays.len(), 1);
    }

    #[test]
    fn weight_scales_lights_and_overlay() {
        let frame = scene().describe(1000.0, 0.5);
        let intensities: Vec<f32> = frame.lights.iter().map(|l| l.intensity()).collect();
        assert_eq!(intensities, vec![0.15, 0.45, 0.25]);
        assert!((frame.overlays[0].opacity - 0.45).abs() < 1e-6);
    }

    #[test]
    fn rig_motion_at_start() {
        let (offset, yaw) = OfficeScene::rig_motion(0.0);
        assert!(offset.x.abs() < 1e-6);
        assert!((offset.z - 1.2).abs() < 1e-6);
        assert!(yaw.abs() < 1e-6);
    }

    #[test]
    fn motion_is_a_function_of_time() {
        let scene = scene();
        let a = scene.describe(5000.0, 1.0);
        let b = scene.describe(5000.0, 1.0);
        for (ma, mb) in a.meshes.iter().zip(&b.meshes) {
            assert_eq!(ma.transform, mb.transform);
        }
    }

    #[test]
    fn screens_share_three_dashboards() {
        let scene = scene();
        let frame = scene.describe(0.0, 1.0);
        let screens: Vec<&Arc<Texture>> = frame
            .meshes
            .iter()
            .filter_map(|m| m.material.map.as_ref())
            .collect();
        assert_eq!(screens.len(), 9);
        // Desk (r, c) uses dashboard (3r + c) % 3, so each row cycles 0, 1, 2
        for (i, map) in screens.iter().enumerate() {
            assert!(Arc::ptr_eq(map, &scene.dashboards()[i % 3]));
        }
    }

    #[test]
    fn hands_bob_within_range() {
        for ms in [0.0, 123.0, 4567.0, 17999.0] {
            let (right, left) = OfficeScene::hand_heights(ms, 1, 2);
            assert!((0.4..=0.5).contains(&right));
            assert!((0.4..=0.5).contains(&left));
        }
    }
}
