use glam::{Quat, Vec2, Vec3};
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::math::Ray;

pub const CAMERA_SPEED: f32 = 0.1;
pub const CAMERA_ROTATION_SPEED: f32 = 0.02;

pub const DEFAULT_POSITION: Vec3 = Vec3::new(8.0, 6.0, 12.0);
pub const DEFAULT_FOV_DEG: f32 = 38.0;

/// Objects closer than this to the camera plane are not projected
const NEAR: f32 = 0.1;

#[derive(Default, Clone, Copy)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub rotate_left: bool,
    pub rotate_right: bool,
}

impl MovementState {
    const fn to_direction(&self, positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    const fn velocity(&self) -> (f32, f32, f32) {
        (
            self.to_direction(self.forward, self.backward),
            self.to_direction(self.right, self.left),
            self.to_direction(self.up, self.down),
        )
    }

    const fn rotation_velocity(&self) -> f32 {
        self.to_direction(self.rotate_right, self.rotate_left)
    }

    pub fn is_moving(&self) -> bool {
        self.velocity() != (0.0, 0.0, 0.0) || self.rotation_velocity() != 0.0
    }
}

/// Perspective camera looking at a fixed target
#[derive(Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
    pub movement: MovementState,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_POSITION, Vec3::ZERO, DEFAULT_FOV_DEG)
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, fov_y_deg: f32) -> Self {
        Self {
            position,
            target,
            fov_y_deg,
            movement: MovementState::default(),
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    fn tan_half_fov(&self) -> f32 {
        (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    /// Ray through the center of pixel (x, y) of a `width` x `height` image
    pub fn primary_ray(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let basis = self.basis(width, height);
        basis.ray(x, y)
    }

    /// Precomputed per-frame basis for casting many rays
    pub fn basis(&self, width: u32, height: u32) -> CameraBasis {
        let tan_half = self.tan_half_fov();
        let aspect = width as f32 / height.max(1) as f32;
        CameraBasis {
            origin: self.position,
            forward: self.forward(),
            right: self.right() * tan_half * aspect,
            up: self.up() * tan_half,
            inv_width: 1.0 / width.max(1) as f32,
            inv_height: 1.0 / height.max(1) as f32,
        }
    }

    /// Screen position in pixels of a world point, or `None` when it is
    /// behind the camera
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let d = point - self.position;
        let depth = d.dot(self.forward());
        if depth <= NEAR {
            return None;
        }
        let tan_half = self.tan_half_fov();
        let aspect = width / height.max(1.0);
        let ndc_x = d.dot(self.right()) / (depth * tan_half * aspect);
        let ndc_y = d.dot(self.up()) / (depth * tan_half);
        Some(Vec2::new(
            (ndc_x + 1.0) * 0.5 * width,
            (1.0 - ndc_y) * 0.5 * height,
        ))
    }

    /// Apply free-fly movement; used only in inspect mode
    pub fn update(&mut self) {
        let (fwd, right_dir, up_dir) = self.movement.velocity();

        let displacement = self.forward() * fwd * CAMERA_SPEED
            + self.right() * right_dir * CAMERA_SPEED
            + Vec3::Y * up_dir * CAMERA_SPEED;

        self.position += displacement;
        self.target += displacement;

        let turn = self.movement.rotation_velocity() * CAMERA_ROTATION_SPEED;
        if turn != 0.0 {
            let offset = self.position - self.target;
            self.position = self.target + Quat::from_rotation_y(turn) * offset;
        }
    }

    pub fn process_keyboard(&mut self, event: &KeyEvent) {
        let is_pressed = event.state.is_pressed();
        if let PhysicalKey::Code(keycode) = event.physical_key {
            match keycode {
                KeyCode::KeyW => self.movement.forward = is_pressed,
                KeyCode::KeyS => self.movement.backward = is_pressed,
                KeyCode::KeyA => self.movement.left = is_pressed,
                KeyCode::KeyD => self.movement.right = is_pressed,
                KeyCode::Space => self.movement.up = is_pressed,
                KeyCode::ShiftLeft => self.movement.down = is_pressed,
                KeyCode::KeyQ => self.movement.rotate_left = is_pressed,
                KeyCode::KeyE => self.movement.rotate_right = is_pressed,
                _ => {}
            }
        }
    }
}

/// Camera frame scaled for a particular image size
#[derive(Debug, Clone, Copy)]
pub struct CameraBasis {
    origin: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    inv_width: f32,
    inv_height: f32,
}

impl CameraBasis {
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let sx = 2.0 * (x as f32 + 0.5) * self.inv_width - 1.0;
        let sy = 1.0 - 2.0 * (y as f32 + 0.5) * self.inv_height;
        let direction = (self.forward + self.right * sx + self.up * sy).normalize();
        Ray::new(self.origin, direction)
    }
}
