//! JSON configuration. Every field is optional and falls back to the
//! built-in cinematic.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSettings, VoiceSettings};
use crate::camera::{Camera, DEFAULT_FOV_DEG, DEFAULT_POSITION};
use crate::error::{CinematicError, Result};
use crate::renderer::RenderSettings;
use crate::scenes::DEFAULT_CONTACT;
use crate::timeline::{Timeline, FADE_OUT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION.to_array(),
            target: [0.0; 3],
            fov_y_deg: DEFAULT_FOV_DEG,
        }
    }
}

impl CameraConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(
            Vec3::from_array(self.position),
            Vec3::from_array(self.target),
            self.fov_y_deg,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timeline: Timeline,
    pub camera: CameraConfig,
    pub render: RenderSettings,
    pub audio: AudioSettings,
    pub voice: VoiceSettings,
    /// Target of the "Contact Us" and "Get a Quote" links
    pub contact: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeline: Timeline::default(),
            camera: CameraConfig::default(),
            render: RenderSettings::default(),
            audio: AudioSettings::default(),
            voice: VoiceSettings::default(),
            contact: DEFAULT_CONTACT.to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Built-in defaults when `path` is `None`
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.timeline;
        if t.scene_one_end_ms < FADE_OUT_MS {
            return Err(CinematicError::Config(format!(
                "timeline.scene_one_end_ms must be at least {FADE_OUT_MS}"
            )));
        }
        if t.total_duration_ms < t.scene_one_end_ms {
            return Err(CinematicError::Config(
                "timeline.total_duration_ms must not be before scene_one_end_ms".into(),
            ));
        }
        if !(self.render.render_scale > 0.0 && self.render.render_scale <= 1.0) {
            return Err(CinematicError::Config("render.render_scale must be in (0, 1]".into()));
        }
        if !(self.camera.fov_y_deg > 0.0 && self.camera.fov_y_deg < 180.0) {
            return Err(CinematicError::Config("camera.fov_y_deg must be in (0, 180)".into()));
        }
        if self.audio.sample_rate == 0 {
            return Err(CinematicError::Config("audio.sample_rate must be positive".into()));
        }
        if self.voice.rate <= 0.0 {
            return Err(CinematicError::Config("voice.rate must be positive".into()));
        }
        Ok(())
    }
}
