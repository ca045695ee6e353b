//! Scene blending over elapsed time.
//!
//! The cinematic has two scenes. The first fades out over a 2s window ending
//! at `scene_one_end_ms`; the second starts fading in 1s before that point
//! and reaches full weight 2.5s later, so the two windows overlap.

use serde::{Deserialize, Serialize};

pub const TOTAL_DURATION_MS: f64 = 34_000.0;
pub const SCENE_ONE_END_MS: f64 = 18_000.0;

/// Length of the scene one fade-out, ending at `scene_one_end_ms`
pub const FADE_OUT_MS: f64 = 2_000.0;
/// How far before `scene_one_end_ms` scene two starts fading in
pub const FADE_IN_LEAD_MS: f64 = 1_000.0;
/// Length of the scene two fade-in
pub const FADE_IN_MS: f64 = 2_500.0;

/// Weights of both scenes at one instant, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneWeights {
    pub office: f32,
    pub services: f32,
}

impl SceneWeights {
    pub fn office_visible(&self) -> bool {
        self.office > 0.0
    }

    pub fn services_visible(&self) -> bool {
        self.services > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeline {
    pub scene_one_end_ms: f64,
    pub total_duration_ms: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            scene_one_end_ms: SCENE_ONE_END_MS,
            total_duration_ms: TOTAL_DURATION_MS,
        }
    }
}

impl Timeline {
    pub fn new(scene_one_end_ms: f64, total_duration_ms: f64) -> Self {
        Self {
            scene_one_end_ms,
            total_duration_ms,
        }
    }

    /// Office scene weight: 1 until the fade-out window, then linear down to 0
    pub fn weight1(&self, t_ms: f64) -> f32 {
        let fade_out_start = self.scene_one_end_ms - FADE_OUT_MS;
        if t_ms <= fade_out_start {
            return 1.0;
        }
        if t_ms >= self.scene_one_end_ms {
            return 0.0;
        }
        (1.0 - (t_ms - fade_out_start) / FADE_OUT_MS) as f32
    }

    /// Services scene weight: 0 until the fade-in lead, then linear up to 1
    pub fn weight2(&self, t_ms: f64) -> f32 {
        let fade_in_start = self.scene_one_end_ms - FADE_IN_LEAD_MS;
        if t_ms <= fade_in_start {
            return 0.0;
        }
        ((t_ms - fade_in_start) / FADE_IN_MS).min(1.0) as f32
    }

    pub fn blend(&self, t_ms: f64) -> SceneWeights {
        SceneWeights {
            office: self.weight1(t_ms),
            services: self.weight2(t_ms),
        }
    }

    /// The frame loop stops rescheduling once this holds
    pub fn is_finished(&self, t_ms: f64) -> bool {
        t_ms >= self.total_duration_ms
    }
}
