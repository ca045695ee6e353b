//! Page state: the started flag, the frame loop and what is on screen.

use std::time::Instant;

use crate::audio::AudioController;
use crate::config::Config;
use crate::core::frame_loop::{FrameLoop, Tick};
use crate::scene::FrameDescription;
use crate::scenes::{OfficeScene, ServicesScene};
use crate::timeline::{SceneWeights, Timeline};
use crate::traits::SceneProvider;

/// One mount of the cinematic
///
/// Before `start` the first frame is shown, frozen. After it the frame loop
/// runs to the end of the timeline and stays on the last frame.
pub struct Cinematic {
    started: bool,
    frame_loop: FrameLoop,
    timeline: Timeline,
    office: OfficeScene,
    services: ServicesScene,
    audio: Option<AudioController>,
}

impl Cinematic {
    pub fn new(config: &Config) -> Self {
        let audio = AudioController::new(config.audio.clone(), config.voice.clone());
        Self::with_parts(
            config.timeline,
            OfficeScene::new(),
            ServicesScene::new(config.contact.clone()),
            Some(audio),
        )
    }

    /// Build from parts; `audio` may be `None` for silent runs
    pub fn with_parts(
        timeline: Timeline,
        office: OfficeScene,
        services: ServicesScene,
        audio: Option<AudioController>,
    ) -> Self {
        Self {
            started: false,
            frame_loop: FrameLoop::new(timeline.total_duration_ms),
            timeline,
            office,
            services,
            audio,
        }
    }

    /// Flip the started flag, start the frame loop and the audio.
    /// Returns false when already started.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.started {
            return false;
        }
        self.started = true;
        log::info!("cinematic started");

        self.frame_loop.start(now);
        if let Some(audio) = &mut self.audio {
            audio.start();
        }
        true
    }

    /// Advance to `now`. `reschedule` says whether another frame is wanted.
    pub fn update(&mut self, now: Instant) -> Tick {
        if let Some(audio) = &mut self.audio {
            audio.poll();
        }
        self.frame_loop.tick(now)
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// A further frame callback is pending
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_scheduled()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.frame_loop.elapsed_ms()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn services(&self) -> &ServicesScene {
        &self.services
    }

    pub fn audio(&self) -> Option<&AudioController> {
        self.audio.as_ref()
    }

    pub fn weights(&self) -> SceneWeights {
        self.timeline.blend(self.elapsed_ms())
    }

    /// The frame for the current elapsed time
    pub fn compose(&self) -> FrameDescription {
        self.frame_at(self.elapsed_ms())
    }

    /// Merge every scene with a positive weight at `elapsed_ms`
    pub fn frame_at(&self, elapsed_ms: f64) -> FrameDescription {
        let weights = self.timeline.blend(elapsed_ms);
        let mut frame = FrameDescription::new();
        if weights.office_visible() {
            frame.merge(self.office.describe(elapsed_ms, weights.office));
        }
        if weights.services_visible() {
            frame.merge(self.services.describe(elapsed_ms, weights.services));
        }
        frame
    }
}

impl Drop for Cinematic {
    fn drop(&mut self) {
        self.frame_loop.cancel();
        if let Some(audio) = &mut self.audio {
            audio.shutdown();
        }
    }
}
