use std::time::Instant;

/// Frame clock for the player: measures frame deltas and averages the
/// frame rate over a fixed window
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    frames: u32,
    window_secs: f32,
    accumulated: f32,
    fps: f32,
}

impl Clock {
    pub const FPS_WINDOW_SECS: f32 = 1.0;

    pub fn new(now: Instant) -> Self {
        Self {
            last_tick: now,
            frames: 0,
            window_secs: Self::FPS_WINDOW_SECS,
            accumulated: 0.0,
            fps: 0.0,
        }
    }

    /// Advance to `now`, returning the delta in seconds
    pub fn tick(&mut self, now: Instant) -> f32 {
        let delta = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        self.frames += 1;
        self.accumulated += delta;
        if self.accumulated >= self.window_secs {
            self.fps = self.frames as f32 / self.accumulated;
            log::debug!("fps: {:.1}", self.fps);
            self.frames = 0;
            self.accumulated = 0.0;
        }
        delta
    }

    /// Average frame rate over the last complete window
    pub fn fps(&self) -> f32 {
        self.fps
    }
}
