use std::time::Instant;

/// Result of one frame callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Milliseconds since the loop started
    pub elapsed_ms: f64,
    /// Whether another frame callback should be scheduled
    pub reschedule: bool,
}

/// Self-rescheduling frame loop driven by the display refresh
///
/// The loop runs from `start` until elapsed time reaches the duration, or
/// until `cancel` is called. Elapsed time never goes backwards even if the
/// caller hands in an older instant.
#[derive(Debug)]
pub struct FrameLoop {
    duration_ms: f64,
    started_at: Option<Instant>,
    elapsed_ms: f64,
    scheduled: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            started_at: None,
            elapsed_ms: 0.0,
            scheduled: false,
            frames: 0,
        }
    }

    /// Record the start instant and schedule the first callback.
    /// Restarting is not supported; later calls are ignored.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_some() {
            return;
        }
        self.started_at = Some(now);
        self.scheduled = true;
    }

    /// Run one frame callback at `now`
    pub fn tick(&mut self, now: Instant) -> Tick {
        let Some(started_at) = self.started_at else {
            return Tick {
                elapsed_ms: self.elapsed_ms,
                reschedule: false,
            };
        };

        if self.scheduled {
            let t = now.saturating_duration_since(started_at).as_secs_f64() * 1000.0;
            self.elapsed_ms = self.elapsed_ms.max(t);
            self.frames += 1;
            self.scheduled = self.elapsed_ms < self.duration_ms;
            log::trace!("frame {} at {:.1}ms", self.frames, self.elapsed_ms);
        }

        Tick {
            elapsed_ms: self.elapsed_ms,
            reschedule: self.scheduled,
        }
    }

    /// Drop any pending callback, wherever the loop is in its cycle
    pub fn cancel(&mut self) {
        if self.scheduled {
            log::debug!("frame loop cancelled at {:.1}ms", self.elapsed_ms);
        }
        self.scheduled = false;
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn idle_before_start() {
        let mut frame_loop = FrameLoop::new(1000.0);
        let tick = frame_loop.tick(Instant::now());
        assert_eq!(tick.elapsed_ms, 0.0);
        assert!(!tick.reschedule);
        assert!(!frame_loop.is_started());
    }

    #[test]
    fn elapsed_never_decreases() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::new(10_000.0);
        frame_loop.start(start);

        let later = frame_loop.tick(start + Duration::from_millis(500));
        let earlier = frame_loop.tick(start + Duration::from_millis(100));

        assert_eq!(later.elapsed_ms, 500.0);
        assert_eq!(earlier.elapsed_ms, 500.0);
    }

    #[test]
    fn second_start_is_ignored() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::new(10_000.0);
        frame_loop.start(start);
        frame_loop.start(start + Duration::from_secs(5));

        let tick = frame_loop.tick(start + Duration::from_secs(6));
        assert_eq!(tick.elapsed_ms, 6000.0);
    }

    #[test]
    fn cancel_stops_scheduling() {
        let start = Instant::now();
        let mut frame_loop = FrameLoop::new(10_000.0);
        frame_loop.start(start);
        assert!(frame_loop.tick(start + Duration::from_millis(16)).reschedule);

        frame_loop.cancel();
        let tick = frame_loop.tick(start + Duration::from_millis(32));
        assert!(!tick.reschedule);
        assert_eq!(tick.elapsed_ms, 16.0);
        assert_eq!(frame_loop.frame_count(), 1);
    }
}
