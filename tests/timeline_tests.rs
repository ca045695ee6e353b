use cinematic::core::FrameLoop;
use cinematic::timeline::{Timeline, SCENE_ONE_END_MS, TOTAL_DURATION_MS};
use std::time::{Duration, Instant};

#[cfg(test)]
mod weight_tests {
    use super::*;

    fn sweep() -> impl Iterator<Item = f64> {
        (0..=400).map(|i| i as f64 * 100.0)
    }

    #[test]
    fn test_weights_stay_in_unit_range() {
        let timeline = Timeline::default();
        for t in sweep() {
            let w = timeline.blend(t);
            assert!((0.0..=1.0).contains(&w.office), "office weight {} at {}", w.office, t);
            assert!((0.0..=1.0).contains(&w.services), "services weight {} at {}", w.services, t);
        }
    }

    #[test]
    fn test_office_weight_never_increases() {
        let timeline = Timeline::default();
        let weights: Vec<f32> = sweep().map(|t| timeline.weight1(t)).collect();
        assert!(weights.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_services_weight_never_decreases() {
        let timeline = Timeline::default();
        let weights: Vec<f32> = sweep().map(|t| timeline.weight2(t)).collect();
        assert!(weights.windows(2).all(|w| w[1] >= w[0]));
    }

    /// Sample instants strictly inside (start, end), 50 ms apart
    fn open_window(start: f64, end: f64) -> Vec<f64> {
        let steps = ((end - start) / 50.0) as usize;
        (1..steps).map(|i| start + i as f64 * 50.0).collect()
    }

    #[test]
    fn test_office_weight_strictly_decreases_during_fade_out() {
        let timeline = Timeline::default();
        let window = open_window(SCENE_ONE_END_MS - 2000.0, SCENE_ONE_END_MS);
        let weights: Vec<f32> = window.iter().map(|&t| timeline.weight1(t)).collect();
        assert_eq!(weights.len(), 39);
        assert!(weights.windows(2).all(|w| w[1] < w[0]));
        assert!(weights.iter().all(|&w| w > 0.0 && w < 1.0));
    }

    #[test]
    fn test_services_weight_strictly_increases_during_fade_in() {
        let timeline = Timeline::default();
        let window = open_window(SCENE_ONE_END_MS - 1000.0, SCENE_ONE_END_MS + 1500.0);
        let weights: Vec<f32> = window.iter().map(|&t| timeline.weight2(t)).collect();
        assert_eq!(weights.len(), 49);
        assert!(weights.windows(2).all(|w| w[1] > w[0]));
        assert!(weights.iter().all(|&w| w > 0.0 && w < 1.0));
    }

    #[test]
    fn test_weights_follow_linear_ramps_inside_windows() {
        let timeline = Timeline::default();
        assert!((timeline.weight1(16_500.0) - 0.75).abs() < 1e-6);
        assert!((timeline.weight1(17_800.0) - 0.1).abs() < 1e-6);
        assert!((timeline.weight2(17_500.0) - 0.2).abs() < 1e-6);
        assert!((timeline.weight2(18_700.0) - 0.68).abs() < 1e-6);
        assert!((timeline.weight2(19_250.0) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_office_weight_boundaries() {
        let timeline = Timeline::default();
        assert_eq!(timeline.weight1(0.0), 1.0);
        assert_eq!(timeline.weight1(SCENE_ONE_END_MS - 2000.0), 1.0);
        assert_eq!(timeline.weight1(SCENE_ONE_END_MS), 0.0);
        assert_eq!(timeline.weight1(TOTAL_DURATION_MS), 0.0);
    }

    #[test]
    fn test_services_weight_boundaries() {
        let timeline = Timeline::default();
        assert_eq!(timeline.weight2(0.0), 0.0);
        assert_eq!(timeline.weight2(SCENE_ONE_END_MS - 1000.0), 0.0);
        assert_eq!(timeline.weight2(SCENE_ONE_END_MS - 1000.0 + 2500.0), 1.0);
        assert_eq!(timeline.weight2(TOTAL_DURATION_MS), 1.0);
    }

    #[test]
    fn test_concrete_values_for_default_timeline() {
        let timeline = Timeline::default();
        assert_eq!(timeline.weight1(16_000.0), 1.0);
        assert!((timeline.weight1(17_000.0) - 0.5).abs() < 1e-6);
        assert_eq!(timeline.weight1(18_000.0), 0.0);
        assert_eq!(timeline.weight2(17_000.0), 0.0);
        assert!((timeline.weight2(18_000.0) - 0.4).abs() < 1e-6);
        assert_eq!(timeline.weight2(19_500.0), 1.0);
    }

    #[test]
    fn test_scenes_overlap_during_crossfade() {
        let timeline = Timeline::default();
        let w = timeline.blend(17_500.0);
        assert!(w.office_visible() && w.services_visible());
    }

    #[test]
    fn test_weights_are_pure() {
        let timeline = Timeline::default();
        for t in [0.0, 16_500.0, 17_250.0, 18_100.0, 33_000.0] {
            assert_eq!(timeline.blend(t), timeline.blend(t));
        }
    }

    #[test]
    fn test_custom_scene_end_shifts_crossfade() {
        let timeline = Timeline::new(10_000.0, 20_000.0);
        assert!((timeline.weight1(9_000.0) - 0.5).abs() < 1e-6);
        assert!((timeline.weight2(10_000.0) - 0.4).abs() < 1e-6);
        assert!(timeline.is_finished(20_000.0));
        assert!(!timeline.is_finished(19_999.0));
    }
}

#[cfg(test)]
mod frame_loop_tests {
    use super::*;

    #[test]
    fn test_loop_not_scheduled_before_start() {
        let mut frame_loop = FrameLoop::new(TOTAL_DURATION_MS);
        let tick = frame_loop.tick(Instant::now());
        assert!(!tick.reschedule);
        assert_eq!(tick.elapsed_ms, 0.0);
        assert!(!frame_loop.is_started());
    }

    #[test]
    fn test_loop_stops_at_total_duration() {
        let mut frame_loop = FrameLoop::new(TOTAL_DURATION_MS);
        let t0 = Instant::now();
        frame_loop.start(t0);

        let mut ms = 0;
        while frame_loop.tick(t0 + Duration::from_millis(ms)).reschedule {
            ms += 16;
        }
        assert!(frame_loop.elapsed_ms() >= TOTAL_DURATION_MS);
        assert!(frame_loop.elapsed_ms() < TOTAL_DURATION_MS + 16.0);
        assert!(!frame_loop.is_scheduled());
    }

    #[test]
    fn test_elapsed_never_decreases() {
        let mut frame_loop = FrameLoop::new(TOTAL_DURATION_MS);
        let t0 = Instant::now();
        frame_loop.start(t0);
        frame_loop.tick(t0 + Duration::from_millis(500));
        let tick = frame_loop.tick(t0 + Duration::from_millis(200));
        assert_eq!(tick.elapsed_ms, 500.0);
    }

    #[test]
    fn test_cancel_stops_scheduling() {
        let mut frame_loop = FrameLoop::new(TOTAL_DURATION_MS);
        let t0 = Instant::now();
        frame_loop.start(t0);
        frame_loop.tick(t0 + Duration::from_millis(100));
        frame_loop.cancel();
        assert!(!frame_loop.is_scheduled());
        let tick = frame_loop.tick(t0 + Duration::from_millis(1000));
        assert!(!tick.reschedule);
        assert_eq!(tick.elapsed_ms, 100.0);
    }
}
