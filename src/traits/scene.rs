use crate::scene::FrameDescription;

/// A scene of the cinematic, described from scratch every frame
pub trait SceneProvider {
    /// Build this frame's meshes, lights and overlays.
    ///
    /// `weight` in [0, 1] scales light and overlay intensities; geometry is
    /// unaffected.
    fn describe(&self, elapsed_ms: f64, weight: f32) -> FrameDescription;
}
