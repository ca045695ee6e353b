pub mod canvas;
pub mod clock;
pub mod frame_loop;
pub mod gpu_context;
pub mod surface_renderer;

pub use canvas::{rgba_len, Canvas, DrawOp, Rgba8};
pub use clock::Clock;
pub use frame_loop::{FrameLoop, Tick};
pub use gpu_context::GpuContext;
pub use surface_renderer::SurfaceRenderer;
