//! Windowed player: winit event loop, ray cast frame on a wgpu surface and
//! the egui overlay on top.

pub mod ui;

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::cinematic::Cinematic;
use crate::config::Config;
use crate::core::canvas::rgba_len;
use crate::core::clock::Clock;
use crate::core::gpu_context::GpuContext;
use crate::core::surface_renderer::SurfaceRenderer;
use crate::error::{CinematicError, Result};
use crate::renderer::Renderer;
use crate::scene::FrameDescription;
use ui::{UiAction, UiFrame};

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerOptions {
    /// Free-fly camera
    pub inspect: bool,
    pub show_fps: bool,
}

/// GPU side of the player, created once the window exists
struct Graphics {
    gpu: GpuContext,
    frame: SurfaceRenderer,
    egui_renderer: egui_wgpu::Renderer,
    egui_state: egui_winit::State,
    egui_ctx: egui::Context,
}

impl Graphics {
    async fn new(window: Arc<Window>) -> Result<Self> {
        let gpu = GpuContext::new(window.clone()).await?;
        let (width, height) = gpu.size();
        let frame = SurfaceRenderer::new(gpu.device(), gpu.format(), width, height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            gpu.device(),
            gpu.format(),
            egui_wgpu::RendererOptions::default(),
        );

        Ok(Self {
            gpu,
            frame,
            egui_renderer,
            egui_state,
            egui_ctx,
        })
    }

    /// Present the uploaded frame with the overlay; returns the UI action
    /// and whether egui wants another repaint
    fn render(
        &mut self,
        window: &Window,
        ui_frame: &UiFrame,
    ) -> std::result::Result<(UiAction, bool), wgpu::SurfaceError> {
        let output = self.gpu.surface().get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        // Render pass - display ray cast frame
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Display Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.frame.draw(&mut render_pass);
        }

        // egui pass - UI overlay
        let mut action = UiAction::None;
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            action = ui::draw(ctx, ui_frame);
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);
        let repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(self.gpu.device(), self.gpu.queue(), *id, image_delta);
        }

        let (width, height) = self.gpu.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: window.scale_factor() as f32,
        };

        self.egui_renderer.update_buffers(
            self.gpu.device(),
            self.gpu.queue(),
            &mut encoder,
            &tris,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            // SAFETY: The render pass lifetime is actually tied to the encoder,
            // but egui-wgpu requires 'static. This is safe because we drop the
            // render pass before using the encoder again.
            let render_pass_static = unsafe {
                std::mem::transmute::<&mut wgpu::RenderPass<'_>, &mut wgpu::RenderPass<'static>>(
                    &mut render_pass,
                )
            };

            self.egui_renderer
                .render(render_pass_static, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        output.present();
        Ok((action, repaint))
    }

    /// Returns whether the event needs a repaint, and whether egui consumed it
    fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> (bool, bool) {
        let response = self.egui_state.on_window_event(window, event);
        (response.repaint, response.consumed)
    }
}

/// Key of the last ray cast: elapsed time, size and camera placement
#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameKey {
    elapsed_ms: f64,
    size: (u32, u32),
    camera: [f32; 6],
}

pub struct Player {
    window: Option<Arc<Window>>,
    graphics: Option<Graphics>,
    cinematic: Cinematic,
    renderer: Renderer,
    camera: Camera,
    home_camera: Camera,
    clock: Clock,
    options: PlayerOptions,
    contact: String,
    pixels: Vec<u8>,
    frame: FrameDescription,
    last_frame: Option<FrameKey>,
    needs_redraw: bool,
}

impl Player {
    pub fn new(config: &Config, options: PlayerOptions) -> Self {
        let camera = config.camera.camera();
        Self {
            window: None,
            graphics: None,
            cinematic: Cinematic::new(config),
            renderer: Renderer::new(config.render),
            camera,
            home_camera: camera,
            clock: Clock::new(Instant::now()),
            options,
            contact: config.contact.clone(),
            pixels: Vec::new(),
            frame: FrameDescription::new(),
            last_frame: None,
            needs_redraw: true,
        }
    }

    /// Frames are being produced without any input event
    fn is_animating(&self) -> bool {
        self.cinematic.is_running() || (self.options.inspect && self.camera.movement.is_moving())
    }

    fn start(&mut self) {
        if self.cinematic.start(Instant::now()) {
            self.needs_redraw = true;
        }
    }

    /// Ray cast the current frame into the surface texture when anything
    /// visible changed since the last one
    fn update_frame(&mut self) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };
        let (window_w, window_h) = graphics.gpu.size();
        let (width, height) = self.renderer.scaled_size(window_w, window_h);

        let key = FrameKey {
            elapsed_ms: self.cinematic.elapsed_ms(),
            size: (width, height),
            camera: [
                self.camera.position.x,
                self.camera.position.y,
                self.camera.position.z,
                self.camera.target.x,
                self.camera.target.y,
                self.camera.target.z,
            ],
        };
        if self.last_frame == Some(key) {
            return;
        }

        self.frame = self.cinematic.compose();
        self.pixels.resize(rgba_len(width, height).unwrap_or(0), 0);
        self.renderer
            .render_into(&self.frame, &self.camera, width, height, &mut self.pixels);

        match graphics
            .frame
            .upload(graphics.gpu.device(), graphics.gpu.queue(), &self.pixels, width, height)
        {
            Ok(()) => self.last_frame = Some(key),
            Err(e) => log::error!("frame upload failed: {}", e),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.clock.tick(now);
        self.cinematic.update(now);
        if self.options.inspect {
            self.camera.update();
        }
        self.update_frame();

        let (Some(graphics), Some(window)) = (&mut self.graphics, &self.window) else {
            return;
        };
        let ui_frame = UiFrame {
            started: self.cinematic.is_started(),
            fps: self.options.show_fps.then(|| self.clock.fps()),
            overlays: &self.frame.overlays,
            camera: &self.camera,
            contact: &self.contact,
        };

        match graphics.render(window, &ui_frame) {
            Ok((action, repaint)) => {
                self.needs_redraw = repaint;
                if action == UiAction::Start {
                    self.start();
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics.gpu.reconfigure();
                self.needs_redraw = true;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {}", e),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if let PhysicalKey::Code(code) = event.physical_key {
            if event.state == ElementState::Pressed {
                match code {
                    KeyCode::Escape => {
                        event_loop.exit();
                        return;
                    }
                    KeyCode::Enter => self.start(),
                    KeyCode::KeyR if self.options.inspect => self.camera = self.home_camera,
                    _ => {}
                }
            }
        }
        if self.options.inspect {
            self.camera.process_keyboard(event);
            self.needs_redraw = true;
        }
    }
}

impl ApplicationHandler for Player {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(ui::PAGE_TITLE)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let graphics = match pollster::block_on(Graphics::new(window.clone())) {
            Ok(g) => g,
            Err(e) => {
                log::error!("failed to initialize graphics: {}", e);
                event_loop.exit();
                return;
            }
        };

        log::info!("player ready; Enter or the button starts the cinematic");
        self.window = Some(window);
        self.graphics = Some(graphics);
        self.needs_redraw = true;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let (Some(graphics), Some(window)) = (&mut self.graphics, &self.window) {
            let (repaint, consumed) = graphics.handle_event(window, &event);
            self.needs_redraw |= repaint;
            if consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::Resized(size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.gpu.resize(size.width, size.height);
                }
                self.needs_redraw = true;
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let animating = self.is_animating();
        if let Some(window) = &self.window {
            if animating || self.needs_redraw {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(control_flow(animating));
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // GPU resources go before the window they present to
        self.graphics = None;
    }
}

/// Poll only while animating; an idle window sleeps until the next event.
/// Pending redraws arrive as events, so they need no polling.
fn control_flow(animating: bool) -> ControlFlow {
    if animating {
        ControlFlow::Poll
    } else {
        ControlFlow::Wait
    }
}

/// Open the window and run until it is closed
pub fn run(config: &Config, options: PlayerOptions) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|e| CinematicError::Render(format!("event loop: {}", e)))?;
    let mut player = Player::new(config, options);
    event_loop
        .run_app(&mut player)
        .map_err(|e| CinematicError::Render(format!("event loop: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(options: PlayerOptions) -> Player {
        let mut config = Config::default();
        config.audio.enabled = false;
        config.voice.enabled = false;
        Player::new(&config, options)
    }

    #[test]
    fn idle_loop_waits_for_events() {
        assert_eq!(control_flow(false), ControlFlow::Wait);
        assert_eq!(control_flow(true), ControlFlow::Poll);
    }

    #[test]
    fn fps_overlay_does_not_keep_loop_busy() {
        let options = PlayerOptions {
            inspect: false,
            show_fps: true,
        };
        let player = player(options);
        assert!(!player.is_animating());
        assert_eq!(control_flow(player.is_animating()), ControlFlow::Wait);
    }

    #[test]
    fn started_cinematic_animates_until_the_end() {
        let mut player = player(PlayerOptions::default());
        let t0 = Instant::now();
        player.cinematic.start(t0);
        assert!(player.is_animating());

        player.cinematic.update(t0 + std::time::Duration::from_millis(34_000));
        assert!(!player.is_animating());
    }

    #[test]
    fn inspect_movement_animates() {
        let mut player = player(PlayerOptions {
            inspect: true,
            show_fps: false,
        });
        assert!(!player.is_animating());
        player.camera.movement.forward = true;
        assert!(player.is_animating());
    }
}
