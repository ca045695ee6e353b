//! Offline rendering to a PNG sequence and a WAV soundtrack.

use std::path::{Path, PathBuf};

use glam::Vec2;

use crate::audio;
use crate::camera::Camera;
use crate::cinematic::Cinematic;
use crate::config::Config;
use crate::core::canvas::{ui_font, Canvas, DrawOp, Rgba8};
use crate::error::{CinematicError, Result};
use crate::renderer::{RenderSettings, Renderer};
use crate::scene::{Overlay, OverlayContent};
use crate::scenes::{OfficeScene, ServicesScene};

/// Overlay sizes are authored for this frame height
const REFERENCE_HEIGHT: f32 = 540.0;

/// Largest exported frame edge, in pixels
pub const MAX_FRAME_EDGE: u32 = 16_384;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub audio: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub frames: usize,
    pub audio_samples: usize,
}

/// Sample instants from 0 through `total_ms` inclusive
pub fn frame_times(total_ms: f64, fps: u32) -> Vec<f64> {
    if fps == 0 {
        return Vec::new();
    }
    let count = (total_ms.max(0.0) * fps as f64 / 1000.0 + 1e-9).floor() as usize + 1;
    (0..count).map(|i| i as f64 * 1000.0 / fps as f64).collect()
}

pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{:05}.png", index))
}

/// Render every frame of the timeline and, if requested, the soundtrack
pub fn export(config: &Config, options: &ExportOptions) -> Result<ExportSummary> {
    if options.fps == 0 || options.width == 0 || options.height == 0 {
        return Err(CinematicError::Export("fps, width and height must be positive".into()));
    }
    if options.width > MAX_FRAME_EDGE || options.height > MAX_FRAME_EDGE {
        return Err(CinematicError::Export(format!(
            "frame size {}x{} exceeds {}x{}",
            options.width, options.height, MAX_FRAME_EDGE, MAX_FRAME_EDGE
        )));
    }
    std::fs::create_dir_all(&options.out_dir)?;

    let cinematic = Cinematic::with_parts(
        config.timeline,
        OfficeScene::new(),
        ServicesScene::new(config.contact.clone()),
        None,
    );
    let renderer = Renderer::new(RenderSettings {
        render_scale: 1.0,
        ..config.render
    });
    let camera = config.camera.camera();
    let font = ui_font();

    let times = frame_times(config.timeline.total_duration_ms, options.fps);
    log::info!(
        "exporting {} frames at {}x{} to {}",
        times.len(),
        options.width,
        options.height,
        options.out_dir.display()
    );

    for (index, &t) in times.iter().enumerate() {
        let frame = cinematic.frame_at(t);
        let pixels = renderer.render(&frame, &camera, options.width, options.height);
        let canvas = Canvas::from_rgba(options.width, options.height, pixels)
            .ok_or_else(|| CinematicError::Export("frame buffer size mismatch".into()))?
            .with_font(font.clone());
        let canvas = draw_overlays(canvas, &frame.overlays, &camera);
        save_png(&frame_path(&options.out_dir, index), options.width, options.height, canvas.into_pixels())?;
        log::debug!("frame {} at {:.0}ms", index, t);
    }

    let mut audio_samples = 0;
    if let Some(path) = &options.audio {
        let secs = config.timeline.total_duration_ms / 1000.0;
        let rate = config.audio.sample_rate;
        let samples = audio::render_offline(rate, 2, config.audio.master_gain, secs);
        audio::write_wav(path, &samples, rate, 2)?;
        audio_samples = samples.len();
    }

    Ok(ExportSummary {
        frames: times.len(),
        audio_samples,
    })
}

fn save_png(path: &Path, width: u32, height: u32, pixels: Vec<u8>) -> Result<()> {
    let image = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| CinematicError::Export("frame buffer size mismatch".into()))?;
    image
        .save(path)
        .map_err(|e| CinematicError::Export(format!("{}: {e}", path.display())))
}

/// Draw scene overlays at their projected anchors
pub fn draw_overlays(canvas: Canvas, overlays: &[Overlay], camera: &Camera) -> Canvas {
    let (width, height) = canvas.dimensions();
    let scale = height as f32 / REFERENCE_HEIGHT;

    let mut ops = Vec::new();
    for overlay in overlays {
        if overlay.opacity <= 0.0 {
            continue;
        }
        let Some(at) = camera.project(overlay.anchor, width as f32, height as f32) else {
            continue;
        };
        overlay_ops(&canvas, overlay, at, scale, &mut ops);
    }

    ops.into_iter().fold(canvas, Canvas::draw).execute_ops()
}

fn with_alpha(hex: &str, alpha: f32) -> Rgba8 {
    let c = Rgba8::from_hex(hex).unwrap_or(Rgba8::opaque(255, 255, 255));
    Rgba8::new(c.r, c.g, c.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn centered_text(canvas: &Canvas, text: &str, size: f32, x: f32, y: f32, color: Rgba8) -> DrawOp {
    let w = canvas.text_width(size, text);
    DrawOp::Text {
        x: (x - w * 0.5).round() as i32,
        y: y.round() as i32,
        size,
        text: text.to_string(),
        color,
    }
}

fn overlay_ops(canvas: &Canvas, overlay: &Overlay, at: Vec2, scale: f32, ops: &mut Vec<DrawOp>) {
    let a = overlay.opacity;
    match &overlay.content {
        OverlayContent::Label(text) => {
            ops.push(centered_text(canvas, text, 18.0 * scale, at.x, at.y, with_alpha("#e2e8f0", a)));
        }
        OverlayContent::Card { title, subtitle, tiles } => {
            let (w, h) = (420.0 * scale, 170.0 * scale);
            ops.push(DrawOp::Rect {
                x: (at.x - w * 0.5).round() as i32,
                y: (at.y - h * 0.5).round() as i32,
                width: w.round() as u32,
                height: h.round() as u32,
                color: with_alpha("#0e1726", 0.8 * a),
            });
            let top = at.y - h * 0.5;
            ops.push(centered_text(canvas, title, 30.0 * scale, at.x, top + 42.0 * scale, with_alpha("#ffffff", a)));
            ops.push(centered_text(canvas, subtitle, 16.0 * scale, at.x, top + 68.0 * scale, with_alpha("#2dd4bf", a)));

            let tile_w = w / tiles.len().max(1) as f32;
            for (i, (name, description)) in tiles.iter().enumerate() {
                let cx = at.x - w * 0.5 + tile_w * (i as f32 + 0.5);
                ops.push(centered_text(canvas, name, 14.0 * scale, cx, top + 112.0 * scale, with_alpha("#ffffff", a)));
                ops.push(centered_text(canvas, description, 11.0 * scale, cx, top + 132.0 * scale, with_alpha("#94a3b8", a)));
            }
        }
        OverlayContent::Link { text, .. } => {
            let size = 18.0 * scale;
            let w = canvas.text_width(size, text) + 32.0 * scale;
            let h = 36.0 * scale;
            ops.push(DrawOp::Rect {
                x: (at.x - w * 0.5).round() as i32,
                y: (at.y - h * 0.5).round() as i32,
                width: w.round() as u32,
                height: h.round() as u32,
                color: with_alpha("#22c55e", a),
            });
            ops.push(centered_text(canvas, text, size, at.x, at.y + size * 0.35, with_alpha("#0b0f14", a)));
        }
    }
}
