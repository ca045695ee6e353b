//! Procedural dashboard textures for the office monitors.

use rand::Rng;

use crate::core::canvas::{rgba_len, ui_font, Canvas, DrawOp, Rgba8};
use crate::math::hsl_to_rgb;

pub const DASHBOARD_WIDTH: u32 = 1024;
pub const DASHBOARD_HEIGHT: u32 = 512;

const BAR_COUNT: u32 = 12;
const BAR_HUES: [f32; 3] = [140.0, 50.0, 10.0];
const MARGIN: u32 = 20;
const GRID_START_Y: u32 = 60;
const GRID_SPACING: u32 = 24;
const TITLE: &str = "Quarterly KPI Dashboard";
const TITLE_SIZE: f32 = 28.0;

/// Immutable RGBA8 image sampled by materials
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(rgba_len(width, height), Some(pixels.len()));
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Bilinear sample in linear [0, 1] channels. `v = 0` is the bottom row,
    /// matching plane UVs.
    pub fn sample(&self, u: f32, v: f32) -> [f32; 3] {
        let fx = (u.clamp(0.0, 1.0) * self.width as f32 - 0.5).max(0.0);
        let fy = ((1.0 - v.clamp(0.0, 1.0)) * self.height as f32 - 0.5).max(0.0);
        let (x0, y0) = (fx as u32, fy as u32);
        let (tx, ty) = (fx.fract(), fy.fract());

        let lerp = |a: [u8; 4], b: [u8; 4], t: f32| -> [f32; 3] {
            std::array::from_fn(|c| a[c] as f32 + (b[c] as f32 - a[c] as f32) * t)
        };
        let top = lerp(self.texel(x0, y0), self.texel(x0 + 1, y0), tx);
        let bottom = lerp(self.texel(x0, y0 + 1), self.texel(x0 + 1, y0 + 1), tx);
        std::array::from_fn(|c| (top[c] + (bottom[c] - top[c]) * ty) / 255.0)
    }
}

/// Geometry of one dashboard bar, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub hue: f32,
}

/// Lay out the bar chart. Heights are random in `[30, 0.6h + 30)`.
pub fn layout_bars<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Vec<Bar> {
    let slot = width.saturating_sub(MARGIN * 2) as f32 / BAR_COUNT as f32;
    let bar_width = (slot - 4.0).max(1.0);

    (0..BAR_COUNT)
        .map(|i| {
            let bar_height = (rng.random::<f32>() * (height as f32 * 0.6) + 30.0).round();
            Bar {
                x: (MARGIN as f32 + i as f32 * slot).round() as i32,
                y: (height as f32 - bar_height - MARGIN as f32) as i32,
                width: bar_width.round() as u32,
                height: bar_height as u32,
                hue: BAR_HUES[i as usize % BAR_HUES.len()],
            }
        })
        .collect()
}

/// Gridline alpha at row `y`: 0.06 at the top fading to 0.02 at the bottom
pub fn gridline_alpha(y: u32, height: u32) -> f32 {
    let t = y as f32 / height.max(1) as f32;
    0.06 + (0.02 - 0.06) * t
}

/// Draw a KPI dashboard: dark background, 12 random bars, title and
/// faint horizontal gridlines.
pub fn generate_dashboard<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> Texture {
    let mut canvas = Canvas::new(width, height)
        .with_font(ui_font())
        .draw(DrawOp::Fill(Rgba8::opaque(0x0e, 0x15, 0x20)));

    for bar in layout_bars(width, height, rng) {
        let rgb = hsl_to_rgb(bar.hue, 0.7, 0.5);
        canvas = canvas.draw(DrawOp::Rect {
            x: bar.x,
            y: bar.y,
            width: bar.width,
            height: bar.height,
            color: Rgba8::from_unit(rgb, 1.0),
        });
    }

    canvas = canvas.draw(DrawOp::Text {
        x: 20,
        y: 40,
        size: TITLE_SIZE,
        text: TITLE.to_string(),
        color: Rgba8::opaque(0x89, 0xa3, 0xc7),
    });

    let mut y = GRID_START_Y;
    while y < height {
        canvas = canvas.draw(DrawOp::HLine {
            x: 0,
            y: y as i32,
            length: width,
            color: Rgba8::from_unit([1.0; 3], gridline_alpha(y, height)),
        });
        y += GRID_SPACING;
    }

    let canvas = canvas.execute_ops();
    Texture::from_rgba(width, height, canvas.into_pixels())
}
