use std::sync::{Arc, OnceLock};

use bytemuck::{Pod, Zeroable};
use fontdue::{Font, FontSettings};

/// 8-bit RGBA color, laid out as it is stored in a pixel buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let [r, g, b] = crate::math::parse_hex(hex)?;
        Some(Self::opaque(r, g, b))
    }

    /// Build from float channels in [0, 1]
    pub fn from_unit(rgb: [f32; 3], alpha: f32) -> Self {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(to_u8(rgb[0]), to_u8(rgb[1]), to_u8(rgb[2]), to_u8(alpha))
    }
}

/// Bytes in a tightly packed RGBA8 image, `None` when that overflows `usize`
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// 2D drawing operations, composited source-over like a browser 2D context
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Replace every pixel with the color
    Fill(Rgba8),

    /// Filled rectangle; coordinates may be negative or run off the canvas
    Rect { x: i32, y: i32, width: u32, height: u32, color: Rgba8 },

    /// One pixel tall horizontal line
    HLine { x: i32, y: i32, length: u32, color: Rgba8 },

    /// Text with its alphabetic baseline at `y`
    Text { x: i32, y: i32, size: f32, text: String, color: Rgba8 },
}

/// Offscreen RGBA bitmap with pending draw operations
#[derive(Clone)]
pub struct Canvas {
    pixels: Vec<u8>,
    operations: Vec<DrawOp>,
    font: Option<Arc<Font>>,
    width: u32,
    height: u32,
}

impl Canvas {
    /// Transparent black canvas. A size too large to address gives an
    /// empty 0x0 canvas.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height, len) = match rgba_len(width, height) {
            Some(len) => (width, height, len),
            None => (0, 0, 0),
        };
        Self {
            pixels: vec![0; len],
            operations: Vec::new(),
            font: None,
            width,
            height,
        }
    }

    /// Wrap an existing RGBA8 buffer; `None` when the size does not match
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if rgba_len(width, height) != Some(pixels.len()) {
            return None;
        }
        Some(Self {
            pixels,
            operations: Vec::new(),
            font: None,
            width,
            height,
        })
    }

    /// Font used by `DrawOp::Text`; without one text ops are skipped
    pub fn with_font(mut self, font: Option<Arc<Font>>) -> Self {
        self.font = font;
        self
    }

    pub fn draw(mut self, op: DrawOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Execute all pending operations and return the resulting canvas
    pub fn execute_ops(mut self) -> Self {
        let operations = std::mem::take(&mut self.operations);
        for op in &operations {
            self.execute_op(op);
        }
        self
    }

    fn execute_op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Fill(color) => self.fill(*color),
            DrawOp::Rect { x, y, width, height, color } => {
                self.fill_rect(*x, *y, *width, *height, *color)
            }
            DrawOp::HLine { x, y, length, color } => self.fill_rect(*x, *y, *length, 1, *color),
            DrawOp::Text { x, y, size, text, color } => self.fill_text(*x, *y, *size, text, *color),
        }
    }

    fn fill(&mut self, color: Rgba8) {
        bytemuck::cast_slice_mut::<u8, Rgba8>(&mut self.pixels).fill(color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba8) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);

        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px as u32, py as u32, color, 1.0);
            }
        }
    }

    fn fill_text(&mut self, x: i32, baseline: i32, size: f32, text: &str, color: Rgba8) {
        let Some(font) = self.font.clone() else {
            log::debug!("no font loaded, skipping text {:?}", text);
            return;
        };

        let mut cursor_x = x as f32;
        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, size);
            let glyph_x = cursor_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    let px = glyph_x + gx as i32;
                    let py = glyph_y + gy as i32;
                    if px >= 0 && py >= 0 && (px as u32) < self.width && (py as u32) < self.height {
                        self.blend_pixel(px as u32, py as u32, color, coverage as f32 / 255.0);
                    }
                }
            }
            cursor_x += metrics.advance_width;
        }
    }

    /// Source-over blend of `color` scaled by `coverage`
    fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba8, coverage: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        let src_a = color.a as f32 / 255.0 * coverage;
        let dst_a = self.pixels[idx + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        if out_a <= 0.0 {
            self.pixels[idx..idx + 4].copy_from_slice(&[0, 0, 0, 0]);
            return;
        }

        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let s = src[c] as f32;
            let d = self.pixels[idx + c] as f32;
            let blended = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
            self.pixels[idx + c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[idx + 3] = (out_a * 255.0).round() as u8;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Advance width of `text` at `size`, or 0 without a font
    pub fn text_width(&self, size: f32, text: &str) -> f32 {
        let Some(font) = &self.font else {
            return 0.0;
        };
        text.chars().map(|ch| font.metrics(ch, size).advance_width).sum()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The UI toolkit's bundled proportional font, loaded once
pub fn ui_font() -> Option<Arc<Font>> {
    static FONT: OnceLock<Option<Arc<Font>>> = OnceLock::new();
    FONT.get_or_init(|| {
        let defs = egui::FontDefinitions::default();
        let name = defs
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())?;
        let data = defs.font_data.get(name)?;
        match Font::from_bytes(&data.font[..], FontSettings::default()) {
            Ok(font) => Some(Arc::new(font)),
            Err(e) => {
                log::warn!("failed to load UI font {}: {}", name, e);
                None
            }
        }
    })
    .clone()
}
