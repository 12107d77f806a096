//! Software rasterizer for sparkle fields.
//!
//! [`PixelCanvas`] is a CPU-side drawing surface: premultiplied RGBA in
//! `f32`, source-over blending, and anti-aliased circles. Hosts use it as
//! the surface they hand to the renderer; the window host uploads its bytes
//! to a GPU texture every frame, the offscreen host writes PNG snapshots.

use std::path::Path;

use glam::{Vec2, Vec4};
use image::RgbaImage;

use crate::color::Color;
use crate::draw::{DrawContext, Paint};
use crate::error::SnapshotError;

/// A CPU drawing surface.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    id: String,
    width: u32,
    height: u32,
    /// Premultiplied RGBA, row-major.
    pixels: Vec<Vec4>,
    global_alpha: f32,
    fills: u64,
}

impl PixelCanvas {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
            global_alpha: 1.0,
            fills: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total circle fills since creation.
    pub fn fill_count(&self) -> u64 {
        self.fills
    }

    /// Change dimensions. Like a canvas element, this discards the contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, Vec4::ZERO);
    }

    /// Premultiplied color at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Vec4> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Premultiplied RGBA8 bytes, ready for upload to a GPU texture.
    pub fn to_premultiplied_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            for c in px.to_array() {
                bytes.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        bytes
    }

    /// Composite over `background` and convert to a straight-alpha image.
    pub fn to_image(&self, background: Color) -> RgbaImage {
        let bg = background.premultiplied();
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let src = self.pixels[(y * self.width + x) as usize];
            let out = src + bg * (1.0 - src.w);
            let color = if out.w > 0.0 {
                Color::rgba(out.x / out.w, out.y / out.w, out.z / out.w, out.w)
            } else {
                Color::TRANSPARENT
            };
            image::Rgba(color.to_rgba8())
        })
    }

    /// Write the canvas over `background` as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>, background: Color) -> Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::Empty);
        }
        self.to_image(background).save(path)?;
        Ok(())
    }

    #[inline]
    fn blend(&mut self, x: u32, y: u32, src: Vec4) {
        let idx = (y * self.width + x) as usize;
        let dst = self.pixels[idx];
        self.pixels[idx] = src + dst * (1.0 - src.w);
    }
}

impl DrawContext for PixelCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.fills += 1;
        if radius <= 0.0 || self.width == 0 || self.height == 0 || self.global_alpha <= 0.0 {
            return;
        }

        // pixel centers sit at +0.5; one extra pixel for the anti-aliased rim
        let min_x = (center.x - radius - 1.0).floor().max(0.0) as u32;
        let min_y = (center.y - radius - 1.0).floor().max(0.0) as u32;
        let max_x = ((center.x + radius + 1.0).ceil().max(0.0) as u32).min(self.width);
        let max_y = ((center.y + radius + 1.0).ceil().max(0.0) as u32).min(self.height);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = sample.distance(center);
                let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let color = match paint {
                    Paint::Solid(color) => color.premultiplied(),
                    Paint::RadialFade(color) => {
                        let t = (distance / radius).clamp(0.0, 1.0);
                        color.premultiplied() * (1.0 - t)
                    }
                };

                self.blend(x, y, color * (coverage * self.global_alpha));
            }
        }
    }
}
