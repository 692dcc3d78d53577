//! In-memory RGBA surface

use std::path::Path;

use super::{ImageRef, Rgba, Surface, SurfaceError, SurfaceRect};

/// Clip a span starting at `start` with length `len` to `0..limit`
fn clip(start: i64, len: i64, limit: i64) -> Option<(usize, usize)> {
    let lo = start.max(0);
    let hi = (start + len).min(limit);
    (lo < hi).then(|| (lo as usize, hi as usize))
}

/// RGBA pixel buffer with a configurable on-screen rectangle
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    rect: SurfaceRect,
}

impl PixelSurface {
    /// Create a transparent-black surface displayed at its natural size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            rect: SurfaceRect::sized(width as f64, height as f64),
        }
    }

    pub fn with_rect(mut self, rect: SurfaceRect) -> Self {
        self.rect = rect;
        self
    }

    /// Change the on-screen placement (e.g. after a layout change)
    pub fn set_rect(&mut self, rect: SurfaceRect) {
        self.rect = rect;
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[i..i + 4]);
        Some(out)
    }

    /// Write the surface contents as a PNG file
    pub fn save_png(&self, path: &Path) -> Result<(), SurfaceError> {
        image::save_buffer(
            path,
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        tracing::info!("Saved {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bounding_rect(&self) -> SurfaceRect {
        self.rect
    }

    fn put_image(&mut self, image: &ImageRef<'_>, dx: i32, dy: i32) -> Result<(), SurfaceError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.data.len() != expected {
            return Err(SurfaceError::BadImage {
                width: image.width,
                height: image.height,
                expected,
                actual: image.data.len(),
            });
        }

        let Some((x0, x1)) = clip(dx as i64, image.width as i64, self.width as i64) else {
            return Ok(());
        };
        let Some((y0, y1)) = clip(dy as i64, image.height as i64, self.height as i64) else {
            return Ok(());
        };

        let row_bytes = (x1 - x0) * 4;
        for y in y0..y1 {
            let src_x = (x0 as i64 - dx as i64) as usize;
            let src_y = (y as i64 - dy as i64) as usize;
            let src = (src_y * image.width as usize + src_x) * 4;
            let dst = (y * self.width as usize + x0) * 4;
            self.pixels[dst..dst + row_bytes].copy_from_slice(&image.data[src..src + row_bytes]);
        }
        Ok(())
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba) {
        let Some((x0, x1)) = clip(x as i64, width as i64, self.width as i64) else {
            return;
        };
        let Some((y0, y1)) = clip(y as i64, height as i64, self.height as i64) else {
            return;
        };
        for row in y0..y1 {
            let start = (row * self.width as usize + x0) * 4;
            let end = (row * self.width as usize + x1) * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }
}
