//! Raster images held by image-bearing nodes

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Flat RGBA float pixels, row-major, origin at the bottom-left corner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// Normalized samples, four per pixel
    pub pixels: Vec<f32>,
}

impl PixelBuffer {
    /// Creates a buffer, checking that the sample count matches the dimensions
    pub fn new(width: u32, height: u32, pixels: Vec<f32>) -> Result<Self> {
        let buffer = Self { width, height, pixels };
        buffer.validate()?;
        Ok(buffer)
    }

    /// Creates a buffer where every pixel has the same color
    pub fn filled(width: u32, height: u32, rgba: [f32; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&rgba);
        }
        Self { width, height, pixels }
    }

    /// Number of samples the dimensions call for
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::validation(format!(
                "image dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.pixels.len() != self.expected_len() {
            return Err(Error::validation(format!(
                "pixel buffer holds {} samples but {}x{} RGBA needs {}",
                self.pixels.len(),
                self.width,
                self.height,
                self.expected_len()
            )));
        }
        Ok(())
    }

    /// RGBA of the pixel at (x, y), y counted from the bottom row
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.pixels.get(start..start + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// An image datablock referenced by a texture node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeImage {
    pub name: String,
    /// Declared color space, e.g. "sRGB" or "Non-Color"
    pub color_space: String,
    pub buffer: PixelBuffer,
}

impl NodeImage {
    pub fn new(name: impl Into<String>, color_space: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            color_space: color_space.into(),
            buffer,
        }
    }
}
