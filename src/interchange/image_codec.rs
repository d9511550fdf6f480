//! PNG encoding of node textures for inline transport
//!
//! Pixel buffers are bottom-up float RGBA. The encoder converts them to 8-bit
//! top-down scanlines and writes a minimal PNG (IHDR, one IDAT at maximum
//! compression with the "none" filter on every row, IEND), then wraps it in a
//! base64 data URI.

use crate::constants::image::DATA_URI_PREFIX;
use crate::error::{Error, Result};
use crate::nodes::{NodeImage, PixelBuffer};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// PNG bytes of one texture with its declared color space
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub png: Vec<u8>,
    pub color_space: String,
}

impl EncodedImage {
    /// Transport form: `data:image/png;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, BASE64.encode(&self.png))
    }
}

/// Encoder invoked by the package assembler for every image-bearing node
pub trait TextureEncoder {
    fn encode(&self, image: &NodeImage) -> Result<EncodedImage>;
}

/// Default encoder producing PNG payloads
#[derive(Debug, Default, Clone, Copy)]
pub struct PngTextureEncoder;

impl TextureEncoder for PngTextureEncoder {
    fn encode(&self, image: &NodeImage) -> Result<EncodedImage> {
        encode(&image.buffer, &image.color_space)
    }
}

/// Encodes a pixel buffer, tagging the result with `color_space`
pub fn encode(buffer: &PixelBuffer, color_space: &str) -> Result<EncodedImage> {
    Ok(EncodedImage {
        png: encode_png(buffer)?,
        color_space: color_space.to_string(),
    })
}

/// Encodes a pixel buffer as PNG bytes
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    let rgba = to_rgba8_top_down(buffer)?;
    let mut png = Vec::new();
    PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::NoFilter)
        .write_image(&rgba, buffer.width, buffer.height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::validation(format!("PNG encoding failed: {}", e)))?;
    Ok(png)
}

fn to_channel(sample: f32) -> u8 {
    // NaN saturates to 0 in the cast
    (sample * 255.0).round().clamp(0.0, 255.0) as u8
}

/// 8-bit RGBA rows, first row at the top of the image
fn to_rgba8_top_down(buffer: &PixelBuffer) -> Result<Vec<u8>> {
    buffer.validate()?;
    let row_len = buffer.width as usize * 4;
    let mut out = Vec::with_capacity(buffer.expected_len());
    for row in buffer.pixels.chunks_exact(row_len).rev() {
        out.extend(row.iter().map(|&s| to_channel(s)));
    }
    Ok(out)
}

/// Decodes a PNG data URI back into a bottom-up float pixel buffer
pub fn decode_data_uri(uri: &str) -> Result<PixelBuffer> {
    let payload = uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| Error::validation("image data is not a PNG data URI"))?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| Error::validation(format!("invalid base64 image data: {}", e)))?;
    decode_png(&bytes)
}

/// Decodes PNG bytes into a bottom-up float pixel buffer
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| Error::validation(format!("invalid PNG data: {}", e)))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    let row_len = width as usize * 4;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in decoded.as_raw().chunks_exact(row_len).rev() {
        pixels.extend(row.iter().map(|&b| b as f32 / 255.0));
    }
    PixelBuffer::new(width, height, pixels)
}
