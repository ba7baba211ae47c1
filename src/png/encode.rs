//! PNG encoder (RGBA, 8-bit, single IDAT)

use super::chunk::{write_chunk, IDAT, IEND, IHDR};
use super::filter::{apply_adaptive, FilterType};
use super::{ColorType, PNG_SIGNATURE};
use crate::buffer::PixelBuffer;
use crate::config::PngConfig;
use crate::error::EncodeError;

/// Largest width or height a PNG header may declare.
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Highest deflate level accepted by the compressor.
pub const MAX_COMPRESSION: u8 = 10;

/// Encodes a [`PixelBuffer`] as an RGBA PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngEncoder {
    compression: u8,
    adaptive_filter: bool,
}

impl Default for PngEncoder {
    fn default() -> Self {
        Self { compression: 9, adaptive_filter: false }
    }
}

impl PngEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PngConfig) -> Self {
        Self::default()
            .with_compression(config.compression)
            .with_adaptive_filter(config.adaptive_filter)
    }

    /// Set the deflate level (clamped to 0..=10).
    pub fn with_compression(mut self, level: u8) -> Self {
        self.compression = level.min(MAX_COMPRESSION);
        self
    }

    /// Choose a filter per scanline instead of always using filter type 0.
    pub fn with_adaptive_filter(mut self, enabled: bool) -> Self {
        self.adaptive_filter = enabled;
        self
    }

    pub fn compression(&self) -> u8 {
        self.compression
    }

    /// Encode a buffer to a complete PNG byte stream.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
        check_dimensions(buffer.width(), buffer.height())?;

        let mut out = Vec::new();
        out.extend_from_slice(&PNG_SIGNATURE);
        write_chunk(&mut out, &IHDR, &ihdr_data(buffer.width(), buffer.height()));
        write_chunk(&mut out, &IDAT, &self.compress_image(buffer));
        write_chunk(&mut out, &IEND, &[]);
        Ok(out)
    }

    /// Filtered, zlib-compressed scanlines for one image.
    pub(crate) fn compress_image(&self, buffer: &PixelBuffer) -> Vec<u8> {
        let raw = if self.adaptive_filter {
            adaptive_scanlines(buffer)
        } else {
            raw_scanlines(buffer)
        };
        miniz_oxide::deflate::compress_to_vec_zlib(&raw, self.compression)
    }
}

/// Reject dimensions a PNG header can't carry.
pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EncodeError::DimensionsTooLarge { width, height, limit: MAX_DIMENSION });
    }
    Ok(())
}

/// 13-byte IHDR body for an 8-bit RGBA, non-interlaced image.
pub(crate) fn ihdr_data(width: u32, height: u32) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = ColorType::Rgba as u8;
    data[10] = 0; // compression
    data[11] = 0; // filter method
    data[12] = 0; // interlace
    data
}

/// Every row prefixed with filter type 0.
pub(crate) fn raw_scanlines(buffer: &PixelBuffer) -> Vec<u8> {
    let row_bytes = buffer.width() as usize * 4;
    let mut raw = Vec::with_capacity(buffer.height() as usize * (row_bytes + 1));
    for row in buffer.rows().take(buffer.height() as usize) {
        raw.push(FilterType::None as u8);
        for c in row {
            raw.extend_from_slice(&c.to_array());
        }
    }
    raw
}

fn adaptive_scanlines(buffer: &PixelBuffer) -> Vec<u8> {
    let row_bytes = buffer.width() as usize * 4;
    let mut raw = Vec::with_capacity(buffer.height() as usize * (row_bytes + 1));
    let mut prev: Option<Vec<u8>> = None;

    for row in buffer.rows().take(buffer.height() as usize) {
        let current: Vec<u8> = row.iter().flat_map(|c| c.to_array()).collect();
        let (filter, filtered) = apply_adaptive(&current, prev.as_deref(), 4);
        raw.push(filter as u8);
        raw.extend_from_slice(&filtered);
        prev = Some(current);
    }
    raw
}

/// Encode a buffer with default settings (filter 0, best compression).
pub fn png_bytes(buffer: &PixelBuffer) -> Result<Vec<u8>, EncodeError> {
    PngEncoder::default().encode(buffer)
}
