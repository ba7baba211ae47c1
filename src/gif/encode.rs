//! Animated GIF encoder with a single global color table

use super::lzw::{lzw_encode, min_code_size, write_sub_blocks};
use super::quantize::{GlobalPalette, MAX_PALETTE_SIZE};
use super::{GIF_SIGNATURE, TRAILER};
use crate::buffer::PixelBuffer;
use crate::config::GifConfig;
use crate::error::{resolve_delays, EncodeError};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Default frame delay in centiseconds (100 ms).
pub const DEFAULT_DELAY: u16 = 10;

/// Largest width or height a GIF descriptor can hold.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Encodes frames as an animated GIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GifEncoder {
    max_colors: usize,
    default_delay: u16,
    loop_count: u16,
}

impl Default for GifEncoder {
    fn default() -> Self {
        Self { max_colors: MAX_PALETTE_SIZE, default_delay: DEFAULT_DELAY, loop_count: 0 }
    }
}

impl GifEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GifConfig) -> Self {
        Self::default()
            .with_max_colors(config.max_colors)
            .with_default_delay(config.default_delay)
            .with_loop_count(config.loop_count)
    }

    /// Cap on palette entries, clamped to 2..=256.
    pub fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors.clamp(2, MAX_PALETTE_SIZE);
        self
    }

    /// Delay in centiseconds used for every frame when none are given.
    pub fn with_default_delay(mut self, delay: u16) -> Self {
        self.default_delay = delay;
        self
    }

    /// Netscape loop count; 0 loops forever.
    pub fn with_loop_count(mut self, loop_count: u16) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn max_colors(&self) -> usize {
        self.max_colors
    }

    /// Encode frames into a complete GIF89a byte stream.
    ///
    /// `delays` are centiseconds per frame. The logical screen takes the
    /// first frame's size; other frames are padded or cropped to it.
    pub fn encode(
        &self,
        frames: &[PixelBuffer],
        delays: Option<&[u16]>,
    ) -> Result<Vec<u8>, EncodeError> {
        let delays = resolve_delays(frames.len(), delays, self.default_delay)?;
        let (width, height) = frames[0].dimensions();
        check_dimensions(width, height)?;

        let frames: Vec<PixelBuffer> = frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                if frame.dimensions() == (width, height) {
                    frame.clone()
                } else {
                    warn!(
                        frame = i,
                        frame_width = frame.width(),
                        frame_height = frame.height(),
                        width,
                        height,
                        "frame size differs from logical screen, padding/cropping"
                    );
                    frame.padded_to(width, height)
                }
            })
            .collect();

        let palette = GlobalPalette::build(&frames, self.max_colors);
        let code_size = min_code_size(palette.len());
        debug!(
            colors = palette.selected().len(),
            table_size = palette.len(),
            transparent = ?palette.transparent_index(),
            "built global palette"
        );

        // Indexing + LZW per frame is independent; collect() keeps input order
        let image_data: Vec<Vec<u8>> = frames
            .par_iter()
            .map(|frame| lzw_encode(&palette.index_frame(frame), code_size))
            .collect();

        let mut out = Vec::new();
        write_header(&mut out, width as u16, height as u16, &palette);
        write_loop_extension(&mut out, self.loop_count);

        for (i, (data, delay)) in image_data.iter().zip(&delays).enumerate() {
            write_graphics_control(&mut out, *delay, palette.transparent_index());
            write_image_descriptor(&mut out, width as u16, height as u16);
            out.push(code_size);
            write_sub_blocks(&mut out, data);
            debug!(frame = i, bytes = data.len(), delay, "encoded GIF frame");
        }

        out.push(TRAILER);
        Ok(out)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EncodeError::DimensionsTooLarge { width, height, limit: MAX_DIMENSION });
    }
    Ok(())
}

/// Signature, logical screen descriptor and global color table.
fn write_header(out: &mut Vec<u8>, width: u16, height: u16, palette: &GlobalPalette) {
    out.extend_from_slice(GIF_SIGNATURE);

    let bits = palette.size_bits();
    // global table present | color resolution | table size
    let packed = 0x80 | (bits << 4) | bits;
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&[packed, 0, 0]); // packed, background index, aspect

    for rgb in palette.entries() {
        out.extend_from_slice(rgb);
    }
}

/// NETSCAPE2.0 application extension.
///
/// The sub-block is `03 01 <loop u16 LE>`; `01` is the loop sub-block id.
fn write_loop_extension(out: &mut Vec<u8>, loop_count: u16) {
    out.extend_from_slice(&[0x21, 0xFF, 0x0B]);
    out.extend_from_slice(b"NETSCAPE2.0");
    out.extend_from_slice(&[0x03, 0x01]);
    out.extend_from_slice(&loop_count.to_le_bytes());
    out.push(0x00);
}

/// Graphics control extension. Disposal method is left unspecified.
fn write_graphics_control(out: &mut Vec<u8>, delay: u16, transparent: Option<u8>) {
    out.extend_from_slice(&[0x21, 0xF9, 0x04]);
    let (packed, index) = match transparent {
        Some(index) => (0x01, index),
        None => (0x00, 0),
    };
    out.push(packed);
    out.extend_from_slice(&delay.to_le_bytes());
    out.push(index);
    out.push(0x00);
}

/// Image descriptor at (0, 0) with no local color table.
fn write_image_descriptor(out: &mut Vec<u8>, width: u16, height: u16) {
    out.push(0x2C);
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.push(0x00);
}

/// Encode frames with default settings.
pub fn gif_bytes(
    frames: &[PixelBuffer],
    delays: Option<&[u16]>,
    loop_count: u16,
) -> Result<Vec<u8>, EncodeError> {
    GifEncoder::default().with_loop_count(loop_count).encode(frames, delays)
}
