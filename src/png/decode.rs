//! PNG decoder for 8-bit, non-interlaced images of every color type

use super::chunk::{be_u32, Chunk, ChunkReader, IDAT, IEND, IHDR, PLTE, TRNS};
use super::filter::reconstruct;
use super::{ColorType, PNG_SIGNATURE};
use crate::buffer::{Color, PixelBuffer};
use crate::error::DecodeError;
use tracing::{debug, warn};

/// Image metadata from the IHDR chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: ColorType,
    pub compression: u8,
    pub filter_method: u8,
    pub interlace: u8,
}

impl PngInfo {
    /// Parse a 13-byte IHDR body.
    pub fn from_ihdr(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < 13 {
            return Err(DecodeError::InvalidHeader(data.len()));
        }
        Ok(Self {
            width: be_u32(&data[0..4]),
            height: be_u32(&data[4..8]),
            bit_depth: data[8],
            color_type: ColorType::from_byte(data[9])?,
            compression: data[10],
            filter_method: data[11],
            interlace: data[12],
        })
    }

    /// Bytes per complete pixel. Only 8-bit depth is supported.
    pub fn bytes_per_pixel(&self) -> usize {
        self.color_type.channels()
    }

    /// Bytes in one unfiltered scanline, excluding the filter byte.
    ///
    /// `None` when the width is too large to address.
    pub fn scanline_bytes(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.bytes_per_pixel())
    }

    /// Bytes of filtered image data the IHDR calls for, filter bytes included.
    pub fn filtered_data_len(&self) -> Option<usize> {
        let stride = self.scanline_bytes()?.checked_add(1)?;
        (self.height as usize).checked_mul(stride)
    }
}

/// Read signature + IHDR only. Image data need not be present.
pub fn read_png_info(bytes: &[u8]) -> Result<PngInfo, DecodeError> {
    check_signature(bytes)?;
    let mut reader = ChunkReader::new(bytes, PNG_SIGNATURE.len());
    match reader.read_chunk()? {
        Some(Chunk { chunk_type: IHDR, data }) => PngInfo::from_ihdr(data),
        _ => Err(DecodeError::MissingIHDR),
    }
}

fn check_signature(bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() < PNG_SIGNATURE.len() || bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(DecodeError::InvalidSignature);
    }
    Ok(())
}

/// PLTE triples as opaque colors.
fn parse_palette(data: &[u8]) -> Result<Vec<Color>, DecodeError> {
    if data.len() % 3 != 0 {
        return Err(DecodeError::InvalidPalette(data.len()));
    }
    Ok(data.chunks_exact(3).map(|c| Color::rgb(c[0], c[1], c[2])).collect())
}

/// Decode a PNG byte stream into an RGBA buffer.
pub fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    check_signature(bytes)?;

    let mut reader = ChunkReader::new(bytes, PNG_SIGNATURE.len());
    let mut info: Option<PngInfo> = None;
    let mut palette: Option<Vec<Color>> = None;
    let mut compressed = Vec::new();
    let mut idat_count = 0usize;

    loop {
        let chunk = match reader.read_chunk() {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                // A damaged tail still leaves usable data in front of it
                warn!(error = %e, "stopping at truncated chunk");
                break;
            }
        };

        match chunk.chunk_type {
            IHDR => info = Some(PngInfo::from_ihdr(chunk.data)?),
            PLTE => {
                if info.is_some() {
                    palette = Some(parse_palette(chunk.data)?);
                }
            }
            TRNS => {
                if let (Some(i), Some(pal)) = (&info, palette.as_mut()) {
                    if i.color_type == ColorType::Indexed {
                        for (entry, &alpha) in pal.iter_mut().zip(chunk.data) {
                            entry.a = alpha;
                        }
                    }
                }
            }
            IDAT => {
                compressed.extend_from_slice(chunk.data);
                idat_count += 1;
            }
            IEND => break,
            _ => {}
        }
    }

    let info = info.ok_or(DecodeError::MissingIHDR)?;
    if idat_count == 0 {
        return Err(DecodeError::MissingIDAT);
    }
    if info.bit_depth != 8 {
        return Err(DecodeError::UnsupportedBitDepth(info.bit_depth));
    }
    if info.interlace != 0 {
        return Err(DecodeError::InterlaceUnsupported);
    }
    if info.width == 0 || info.height == 0 {
        return Err(DecodeError::InvalidDimensions { width: info.width, height: info.height });
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec_zlib(&compressed)
        .map_err(|e| DecodeError::DecompressionFailed(format!("{:?}", e.status)))?;

    debug!(
        width = info.width,
        height = info.height,
        color_type = ?info.color_type,
        idat_count,
        "decoding PNG"
    );

    let raw = unfilter_scanlines(&decompressed, &info)?;
    let pixels = to_rgba(&raw, &info, palette.as_deref());

    PixelBuffer::from_pixels(info.width, info.height, pixels)
        .ok_or(DecodeError::InvalidDimensions { width: info.width, height: info.height })
}

/// Strip filter bytes and reconstruct every scanline.
fn unfilter_scanlines(data: &[u8], info: &PngInfo) -> Result<Vec<u8>, DecodeError> {
    let bpp = info.bytes_per_pixel();
    let too_large = DecodeError::InvalidDimensions { width: info.width, height: info.height };
    let stride = info.scanline_bytes().ok_or(too_large.clone())?;
    let expected = info.filtered_data_len().ok_or(too_large)?;
    let height = info.height as usize;

    if data.len() < expected {
        return Err(DecodeError::TruncatedData { expected, actual: data.len() });
    }

    let mut raw = Vec::with_capacity(height * stride);
    let mut prev_start: Option<usize> = None;

    for y in 0..height {
        let offset = y * (1 + stride);
        let filter = data[offset];
        let scanline = &data[offset + 1..offset + 1 + stride];

        let prev = prev_start.map(|start| &raw[start..start + stride]);
        let row = reconstruct(filter, scanline, prev, bpp)?;

        prev_start = Some(raw.len());
        raw.extend_from_slice(&row);
    }

    Ok(raw)
}

/// Expand reconstructed bytes into RGBA colors according to the color type.
fn to_rgba(raw: &[u8], info: &PngInfo, palette: Option<&[Color]>) -> Vec<Color> {
    let bpp = info.bytes_per_pixel();
    raw.chunks_exact(bpp)
        .map(|p| match info.color_type {
            ColorType::Grayscale => Color::rgb(p[0], p[0], p[0]),
            ColorType::Rgb => Color::rgb(p[0], p[1], p[2]),
            ColorType::Indexed => palette
                .and_then(|pal| pal.get(p[0] as usize).copied())
                .unwrap_or(Color::BLACK),
            ColorType::GrayscaleAlpha => Color::new(p[0], p[0], p[0], p[1]),
            ColorType::Rgba => Color::new(p[0], p[1], p[2], p[3]),
        })
        .collect()
}
