//! Error types for encoding and decoding

use thiserror::Error;

/// Error produced while decoding a PNG byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stream does not start with the 8-byte PNG signature
    #[error("not a PNG file (invalid signature)")]
    InvalidSignature,
    /// No IHDR chunk was found before the end of the stream
    #[error("no IHDR chunk found")]
    MissingIHDR,
    /// No IDAT chunk was found
    #[error("no IDAT chunks found")]
    MissingIDAT,
    /// IHDR declares a bit depth other than 8
    #[error("unsupported bit depth {0} (only 8-bit is supported)")]
    UnsupportedBitDepth(u8),
    /// IHDR declares Adam7 interlacing
    #[error("interlaced PNGs are not supported")]
    InterlaceUnsupported,
    /// The concatenated IDAT payload is not a valid zlib stream
    #[error("failed to decompress image data: {0}")]
    DecompressionFailed(String),
    /// The decompressed payload is shorter than the scanlines require
    #[error("decompressed data too short: {actual} < {expected}")]
    TruncatedData { expected: usize, actual: usize },
    /// A chunk declares more bytes than the stream holds
    #[error("chunk truncated: needed {needed} bytes, {available} available")]
    TruncatedChunk { needed: usize, available: usize },
    /// A scanline starts with a filter type outside 0..=4
    #[error("unsupported filter type {0}")]
    UnsupportedFilter(u8),
    /// IHDR declares a color type outside {0, 2, 3, 4, 6}
    #[error("unsupported color type {0}")]
    UnsupportedColorType(u8),
    /// IHDR chunk body is shorter than 13 bytes
    #[error("IHDR chunk too short ({0} bytes)")]
    InvalidHeader(usize),
    /// PLTE chunk length is not a multiple of 3
    #[error("invalid PLTE chunk length {0}")]
    InvalidPalette(usize),
    /// IHDR declares a zero width or height
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Error produced while encoding a PNG, APNG or GIF.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// An animation was requested with no frames
    #[error("no frames to encode")]
    EmptyFrameList,
    /// Per-frame delays were given but their count differs from the frame count
    #[error("number of delays ({delays}) must match number of frames ({frames})")]
    DelayCountMismatch { frames: usize, delays: usize },
    /// Width or height is zero
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// Dimensions exceed what the target format can store
    #[error("image dimensions {width}x{height} exceed the format limit of {limit}")]
    DimensionsTooLarge { width: u32, height: u32, limit: u32 },
}

/// Validate per-frame delays against the frame count, filling in defaults.
pub(crate) fn resolve_delays<T: Copy>(
    frame_count: usize,
    delays: Option<&[T]>,
    default: T,
) -> Result<Vec<T>, EncodeError> {
    if frame_count == 0 {
        return Err(EncodeError::EmptyFrameList);
    }
    match delays {
        None => Ok(vec![default; frame_count]),
        Some(d) if d.len() != frame_count => {
            Err(EncodeError::DelayCountMismatch { frames: frame_count, delays: d.len() })
        }
        Some(d) => Ok(d.to_vec()),
    }
}
