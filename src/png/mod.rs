//! PNG encoding and decoding
//!
//! The encoder always writes 8-bit RGBA with a single IDAT chunk. The decoder
//! accepts any 8-bit, non-interlaced PNG: grayscale, RGB, indexed (with
//! optional tRNS), grayscale+alpha and RGBA, using all five scanline filters.

pub mod chunk;
pub mod decode;
pub mod encode;
pub mod filter;

use crate::error::DecodeError;

pub use decode::{decode_png, read_png_info, PngInfo};
pub use encode::{png_bytes, PngEncoder};

/// The 8-byte signature every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// PNG color types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorType {
    Grayscale = 0,
    Rgb = 2,
    Indexed = 3,
    GrayscaleAlpha = 4,
    Rgba = 6,
}

impl ColorType {
    pub fn from_byte(byte: u8) -> Result<Self, DecodeError> {
        match byte {
            0 => Ok(ColorType::Grayscale),
            2 => Ok(ColorType::Rgb),
            3 => Ok(ColorType::Indexed),
            4 => Ok(ColorType::GrayscaleAlpha),
            6 => Ok(ColorType::Rgba),
            other => Err(DecodeError::UnsupportedColorType(other)),
        }
    }

    /// Samples per pixel, which at 8-bit depth is also bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorType::Grayscale | ColorType::Indexed => 1,
            ColorType::GrayscaleAlpha => 2,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel_by_color_type() {
        assert_eq!(ColorType::Grayscale.channels(), 1);
        assert_eq!(ColorType::Rgb.channels(), 3);
        assert_eq!(ColorType::Indexed.channels(), 1);
        assert_eq!(ColorType::GrayscaleAlpha.channels(), 2);
        assert_eq!(ColorType::Rgba.channels(), 4);
    }

    #[test]
    fn test_color_type_from_byte() {
        assert_eq!(ColorType::from_byte(6).unwrap(), ColorType::Rgba);
        assert_eq!(ColorType::from_byte(1).unwrap_err(), DecodeError::UnsupportedColorType(1));
    }
}
