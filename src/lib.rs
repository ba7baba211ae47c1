//! Bitsy Codec - Raster image and animation codecs for pixel art
//!
//! This library provides:
//! - PNG encoding and decoding (all five scanline filters, every 8-bit color type)
//! - Animated GIF encoding with a shared global palette and LZW compression
//! - APNG encoding with per-frame timing
//! - Inspection helpers and atomic file output

pub mod animation;
pub mod apng;
pub mod buffer;
pub mod config;
pub mod error;
pub mod gif;
pub mod inspect;
pub mod output;
pub mod png;

pub use animation::Animation;
pub use apng::{apng_bytes, apng_bytes_at_fps, ApngDelay, ApngEncoder};
pub use buffer::{Color, PixelBuffer};
pub use error::{DecodeError, EncodeError};
pub use gif::{gif_bytes, GifEncoder};
pub use png::{decode_png, png_bytes, read_png_info, PngEncoder, PngInfo};
