//! Animated GIF encoding
//!
//! One global palette is built across all frames (most frequent colors first,
//! with a reserved slot for transparency), then each frame is indexed and LZW
//! compressed.

pub mod encode;
pub mod lzw;
pub mod quantize;

pub use encode::{gif_bytes, GifEncoder, DEFAULT_DELAY};
pub use quantize::GlobalPalette;

/// GIF89a signature.
pub const GIF_SIGNATURE: &[u8; 6] = b"GIF89a";

/// Byte terminating a GIF stream.
pub const TRAILER: u8 = 0x3B;
