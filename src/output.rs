//! File output for encoded images
//!
//! Writes go to a temporary file next to the destination and are then
//! renamed into place, so a failed encode never leaves a partial file.

use crate::animation::Animation;
use crate::apng::{ApngDelay, ApngEncoder};
use crate::buffer::PixelBuffer;
use crate::error::{DecodeError, EncodeError};
use crate::gif::GifEncoder;
use crate::png::{decode_png, read_png_info, PngEncoder, PngInfo};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The file was read but is not a PNG we can decode
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    /// The frames could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
}

/// Write `bytes` to `path`, creating parent directories first.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Whether the path has a `.png` extension (case-insensitive).
pub fn is_png_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Save a buffer as a PNG file with default settings.
pub fn save_png(path: &Path, buffer: &PixelBuffer) -> Result<(), OutputError> {
    save_png_with(path, buffer, &PngEncoder::default())
}

/// Save a buffer as a PNG file using a configured encoder.
pub fn save_png_with(
    path: &Path,
    buffer: &PixelBuffer,
    encoder: &PngEncoder,
) -> Result<(), OutputError> {
    let bytes = encoder.encode(buffer)?;
    write_atomic(path, &bytes)
}

/// Read and decode a PNG file.
pub fn load_png(path: &Path) -> Result<PixelBuffer, OutputError> {
    let bytes = fs::read(path)?;
    Ok(decode_png(&bytes)?)
}

/// Read only the header of a PNG file.
pub fn get_png_info(path: &Path) -> Result<PngInfo, OutputError> {
    let bytes = fs::read(path)?;
    Ok(read_png_info(&bytes)?)
}

/// Save frames as an animated GIF. `delays` are in centiseconds.
pub fn save_gif(
    path: &Path,
    frames: &[PixelBuffer],
    delays: Option<&[u16]>,
    loop_count: u16,
) -> Result<(), OutputError> {
    save_gif_with(path, frames, delays, &GifEncoder::default().with_loop_count(loop_count))
}

/// Save frames as an animated GIF using a configured encoder.
pub fn save_gif_with(
    path: &Path,
    frames: &[PixelBuffer],
    delays: Option<&[u16]>,
    encoder: &GifEncoder,
) -> Result<(), OutputError> {
    let bytes = encoder.encode(frames, delays)?;
    write_atomic(path, &bytes)
}

/// Save frames as an APNG.
pub fn save_apng(
    path: &Path,
    frames: &[PixelBuffer],
    delays: Option<&[ApngDelay]>,
    loop_count: u32,
) -> Result<(), OutputError> {
    save_apng_with(path, frames, delays, &ApngEncoder::default().with_loop_count(loop_count))
}

/// Save frames as an APNG using a configured encoder.
pub fn save_apng_with(
    path: &Path,
    frames: &[PixelBuffer],
    delays: Option<&[ApngDelay]>,
    encoder: &ApngEncoder,
) -> Result<(), OutputError> {
    let bytes = encoder.encode(frames, delays)?;
    write_atomic(path, &bytes)
}

/// Save an [`Animation`] as a GIF, converting tick durations to centiseconds.
pub fn save_gif_from_animation(
    path: &Path,
    animation: &Animation,
    loop_count: u16,
) -> Result<(), OutputError> {
    let bytes = animation.to_gif(&GifEncoder::default().with_loop_count(loop_count))?;
    write_atomic(path, &bytes)
}

/// Save an [`Animation`] as an APNG with `duration / fps` frame delays.
pub fn save_apng_from_animation(
    path: &Path,
    animation: &Animation,
    loop_count: u32,
) -> Result<(), OutputError> {
    let bytes = animation.to_apng(&ApngEncoder::default().with_loop_count(loop_count))?;
    write_atomic(path, &bytes)
}
