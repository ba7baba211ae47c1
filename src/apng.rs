//! Animated PNG encoding
//!
//! Frames are written as IDAT (frame 0) and fdAT (frames 1..), each preceded by
//! an fcTL chunk. fcTL and fdAT share one sequence counter starting at 0.

use crate::buffer::PixelBuffer;
use crate::config::ApngConfig;
use crate::error::{resolve_delays, EncodeError};
use crate::png::chunk::{write_chunk, ACTL, FCTL, FDAT, IDAT, IEND, IHDR};
use crate::png::encode::{check_dimensions, ihdr_data};
use crate::png::{PngEncoder, PNG_SIGNATURE};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Frame delay as a fraction of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApngDelay {
    pub num: u16,
    pub den: u16,
}

impl ApngDelay {
    pub const fn new(num: u16, den: u16) -> Self {
        Self { num, den }
    }
}

impl Default for ApngDelay {
    /// 100 ms.
    fn default() -> Self {
        Self { num: 1, den: 10 }
    }
}

impl From<(u16, u16)> for ApngDelay {
    fn from((num, den): (u16, u16)) -> Self {
        Self { num, den }
    }
}

/// `count` delays of `1/fps` seconds each.
pub fn delays_from_fps(fps: u16, count: usize) -> Vec<ApngDelay> {
    vec![ApngDelay::new(1, fps.max(1)); count]
}

/// Assembles animated PNGs.
#[derive(Debug, Clone, Copy)]
pub struct ApngEncoder {
    png: PngEncoder,
    default_delay: ApngDelay,
    loop_count: u32,
}

impl Default for ApngEncoder {
    fn default() -> Self {
        Self { png: PngEncoder::default(), default_delay: ApngDelay::default(), loop_count: 0 }
    }
}

impl ApngEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ApngConfig) -> Self {
        Self::default()
            .with_default_delay(ApngDelay::new(config.default_delay[0], config.default_delay[1]))
            .with_loop_count(config.loop_count)
    }

    /// Deflate settings used for every frame.
    ///
    /// Adaptive filtering is ignored: frames are always written with filter 0.
    pub fn with_png_encoder(mut self, png: PngEncoder) -> Self {
        self.png = png.with_adaptive_filter(false);
        self
    }

    /// Delay used for every frame when none are given.
    pub fn with_default_delay(mut self, delay: ApngDelay) -> Self {
        self.default_delay = delay;
        self
    }

    /// Number of plays; 0 loops forever.
    pub fn with_loop_count(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count;
        self
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Encode frames into a complete APNG byte stream.
    ///
    /// The canvas size is the first frame's; other frames are padded or
    /// cropped to it from the top-left corner.
    pub fn encode(
        &self,
        frames: &[PixelBuffer],
        delays: Option<&[ApngDelay]>,
    ) -> Result<Vec<u8>, EncodeError> {
        let delays = resolve_delays(frames.len(), delays, self.default_delay)?;
        let (width, height) = frames[0].dimensions();
        check_dimensions(width, height)?;

        // Frame compression is independent; collect() keeps input order
        let png = self.png.with_adaptive_filter(false);
        let compressed: Vec<Vec<u8>> = frames
            .par_iter()
            .enumerate()
            .map(|(i, frame)| {
                if frame.dimensions() == (width, height) {
                    png.compress_image(frame)
                } else {
                    warn!(
                        frame = i,
                        frame_width = frame.width(),
                        frame_height = frame.height(),
                        width,
                        height,
                        "frame size differs from canvas, padding/cropping"
                    );
                    png.compress_image(&frame.padded_to(width, height))
                }
            })
            .collect();

        let mut out = Vec::new();
        out.extend_from_slice(&PNG_SIGNATURE);
        write_chunk(&mut out, &IHDR, &ihdr_data(width, height));
        write_chunk(&mut out, &ACTL, &actl_data(frames.len() as u32, self.loop_count));

        let mut sequence = 0u32;
        for (i, (data, delay)) in compressed.iter().zip(&delays).enumerate() {
            write_chunk(&mut out, &FCTL, &fctl_data(sequence, width, height, *delay));
            sequence += 1;

            if i == 0 {
                write_chunk(&mut out, &IDAT, data);
            } else {
                let mut fdat = Vec::with_capacity(4 + data.len());
                fdat.extend_from_slice(&sequence.to_be_bytes());
                fdat.extend_from_slice(data);
                write_chunk(&mut out, &FDAT, &fdat);
                sequence += 1;
            }
            debug!(frame = i, bytes = data.len(), "encoded APNG frame");
        }

        write_chunk(&mut out, &IEND, &[]);
        Ok(out)
    }
}

fn actl_data(num_frames: u32, loop_count: u32) -> [u8; 8] {
    let mut data = [0u8; 8];
    data[0..4].copy_from_slice(&num_frames.to_be_bytes());
    data[4..8].copy_from_slice(&loop_count.to_be_bytes());
    data
}

/// 26-byte fcTL body. Offsets are 0, dispose op none, blend op source.
fn fctl_data(sequence: u32, width: u32, height: u32, delay: ApngDelay) -> [u8; 26] {
    let mut data = [0u8; 26];
    data[0..4].copy_from_slice(&sequence.to_be_bytes());
    data[4..8].copy_from_slice(&width.to_be_bytes());
    data[8..12].copy_from_slice(&height.to_be_bytes());
    // x_offset, y_offset stay 0
    data[20..22].copy_from_slice(&delay.num.to_be_bytes());
    data[22..24].copy_from_slice(&delay.den.to_be_bytes());
    data[24] = 0;
    data[25] = 0;
    data
}

/// Encode frames with default settings.
pub fn apng_bytes(
    frames: &[PixelBuffer],
    delays: Option<&[ApngDelay]>,
    loop_count: u32,
) -> Result<Vec<u8>, EncodeError> {
    ApngEncoder::default().with_loop_count(loop_count).encode(frames, delays)
}

/// Encode frames at a constant frame rate.
pub fn apng_bytes_at_fps(
    frames: &[PixelBuffer],
    fps: u16,
    loop_count: u32,
) -> Result<Vec<u8>, EncodeError> {
    let delays = delays_from_fps(fps, frames.len());
    apng_bytes(frames, Some(&delays[..]), loop_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Color;
    use crate::png::chunk::{be_u32, ChunkReader};

    fn frame(color: Color) -> PixelBuffer {
        PixelBuffer::filled(2, 2, color)
    }

    fn chunks(bytes: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
        let mut reader = ChunkReader::new(bytes, PNG_SIGNATURE.len());
        let mut out = Vec::new();
        while let Some(chunk) = reader.read_chunk().unwrap() {
            out.push((chunk.chunk_type, chunk.data.to_vec()));
        }
        out
    }

    #[test]
    fn test_chunk_order() {
        let frames = vec![frame(Color::rgb(255, 0, 0)), frame(Color::rgb(0, 255, 0))];
        let bytes = apng_bytes(&frames, None, 0).unwrap();
        let types: Vec<[u8; 4]> = chunks(&bytes).into_iter().map(|(t, _)| t).collect();
        assert_eq!(types, vec![IHDR, ACTL, FCTL, IDAT, FCTL, FDAT, IEND]);
    }

    #[test]
    fn test_actl_and_sequence_numbers() {
        let frames: Vec<_> = (0..4).map(|i| frame(Color::rgb(i * 60, 0, 0))).collect();
        let bytes = apng_bytes(&frames, None, 3).unwrap();
        let chunks = chunks(&bytes);

        let actl = &chunks[1].1;
        assert_eq!(be_u32(&actl[0..4]), 4);
        assert_eq!(be_u32(&actl[4..8]), 3);

        let sequence: Vec<u32> = chunks
            .iter()
            .filter(|(t, _)| *t == FCTL || *t == FDAT)
            .map(|(_, d)| be_u32(&d[0..4]))
            .collect();
        assert_eq!(sequence, (0..7).collect::<Vec<u32>>());
    }

    #[test]
    fn test_fctl_layout() {
        let delays = [ApngDelay::new(3, 100)];
        let bytes = apng_bytes(&[frame(Color::BLACK)], Some(&delays[..]), 0).unwrap();
        let (_, fctl) = chunks(&bytes).into_iter().find(|(t, _)| *t == FCTL).unwrap();

        assert_eq!(fctl.len(), 26);
        assert_eq!(be_u32(&fctl[4..8]), 2);
        assert_eq!(be_u32(&fctl[8..12]), 2);
        assert_eq!(be_u32(&fctl[12..16]), 0);
        assert_eq!(be_u32(&fctl[16..20]), 0);
        assert_eq!(&fctl[20..24], &[0, 3, 0, 100]);
        assert_eq!(&fctl[24..26], &[0, 0]);
    }

    #[test]
    fn test_default_delay_is_100ms() {
        let bytes = apng_bytes(&[frame(Color::BLACK)], None, 0).unwrap();
        let (_, fctl) = chunks(&bytes).into_iter().find(|(t, _)| *t == FCTL).unwrap();
        assert_eq!(&fctl[20..24], &[0, 1, 0, 10]);
    }

    #[test]
    fn test_empty_frames() {
        assert_eq!(apng_bytes(&[], None, 0).unwrap_err(), EncodeError::EmptyFrameList);
    }

    #[test]
    fn test_delay_count_mismatch() {
        let frames = vec![frame(Color::BLACK), frame(Color::BLACK)];
        let delays = [ApngDelay::default()];
        assert_eq!(
            apng_bytes(&frames, Some(&delays[..]), 0).unwrap_err(),
            EncodeError::DelayCountMismatch { frames: 2, delays: 1 }
        );
    }

    #[test]
    fn test_mismatched_frame_is_padded() {
        let frames = vec![frame(Color::BLACK), PixelBuffer::filled(1, 3, Color::rgb(9, 9, 9))];
        let bytes = apng_bytes(&frames, None, 0).unwrap();
        let chunks = chunks(&bytes);

        let fdat = &chunks.iter().find(|(t, _)| *t == FDAT).unwrap().1;
        let raw = miniz_oxide::inflate::decompress_to_vec_zlib(&fdat[4..]).unwrap();
        // two rows of 2 RGBA pixels, each prefixed with filter byte 0
        assert_eq!(raw, vec![0, 9, 9, 9, 255, 0, 0, 0, 0, 0, 9, 9, 9, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_first_frame_decodes_as_png() {
        let frames = vec![frame(Color::new(1, 2, 3, 4)), frame(Color::BLACK)];
        let bytes = apng_bytes(&frames, None, 0).unwrap();
        let decoded = crate::png::decode_png(&bytes).unwrap();
        assert_eq!(decoded, frames[0]);
    }

    #[test]
    fn test_apng_bytes_at_fps() {
        let frames = vec![frame(Color::BLACK); 2];
        let bytes = apng_bytes_at_fps(&frames, 24, 0).unwrap();
        let fctl: Vec<_> = chunks(&bytes).into_iter().filter(|(t, _)| *t == FCTL).collect();
        assert_eq!(fctl.len(), 2);
        assert!(fctl.iter().all(|(_, d)| d[20..24] == [0, 1, 0, 24]));
    }

    #[test]
    fn test_deterministic() {
        let frames = vec![frame(Color::rgb(5, 6, 7)), frame(Color::TRANSPARENT)];
        assert_eq!(apng_bytes(&frames, None, 0).unwrap(), apng_bytes(&frames, None, 0).unwrap());
    }
}
