//! Frame sequences timed in frames at a fixed rate
//!
//! Durations are counted in ticks of `fps`. They are converted to GIF
//! centiseconds or APNG rational delays when encoding.

use crate::apng::{ApngDelay, ApngEncoder};
use crate::buffer::PixelBuffer;
use crate::error::EncodeError;
use crate::gif::GifEncoder;

/// One frame and how many ticks it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub buffer: PixelBuffer,
    pub duration: u16,
}

/// An ordered frame sequence played at `fps` ticks per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    fps: u16,
    frames: Vec<AnimationFrame>,
}

impl Animation {
    /// Create an empty animation. A zero `fps` is treated as 1.
    pub fn new(fps: u16) -> Self {
        Self { fps: fps.max(1), frames: Vec::new() }
    }

    /// Append a frame lasting `duration` ticks.
    pub fn push(&mut self, buffer: PixelBuffer, duration: u16) {
        self.frames.push(AnimationFrame { buffer, duration });
    }

    /// Builder form of [`Animation::push`].
    pub fn with_frame(mut self, buffer: PixelBuffer, duration: u16) -> Self {
        self.push(buffer, duration);
        self
    }

    pub fn fps(&self) -> u16 {
        self.fps
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total length in ticks.
    pub fn total_duration(&self) -> u32 {
        self.frames.iter().map(|f| u32::from(f.duration)).sum()
    }

    /// Cloned frame buffers in order.
    pub fn buffers(&self) -> Vec<PixelBuffer> {
        self.frames.iter().map(|f| f.buffer.clone()).collect()
    }

    /// Per-frame GIF delays in centiseconds, never below 1.
    pub fn gif_delays(&self) -> Vec<u16> {
        let fps = u32::from(self.fps);
        self.frames
            .iter()
            .map(|f| {
                let centis = u32::from(f.duration) * 100 / fps;
                centis.clamp(1, u32::from(u16::MAX)) as u16
            })
            .collect()
    }

    /// Per-frame APNG delays as `duration / fps` seconds.
    pub fn apng_delays(&self) -> Vec<ApngDelay> {
        self.frames.iter().map(|f| ApngDelay::new(f.duration, self.fps)).collect()
    }

    /// Encode as a GIF with the given encoder's palette and loop settings.
    pub fn to_gif(&self, encoder: &GifEncoder) -> Result<Vec<u8>, EncodeError> {
        encoder.encode(&self.buffers(), Some(&self.gif_delays()[..]))
    }

    /// Encode as an APNG with the given encoder's compression and loop settings.
    pub fn to_apng(&self, encoder: &ApngEncoder) -> Result<Vec<u8>, EncodeError> {
        encoder.encode(&self.buffers(), Some(&self.apng_delays()[..]))
    }
}
