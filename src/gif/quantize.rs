//! Global palette construction for GIF
//!
//! Colors are ranked by how often they occur across every frame. Pixels below
//! the alpha threshold map to a single reserved transparent slot.

use crate::buffer::{Color, PixelBuffer};
use std::collections::HashMap;

/// Pixels with alpha below this are transparent in GIF output.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Maximum entries in a GIF color table.
pub const MAX_PALETTE_SIZE: usize = 256;

/// A palette shared by all frames of one GIF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPalette {
    /// Table entries, padded to a power of two (at least 2).
    entries: Vec<[u8; 3]>,
    /// Number of entries chosen from the image histogram.
    selected: usize,
    transparent_index: Option<u8>,
    lookup: HashMap<[u8; 3], u8>,
}

impl GlobalPalette {
    /// Build a palette over `frames` with at most `max_colors` table entries
    /// (clamped to 2..=256), one of which is reserved when any pixel is
    /// transparent.
    pub fn build(frames: &[PixelBuffer], max_colors: usize) -> Self {
        let max_colors = max_colors.clamp(2, MAX_PALETTE_SIZE);

        // First-seen order plus counts; the stable sort below keeps ties in that order
        let mut histogram: Vec<([u8; 3], u64)> = Vec::new();
        let mut positions: HashMap<[u8; 3], usize> = HashMap::new();
        let mut has_transparency = false;

        for frame in frames {
            for &px in frame.pixels() {
                if px.a < ALPHA_THRESHOLD {
                    has_transparency = true;
                    continue;
                }
                let rgb = px.rgb_triple();
                match positions.get(&rgb) {
                    Some(&pos) => histogram[pos].1 += 1,
                    None => {
                        positions.insert(rgb, histogram.len());
                        histogram.push((rgb, 1));
                    }
                }
            }
        }

        histogram.sort_by(|a, b| b.1.cmp(&a.1));

        let budget = if has_transparency { max_colors - 1 } else { max_colors };
        let mut entries: Vec<[u8; 3]> =
            histogram.iter().take(budget).map(|(rgb, _)| *rgb).collect();
        let selected = entries.len();

        let lookup = entries.iter().enumerate().map(|(i, rgb)| (*rgb, i as u8)).collect();

        let transparent_index = if has_transparency {
            entries.push([0, 0, 0]);
            Some(selected as u8)
        } else {
            None
        };

        let size = entries.len().max(2).next_power_of_two();
        entries.resize(size, [0, 0, 0]);

        Self { entries, selected, transparent_index, lookup }
    }

    /// Table entries, length a power of two in 2..=256.
    pub fn entries(&self) -> &[[u8; 3]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries chosen from the histogram (excludes the transparent slot and padding).
    pub fn selected(&self) -> &[[u8; 3]] {
        &self.entries[..self.selected]
    }

    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent_index
    }

    /// Index for one pixel: transparent slot, exact match, or nearest color.
    pub fn map_pixel(&self, color: Color) -> u8 {
        if color.a < ALPHA_THRESHOLD {
            return self.transparent_index.unwrap_or(0);
        }
        let rgb = color.rgb_triple();
        match self.lookup.get(&rgb) {
            Some(&index) => index,
            None => nearest_index(rgb, self.selected()),
        }
    }

    /// Map every pixel of a frame, row-major.
    pub fn index_frame(&self, frame: &PixelBuffer) -> Vec<u8> {
        frame.pixels().iter().map(|&c| self.map_pixel(c)).collect()
    }

    /// Bits `n` such that the table holds `2^(n+1)` entries, as stored in
    /// the GIF packed fields.
    pub fn size_bits(&self) -> u8 {
        (self.entries.len().trailing_zeros() as u8).saturating_sub(1)
    }
}

/// Index of the closest color by squared RGB distance. First match wins ties.
pub fn nearest_index(rgb: [u8; 3], palette: &[[u8; 3]]) -> u8 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;

    for (i, p) in palette.iter().enumerate() {
        let dist: u32 = rgb
            .iter()
            .zip(p)
            .map(|(&a, &b)| {
                let d = a as i32 - b as i32;
                (d * d) as u32
            })
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }

    best as u8
}
