//! Read-only inspection of decoded pixel buffers

use crate::buffer::{Color, PixelBuffer};
use std::collections::{BTreeSet, HashSet};

/// Tight bounds of the non-transparent pixels of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Unique colors in the buffer, sorted, at most `max_colors` of them.
///
/// Collection stops once `max_colors` distinct colors have been seen, so the
/// result is the sorted set of the first colors encountered in row-major order.
pub fn extract_palette(buffer: &PixelBuffer, max_colors: usize) -> Vec<Color> {
    let mut colors = BTreeSet::new();
    for &px in buffer.pixels() {
        if colors.len() >= max_colors {
            break;
        }
        colors.insert(px);
    }
    colors.into_iter().collect()
}

/// Number of distinct RGBA colors.
pub fn count_colors(buffer: &PixelBuffer) -> usize {
    buffer.pixels().iter().collect::<HashSet<_>>().len()
}

/// Whether any pixel has alpha below 255.
pub fn has_transparency(buffer: &PixelBuffer) -> bool {
    buffer.pixels().iter().any(|c| c.a < 255)
}

/// Bounding box of pixels with non-zero alpha, or `None` if all are transparent.
pub fn get_bounding_box(buffer: &PixelBuffer) -> Option<BoundingBox> {
    let (width, height) = buffer.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x: Option<u32> = None;
    let mut max_y = 0;

    for (y, row) in buffer.rows().take(height as usize).enumerate() {
        for (x, px) in row.iter().enumerate() {
            if px.a > 0 {
                let (x, y) = (x as u32, y as u32);
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = Some(max_x.map_or(x, |m: u32| m.max(x)));
                max_y = max_y.max(y);
            }
        }
    }

    max_x.map(|max_x| BoundingBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}

/// Crop away fully transparent edges.
///
/// An all-transparent buffer trims to a single transparent pixel.
pub fn trim(buffer: &PixelBuffer) -> PixelBuffer {
    match get_bounding_box(buffer) {
        Some(b) => buffer.crop(b.x, b.y, b.width, b.height),
        None => PixelBuffer::new(1, 1),
    }
}
