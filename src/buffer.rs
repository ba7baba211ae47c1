//! In-memory RGBA8 pixel buffer shared by generators and codecs

use image::{Rgba, RgbaImage};

/// A single RGBA color with 8 bits per channel.
///
/// Ordering is lexicographic over `(r, g, b, a)`, which gives palettes a
/// stable sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    /// Opaque black.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_rgba(rgba: Rgba<u8>) -> Self {
        Self { r: rgba[0], g: rgba[1], b: rgba[2], a: rgba[3] }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// The RGB triple, dropping alpha.
    pub fn rgb_triple(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// A rectangular grid of RGBA pixels stored row-major, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Create a buffer where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self { width, height, pixels: vec![color; width as usize * height as usize] }
    }

    /// Wrap an existing pixel vector.
    ///
    /// Returns `None` unless `pixels.len() == width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Color>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Color> {
        self.pixels
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        // chunks() panics on zero, an empty buffer has no rows anyway
        self.pixels.chunks(self.width.max(1) as usize)
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Set the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    /// Copy a `width`x`height` region starting at `(x, y)` into a new buffer.
    ///
    /// The region is clipped to this buffer's bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> PixelBuffer {
        let mut out = PixelBuffer::new(width, height);
        for dy in 0..height {
            for dx in 0..width {
                if let Some(c) = self.get(x + dx, y + dy) {
                    out.set(dx, dy, c);
                }
            }
        }
        out
    }

    /// Place this buffer at the top-left of a transparent canvas of the
    /// given size, cropping whatever doesn't fit.
    ///
    /// Pixels are copied unchanged, not blended.
    pub fn padded_to(&self, width: u32, height: u32) -> PixelBuffer {
        if self.dimensions() == (width, height) {
            return self.clone();
        }
        self.crop(0, 0, width, height)
    }

    /// Serialize as raw RGBA bytes, row-major.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }
}

impl From<&RgbaImage> for PixelBuffer {
    fn from(image: &RgbaImage) -> Self {
        let pixels = image.pixels().map(|p| Color::from_rgba(*p)).collect();
        Self { width: image.width(), height: image.height(), pixels }
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(image: RgbaImage) -> Self {
        Self::from(&image)
    }
}

impl From<&PixelBuffer> for RgbaImage {
    fn from(buffer: &PixelBuffer) -> Self {
        RgbaImage::from_fn(buffer.width, buffer.height, |x, y| {
            buffer.get(x, y).unwrap_or_default().to_rgba()
        })
    }
}
