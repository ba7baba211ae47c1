//! Configuration schema types for `bitsy.toml`
//!
//! Defines codec defaults and the validation rules applied when loading them.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// PNG encoder settings
    #[serde(default)]
    pub png: PngConfig,
    /// GIF encoder settings
    #[serde(default)]
    pub gif: GifConfig,
    /// APNG encoder settings
    #[serde(default)]
    pub apng: ApngConfig,
}

/// PNG encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PngConfig {
    /// Deflate level, 0-10
    #[serde(default = "default_compression")]
    pub compression: u8,
    /// Pick a scanline filter per row instead of always using None
    #[serde(default)]
    pub adaptive_filter: bool,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self { compression: default_compression(), adaptive_filter: false }
    }
}

fn default_compression() -> u8 {
    9
}

/// GIF encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GifConfig {
    /// Frame delay in centiseconds when none is given
    #[serde(default = "default_gif_delay")]
    pub default_delay: u16,
    /// Palette size cap, 2-256
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    /// Loop count (0 = infinite)
    #[serde(default)]
    pub loop_count: u16,
}

impl Default for GifConfig {
    fn default() -> Self {
        Self {
            default_delay: default_gif_delay(),
            max_colors: default_max_colors(),
            loop_count: 0,
        }
    }
}

fn default_gif_delay() -> u16 {
    10
}

fn default_max_colors() -> usize {
    256
}

/// APNG encoder settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApngConfig {
    /// Frame delay as `[numerator, denominator]` seconds
    #[serde(default = "default_apng_delay")]
    pub default_delay: [u16; 2],
    /// Loop count (0 = infinite)
    #[serde(default)]
    pub loop_count: u32,
}

impl Default for ApngConfig {
    fn default() -> Self {
        Self { default_delay: default_apng_delay(), loop_count: 0 }
    }
}

fn default_apng_delay() -> [u16; 2] {
    [1, 10]
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Dotted path to the offending field
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl CodecConfig {
    /// Check value ranges. Returns every problem found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.png.compression > 10 {
            errors.push(ConfigValidationError {
                field: "png.compression".to_string(),
                message: format!("must be between 0 and 10, got {}", self.png.compression),
            });
        }

        if self.gif.max_colors < 2 || self.gif.max_colors > 256 {
            errors.push(ConfigValidationError {
                field: "gif.max_colors".to_string(),
                message: format!("must be between 2 and 256, got {}", self.gif.max_colors),
            });
        }

        if self.apng.default_delay[1] == 0 {
            errors.push(ConfigValidationError {
                field: "apng.default_delay".to_string(),
                message: "denominator must be greater than 0".to_string(),
            });
        }

        errors
    }
}
