//! Parameter types for encode operations.
//!
//! These structs describe *what* to produce, not *how*. They are the
//! interface between the planner (which decides which variants must exist)
//! and the [`backend`](super::backend) (which does the pixel work), so a
//! mock encoder can stand in for the real one in tests.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`OutputFormat`]: the two variant formats: JPEG and WebP.
//! - [`EncodeParams`]: full specification for one variant: source, output path, width, format, quality.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Encoded format of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    WebP,
}

impl OutputFormat {
    /// Every variant format, in the order variants are planned.
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Jpeg, OutputFormat::WebP];

    /// File extension used in variant names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::WebP => "webp",
        }
    }

    /// MIME type for `<source type=...>`.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Parameters for encoding one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Target width in pixels; height follows the source aspect ratio.
    pub width: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
