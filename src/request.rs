//! Request descriptors.
//!
//! An [`ImageRequest`] is what a template hands over for one image reference.
//! Every field is optional at this stage so that a missing value is
//! representable exactly as the caller supplied it; the
//! [`validate`](crate::validate) module turns it into a [`ValidatedRequest`]
//! or rejects it before any file is touched.

use crate::config::RequestDefaults;
use crate::imaging::Quality;
use crate::naming;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw descriptor for one responsive image.
///
/// Required by validation: `source`, `alt`, `image_dir`, `widths`, `sizes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageRequest {
    /// Source filename with extension, relative to the image directory.
    pub source: Option<String>,
    pub alt: Option<String>,
    pub class: Option<String>,
    pub id: Option<String>,
    /// Display width attribute of the `<img>`.
    pub width: Option<u32>,
    /// Display height attribute of the `<img>`.
    pub height: Option<u32>,
    /// `sizes` attribute, echoed verbatim.
    pub sizes: Option<String>,
    /// Site input directory; defaults to `""`.
    pub input_dir: Option<String>,
    pub image_dir: Option<String>,
    /// Variant widths in pixels, any order.
    pub widths: Option<Vec<u32>>,
    pub quality: Option<u32>,
    pub overwrite: Option<bool>,
    /// Log every variant as it is written.
    pub debug: Option<bool>,
    /// Width whose JPEG becomes `<img src>`; defaults to the smallest.
    pub fallback_src_width: Option<u32>,
}

impl ImageRequest {
    /// Fill absent fields from config defaults. Present fields always win.
    pub fn with_defaults(mut self, defaults: &RequestDefaults) -> Self {
        fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(default);
            }
        }
        fill(&mut self.input_dir, &defaults.input_dir);
        fill(&mut self.image_dir, &defaults.image_dir);
        fill(&mut self.widths, &defaults.widths);
        fill(&mut self.sizes, &defaults.sizes);
        fill(&mut self.class, &defaults.class);
        fill(&mut self.quality, &defaults.quality);
        fill(&mut self.overwrite, &defaults.overwrite);
        fill(&mut self.debug, &defaults.debug);
        self
    }
}

/// Source image formats accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
    Avif,
}

impl SourceFormat {
    /// Map a file extension (case-insensitive) to a supported format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(SourceFormat::Png),
            "jpg" | "jpeg" => Some(SourceFormat::Jpeg),
            "webp" => Some(SourceFormat::WebP),
            "avif" => Some(SourceFormat::Avif),
            _ => None,
        }
    }
}

/// A request that passed validation, with widths sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRequest {
    pub source: String,
    pub base_name: String,
    pub format: SourceFormat,
    pub alt: String,
    pub class: Option<String>,
    pub id: Option<String>,
    pub display_width: Option<u32>,
    pub display_height: Option<u32>,
    pub sizes: String,
    pub input_dir: String,
    pub image_dir: String,
    pub widths: Vec<u32>,
    pub quality: Quality,
    pub overwrite: bool,
    pub debug: bool,
    pub fallback_src_width: Option<u32>,
}

impl ValidatedRequest {
    /// Filesystem path of the source image.
    pub fn source_path(&self) -> PathBuf {
        naming::filesystem_path(&self.input_dir, &self.image_dir, &self.source)
    }

    /// Width whose JPEG is used for `<img src>`.
    pub fn fallback_width(&self) -> u32 {
        self.fallback_src_width
            .or_else(|| self.widths.first().copied())
            .unwrap_or_default()
    }
}
