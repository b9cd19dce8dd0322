//! Production encoder. Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` (container) + `rav1d` (AV1 decode), see [`super::avif`] |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy at the requested quality) |
//! | Write | temp file in the target directory, renamed into place on success |

use super::avif::{decode_avif, is_avif};
use super::backend::{EncodeError, EncodedVariant, ImageEncoder};
use super::calculations::calculate_scaled_height;
use super::params::{EncodeParams, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Encoder built on the `image` and `webp` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode a source image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, EncodeError> {
    if is_avif(path) {
        return decode_avif(path);
    }
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| match e {
            image::ImageError::Unsupported(u) => {
                EncodeError::UnsupportedSource(format!("{}: {}", path.display(), u))
            }
            e => EncodeError::Decode(format!("{}: {}", path.display(), e)),
        })
}

/// Encode `img` in the requested format, entirely in memory.
fn encode_bytes(
    img: &DynamicImage,
    format: OutputFormat,
    quality: u32,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let mut bytes = Vec::new();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, quality as u8))
                .map_err(|e| EncodeError::Encode(format!("{} encode failed: {}", format, e)))?;
            Ok(bytes)
        }
        OutputFormat::WebP => {
            // libwebp accepts only 8-bit RGB/RGBA buffers
            let pixels = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            let encoder = webp::Encoder::from_image(&pixels)
                .map_err(|e| EncodeError::Encode(format!("{} encode failed: {}", format, e)))?;
            let memory = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| EncodeError::Encode(format!("{} encode failed: {:?}", format, e)))?;
            Ok(memory.to_vec())
        }
    }
}

/// Write `bytes` to `path` via a temp file in the same directory.
///
/// The target only ever appears complete; on any error nothing is left at
/// `path`.
fn write_variant(path: &Path, bytes: &[u8]) -> Result<(), EncodeError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl ImageEncoder for RustEncoder {
    fn encode(&self, params: &EncodeParams) -> Result<EncodedVariant, EncodeError> {
        let img = load_image(&params.source)?;
        let height = calculate_scaled_height((img.width(), img.height()), params.width);
        let resized = img.resize_exact(params.width, height, FilterType::Lanczos3);
        let bytes = encode_bytes(&resized, params.format, params.quality.value())?;
        write_variant(&params.output, &bytes)?;
        Ok(EncodedVariant {
            output: params.output.clone(),
            byte_size: bytes.len() as u64,
        })
    }
}
