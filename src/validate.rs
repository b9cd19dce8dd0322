//! Request validation.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. required fields present (`source`, `alt`, `image_dir`, `widths`, `sizes`)
//! 2. source extension supported (`png`, `jpg`, `jpeg`, `webp`, `avif`)
//! 3. widths non-zero, at least two distinct values
//! 4. quality within 1–100
//! 5. fallback width, if given, is one of the widths
//! 6. source file exists under `input_dir + image_dir`
//!
//! Only the last step touches the [`FileStore`], so a malformed request is
//! rejected without any filesystem access.

use crate::imaging::Quality;
use crate::naming;
use crate::request::{ImageRequest, SourceFormat, ValidatedRequest};
use crate::store::FileStore;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unsupported source format for {file}: expected png, jpg, jpeg, webp or avif")]
    UnsupportedFormat { file: String },
    #[error("Widths must be positive integers")]
    ZeroWidth,
    #[error("At least 2 distinct widths are required, got {0}")]
    InsufficientWidths(usize),
    #[error("Quality must be 1-100, got {0}")]
    QualityOutOfRange(u32),
    #[error("Fallback width {0} is not one of the requested widths")]
    UnknownFallbackWidth(u32),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

fn required<T: Clone>(value: &Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.clone().ok_or(ValidationError::MissingField(field))
}

/// Validate and normalize a request.
pub fn validate(
    request: &ImageRequest,
    store: &impl FileStore,
) -> Result<ValidatedRequest, ValidationError> {
    let source = required(&request.source, "source")?;
    let alt = required(&request.alt, "alt")?;
    let image_dir = required(&request.image_dir, "image_dir")?;
    let mut widths = required(&request.widths, "widths")?;
    let sizes = required(&request.sizes, "sizes")?;

    let (base_name, format) = naming::split_source(&source)
        .and_then(|name| {
            SourceFormat::from_extension(name.extension).map(|f| (name.base.to_string(), f))
        })
        .ok_or_else(|| ValidationError::UnsupportedFormat {
            file: source.clone(),
        })?;

    if widths.contains(&0) {
        return Err(ValidationError::ZeroWidth);
    }
    widths.sort_unstable();
    let mut distinct = widths.clone();
    distinct.dedup();
    if distinct.len() < 2 {
        return Err(ValidationError::InsufficientWidths(distinct.len()));
    }

    let quality = match request.quality {
        Some(q) if !(1..=100).contains(&q) => return Err(ValidationError::QualityOutOfRange(q)),
        Some(q) => Quality::new(q),
        None => Quality::default(),
    };

    if let Some(fallback) = request.fallback_src_width
        && !widths.contains(&fallback)
    {
        return Err(ValidationError::UnknownFallbackWidth(fallback));
    }

    let validated = ValidatedRequest {
        source,
        base_name,
        format,
        alt,
        class: request.class.clone(),
        id: request.id.clone(),
        display_width: request.width,
        display_height: request.height,
        sizes,
        input_dir: request.input_dir.clone().unwrap_or_default(),
        image_dir,
        widths,
        quality,
        overwrite: request.overwrite.unwrap_or(false),
        debug: request.debug.unwrap_or(false),
        fallback_src_width: request.fallback_src_width,
    };

    let source_path = validated.source_path();
    if !store.exists(&source_path) {
        return Err(ValidationError::SourceNotFound(source_path));
    }
    tracing::debug!(source = %source_path.display(), format = ?validated.format, "image can be transformed");
    Ok(validated)
}
