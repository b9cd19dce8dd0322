//! Centralized naming for source images and their derived variants.
//!
//! Both the planner (which decides what files must exist on disk) and the
//! markup builder (which references those files from HTML) derive names
//! through this module, so the paths in a `srcset` always match the files
//! the encoder writes.
//!
//! ## Conventions
//!
//! - `hero.png` splits into base `hero` and extension `png`.
//! - A variant of `hero.png` at 640px in WebP is `hero-640.webp`.
//! - Filesystem paths are the plain concatenation `input_dir + image_dir + file`.
//! - Public paths use the site-relative form of `image_dir`: `/img/` and
//!   `./img/` both become `img/`.

use std::path::PathBuf;

/// A source filename split at its last dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName<'a> {
    /// Filename without the extension (`hero` from `hero.png`).
    pub base: &'a str,
    /// Extension as written, without the dot (`png`, `JPG`, ...).
    pub extension: &'a str,
}

/// Split a source filename into base name and extension.
///
/// Returns `None` when there is no extension to infer a format from:
/// - `"hero.png"` → base `hero`, extension `png`
/// - `"my.photo.jpeg"` → base `my.photo`, extension `jpeg`
/// - `"hero"`, `"hero."`, `".png"` → `None`
pub fn split_source(source: &str) -> Option<SourceName<'_>> {
    let (base, extension) = source.rsplit_once('.')?;
    if base.is_empty() || extension.is_empty() {
        return None;
    }
    Some(SourceName { base, extension })
}

/// Filename of one variant: `<base>-<width>.<extension>`.
pub fn variant_filename(base: &str, width: u32, extension: &str) -> String {
    format!("{}-{}.{}", base, width, extension)
}

/// Filesystem location of a file inside the image directory.
///
/// Segments are concatenated verbatim; callers own the trailing separators.
pub fn filesystem_path(input_dir: &str, image_dir: &str, file: &str) -> PathBuf {
    PathBuf::from(format!("{}{}{}", input_dir, image_dir, file))
}

/// Site-relative form of the image directory as it appears in markup.
///
/// Strips one leading `./` and then any leading `/`.
pub fn site_relative_dir(image_dir: &str) -> &str {
    let dir = image_dir.strip_prefix("./").unwrap_or(image_dir);
    dir.trim_start_matches('/')
}

/// Path of a file as referenced from markup.
pub fn public_path(image_dir: &str, file: &str) -> String {
    format!("{}{}", site_relative_dir(image_dir), file)
}
