//! Tool configuration.
//!
//! Handles loading and validating `respimg.toml`. The file is optional and
//! sparse: any key the user leaves out keeps its stock value.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [defaults]
//! input_dir = ""             # Prefix for every filesystem path
//! # image_dir = "/images/"   # Image directory (no stock default)
//! widths = [320, 640, 1024]  # Variant widths in pixels
//! sizes = "100vw"            # <img sizes> attribute
//! quality = 85               # JPEG and WebP quality (1-100)
//! overwrite = false          # Rebuild complete variant sets
//! debug = false              # Log every written variant
//! # class = "responsive"     # <img class> attribute
//!
//! [processing]
//! max_processes = 4          # Max parallel encoders (omit for auto = CPU cores)
//! ```
//!
//! `[defaults]` only fills request fields the caller left out; an explicit
//! request value always wins (see [`ImageRequest::with_defaults`]).
//!
//! Unknown keys are rejected to catch typos early.
//!
//! [`ImageRequest::with_defaults`]: crate::request::ImageRequest::with_defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `respimg.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RespimgConfig {
    /// Fallback values for request fields.
    pub defaults: RequestDefaults,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl RespimgConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(quality) = self.defaults.quality
            && !(1..=100).contains(&quality)
        {
            return Err(ConfigError::Validation(
                "defaults.quality must be 1-100".into(),
            ));
        }
        if let Some(widths) = &self.defaults.widths {
            if widths.is_empty() {
                return Err(ConfigError::Validation(
                    "defaults.widths must not be empty".into(),
                ));
            }
            if widths.contains(&0) {
                return Err(ConfigError::Validation(
                    "defaults.widths values must be non-zero".into(),
                ));
            }
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Per-request fallbacks. `None` leaves the field to the request alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestDefaults {
    pub input_dir: Option<String>,
    pub image_dir: Option<String>,
    pub widths: Option<Vec<u32>>,
    pub sizes: Option<String>,
    pub class: Option<String>,
    pub quality: Option<u32>,
    pub overwrite: Option<bool>,
    pub debug: Option<bool>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            input_dir: Some(String::new()),
            image_dir: None,
            widths: Some(vec![320, 640, 1024]),
            sizes: Some("100vw".to_string()),
            class: None,
            quality: Some(85),
            overwrite: Some(false),
            debug: Some(false),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encode workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading
// =============================================================================

/// Load config from the given file, falling back to stock defaults when it
/// is absent.
///
/// Keys missing from the file keep their stock value, since every section
/// deserializes with `#[serde(default)]`.
pub fn load_config(path: &Path) -> Result<RespimgConfig, ConfigError> {
    if !path.exists() {
        return Ok(RespimgConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: RespimgConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `respimg.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# respimg configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Request defaults
# ---------------------------------------------------------------------------
# Used for any field a request leaves out. Explicit values always win.
[defaults]
# Prepended to image_dir to locate sources and write variants.
input_dir = ""

# Directory holding the source images and their variants.
# image_dir = "/images/"

# Variant widths in pixels. At least two distinct values.
widths = [320, 640, 1024]

# Value of the sizes attribute on <source> and <img>.
sizes = "100vw"

# Encoder quality for JPEG and WebP variants (1 = worst, 100 = best).
quality = 85

# Rebuild variants even when every one already exists.
overwrite = false

# Log each variant as it is written, with its size.
debug = false

# class attribute for the <img> element.
# class = "responsive"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel encode workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
