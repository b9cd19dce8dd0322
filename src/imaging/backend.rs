//! Image encoder trait and shared types.
//!
//! The [`ImageEncoder`] trait is the single capability the planner needs from
//! an image library: turn a source file into one resized variant on disk and
//! report how large it came out.
//!
//! The production implementation is
//! [`RustEncoder`](super::rust_backend::RustEncoder). Calls are synchronous;
//! the [`process`](crate::process) module runs them as detached tasks so that
//! markup generation never waits on pixels.

use super::params::EncodeParams;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode source: {0}")]
    Decode(String),
    #[error("Failed to encode variant: {0}")]
    Encode(String),
    #[error("Unsupported source format: {0}")]
    UnsupportedSource(String),
    #[error("Encoder panicked: {0}")]
    Panicked(String),
}

/// A variant that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVariant {
    pub output: PathBuf,
    /// Size of the written file in bytes.
    pub byte_size: u64,
}

/// Trait for image encoders.
///
/// Implementations must be shareable across the worker pool: the dispatcher
/// holds one encoder behind an `Arc` and calls it from several threads at
/// once, each call writing a distinct output path.
pub trait ImageEncoder: Send + Sync {
    /// Resize `params.source` to `params.width` and write it to `params.output`.
    fn encode(&self, params: &EncodeParams) -> Result<EncodedVariant, EncodeError>;
}
