//! Image encoding, statically linked, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** (JPEG, PNG, WebP) | `image::ImageReader` |
//! | **Decode** (AVIF) | `avif-parse` + `rav1d` |
//! | **Resize** | Lanczos3, width-targeted, aspect preserved |
//! | **Encode → JPEG** | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | **Encode → WebP** | `webp::Encoder` at the requested quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing one variant to encode
//! - **Backend**: [`ImageEncoder`] trait + [`RustEncoder`]

mod avif;
pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{EncodeError, EncodedVariant, ImageEncoder};
pub use calculations::{bytes_to_kb, calculate_scaled_height};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::RustEncoder;
