//! # respimg
//!
//! Build-time responsive images for static sites. Given one image reference
//! (a source file, a list of widths, and the usual `<img>` attributes),
//! respimg writes resized JPEG and WebP variants next to the source and
//! returns the `<picture>` markup that points at them.
//!
//! # Architecture: One Invocation
//!
//! Every template call goes through the same four steps:
//!
//! ```text
//! 1. Validate  ImageRequest      →  ValidatedRequest   (fails before any I/O)
//! 2. Plan      ValidatedRequest  →  VariantPlan        (existence checks only)
//! 3. Dispatch  VariantPlan       →  background encodes (rayon::spawn, not awaited)
//! 4. Markup    VariantPlan       →  <picture> HTML     (pure)
//! ```
//!
//! Markup is built from the same [`plan::VariantSpec`]s the encoders write,
//! so it is correct whether the variants are fresh, in flight, or already on
//! disk. The entry point is [`generate::generate`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`validate`] | Required fields, supported extension, widths, quality, source existence |
//! | [`request`] | `ImageRequest` descriptor and its validated form |
//! | [`plan`] | Expected variants and the skip/regenerate decision |
//! | [`process`] | Detached encode jobs and progress events |
//! | [`markup`] | `<picture>` rendering with Maud |
//! | [`generate`] | Orchestrates one invocation |
//! | [`naming`] | Variant filenames, filesystem paths, public paths |
//! | [`imaging`] | Decode/resize/encode behind the `ImageEncoder` trait |
//! | [`store`] | File existence behind the `FileStore` trait |
//! | [`config`] | `respimg.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Disk Is the Cache
//!
//! No manifest, no hashes. A variant set is either complete (skip) or it is
//! not (rebuild all of it). `overwrite` forces a rebuild of a complete set.
//! Editing a source in place therefore needs `overwrite` once.
//!
//! ## Fire-and-Forget Encoding
//!
//! Encodes run on the rayon pool and the call returns without waiting. A build
//! framework can keep rendering pages while variants are written. Callers that
//! need to know when the work is done pass an event channel.
//!
//! ## Imaging
//!
//! Decoding, resizing and JPEG encoding use the `image` crate, with
//! `avif-parse` and `rav1d` for AVIF sources. WebP goes through the `webp`
//! crate, which builds libwebp from source, so no system libraries are needed.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod plan;
pub mod process;
pub mod request;
pub mod store;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_helpers;
