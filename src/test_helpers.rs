//! Shared test utilities for the respimg test suite.
//!
//! Provides synthetic source images, an on-disk site fixture, and helpers for
//! waiting on background encode jobs through the progress channel.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::with_jpeg("hero.jpg", 400, 300);
//! let request = site.request("hero.jpg", &[320, 640]);
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::time::Duration;
use tempfile::TempDir;

use crate::process::ProcessEvent;
use crate::request::ImageRequest;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a small gradient JPEG with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

/// Write a small half-transparent PNG with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a small gradient AVIF with the given dimensions.
pub fn create_test_avif(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 4 % 256) as u8, (y * 4 % 256) as u8, 96])
    });
    let writer = std::io::BufWriter::new(std::fs::File::create(path).unwrap());
    image::DynamicImage::ImageRgb8(img)
        .write_with_encoder(image::codecs::avif::AvifEncoder::new_with_speed_quality(
            writer, 10, 85,
        ))
        .unwrap();
}

// =========================================================================
// Site fixture
// =========================================================================

/// A temporary site root laid out as `<tmp>/site/img/`.
///
/// Requests built from it use `input_dir = "<tmp>/site/"` and
/// `image_dir = "img/"`, so every output lands inside the temp directory.
pub struct SiteFixture {
    pub tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("site/img")).unwrap();
        Self { tmp }
    }

    pub fn with_jpeg(name: &str, width: u32, height: u32) -> Self {
        let site = Self::new();
        create_test_jpeg(&site.image_path(name), width, height);
        site
    }

    pub fn input_dir(&self) -> String {
        format!("{}/site/", self.tmp.path().display())
    }

    /// Absolute path of a file inside the image directory.
    pub fn image_path(&self, name: &str) -> PathBuf {
        self.tmp.path().join("site/img").join(name)
    }

    /// Create an empty placeholder file (existence is all the planner checks).
    pub fn touch(&self, name: &str) {
        std::fs::write(self.image_path(name), b"").unwrap();
    }

    /// A complete request for `source` with the given widths.
    pub fn request(&self, source: &str, widths: &[u32]) -> ImageRequest {
        ImageRequest {
            source: Some(source.to_string()),
            alt: Some("A test image".to_string()),
            input_dir: Some(self.input_dir()),
            image_dir: Some("img/".to_string()),
            widths: Some(widths.to_vec()),
            sizes: Some("100vw".to_string()),
            ..ImageRequest::default()
        }
    }
}

// =========================================================================
// Waiting on background work
// =========================================================================

/// Collect events until `finished` encode results have arrived.
///
/// Panics if the jobs do not report within a generous timeout.
pub fn wait_for_encodes(rx: &Receiver<ProcessEvent>, finished: usize) -> Vec<ProcessEvent> {
    let mut events = Vec::new();
    let mut done = 0;
    while done < finished {
        let event = rx
            .recv_timeout(Duration::from_secs(30))
            .unwrap_or_else(|_| panic!("only {done} of {finished} encodes reported"));
        if event.is_encode_result() {
            done += 1;
        }
        events.push(event);
    }
    events
}
