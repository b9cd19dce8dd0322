//! End-to-end runs of `generate` against a temporary site directory with the
//! real encoder.
//!
//! Encodes are detached, so every test waits on the event channel: the
//! receiver iterator ends once each job has reported and dropped its sender.

use respimg::generate::generate;
use respimg::imaging::RustEncoder;
use respimg::plan::GenerationDecision;
use respimg::process::ProcessEvent;
use respimg::request::ImageRequest;
use respimg::store::DiskStore;
use respimg::validate::ValidationError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc;
use tempfile::TempDir;

struct Site {
    tmp: TempDir,
}

impl Site {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("site/img")).unwrap();
        Self { tmp }
    }

    fn img(&self, name: &str) -> PathBuf {
        self.tmp.path().join("site/img").join(name)
    }

    fn request(&self, source: &str, widths: &[u32]) -> ImageRequest {
        ImageRequest {
            source: Some(source.to_string()),
            alt: Some("Hero".to_string()),
            input_dir: Some(format!("{}/site/", self.tmp.path().display())),
            image_dir: Some("img/".to_string()),
            widths: Some(widths.to_vec()),
            sizes: Some("100vw".to_string()),
            ..ImageRequest::default()
        }
    }
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 90, 200])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

fn write_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

fn write_avif(path: &Path, width: u32, height: u32) {
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

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Run one invocation and block until all of its encodes report.
fn run(request: &ImageRequest) -> (respimg::generate::Rendered, Vec<ProcessEvent>) {
    let encoder = Arc::new(RustEncoder::new());
    let (tx, rx) = mpsc::channel();
    let rendered = generate(request, &encoder, &DiskStore, Some(tx)).unwrap();
    let events = rx.iter().collect();
    (rendered, events)
}

#[test]
fn writes_every_variant_at_requested_width() {
    let site = Site::new();
    write_png(&site.img("hero.png"), 200, 100);

    let (rendered, events) = run(&site.request("hero.png", &[80, 40]));

    assert_eq!(rendered.dispatched, 4);
    let encoded = events
        .iter()
        .filter(|e| matches!(e, ProcessEvent::VariantEncoded { .. }))
        .count();
    assert_eq!(encoded, 4);

    for (name, expected) in [
        ("hero-40.jpeg", (40, 20)),
        ("hero-40.webp", (40, 20)),
        ("hero-80.jpeg", (80, 40)),
        ("hero-80.webp", (80, 40)),
    ] {
        let dims = image::image_dimensions(site.img(name)).unwrap();
        assert_eq!(dims, expected, "{name}");
    }
}

#[test]
fn markup_references_written_files() {
    let site = Site::new();
    write_jpeg(&site.img("hero.jpg"), 120, 90);

    let (rendered, _) = run(&site.request("hero.jpg", &[60, 30]));

    assert_eq!(
        rendered.html,
        concat!(
            "<picture>",
            r#"<source type="image/webp" srcset="img/hero-30.webp 30w, img/hero-60.webp 60w" sizes="100vw">"#,
            r#"<img srcset="img/hero-30.jpeg 30w, img/hero-60.jpeg 60w" sizes="100vw" src="img/hero-30.jpeg" alt="Hero" loading="lazy">"#,
            "</picture>",
        )
    );
    for spec in &rendered.plan.variants {
        assert!(spec.output_path.exists(), "{}", spec.output_path.display());
    }
}

#[test]
fn second_run_skips_and_leaves_files_untouched() {
    let site = Site::new();
    write_jpeg(&site.img("hero.jpg"), 64, 64);
    let request = site.request("hero.jpg", &[16, 32]);

    let (first, _) = run(&request);
    let before = std::fs::metadata(site.img("hero-16.jpeg"))
        .unwrap()
        .modified()
        .unwrap();

    let (second, events) = run(&request);

    assert_eq!(second.plan.decision, GenerationDecision::Skip);
    assert_eq!(second.dispatched, 0);
    assert!(matches!(events[..], [ProcessEvent::Skipped { existing: 4, .. }]));
    assert_eq!(first.html, second.html);
    let after = std::fs::metadata(site.img("hero-16.jpeg"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn partial_set_is_rebuilt_in_full() {
    let site = Site::new();
    write_jpeg(&site.img("hero.jpg"), 64, 64);
    let request = site.request("hero.jpg", &[16, 32]);
    run(&request);

    std::fs::remove_file(site.img("hero-32.webp")).unwrap();
    let (rendered, _) = run(&request);

    assert_eq!(rendered.dispatched, 4);
    assert!(site.img("hero-32.webp").exists());
}

#[test]
fn undecodable_source_fails_per_variant_without_error() {
    let site = Site::new();
    std::fs::write(site.img("broken.png"), b"not a png").unwrap();

    let (rendered, events) = run(&site.request("broken.png", &[16, 32]));

    // Markup is still produced; failures only show up as events
    assert!(rendered.html.contains(r#"src="img/broken-16.jpeg""#));
    let failed = events
        .iter()
        .filter(|e| matches!(e, ProcessEvent::VariantFailed { .. }))
        .count();
    assert_eq!(failed, 4);
}

#[test]
fn missing_source_is_a_validation_error() {
    let site = Site::new();
    let encoder = Arc::new(RustEncoder::new());

    let result = generate(
        &site.request("absent.png", &[16, 32]),
        &encoder,
        &DiskStore,
        None,
    );

    assert!(matches!(result, Err(ValidationError::SourceNotFound(_))));
    assert!(!site.img("absent-16.jpeg").exists());
}

#[test]
fn avif_source_produces_scaled_variants() {
    let site = Site::new();
    write_avif(&site.img("hero.avif"), 64, 48);

    let (rendered, events) = run(&site.request("hero.avif", &[32, 16]));

    assert_eq!(rendered.dispatched, 4);
    assert!(events.iter().all(|e| !matches!(e, ProcessEvent::VariantFailed { .. })));
    for (name, expected) in [
        ("hero-16.jpeg", (16, 12)),
        ("hero-16.webp", (16, 12)),
        ("hero-32.jpeg", (32, 24)),
        ("hero-32.webp", (32, 24)),
    ] {
        let dims = image::image_dimensions(site.img(name)).unwrap();
        assert_eq!(dims, expected, "{name}");
    }
}

#[test]
fn failed_variants_are_absent_and_retried_next_run() {
    let site = Site::new();
    write_png(&site.img("hero.png"), 1000, 1);
    // 70000 exceeds the maximum JPEG and WebP dimensions
    let request = site.request("hero.png", &[320, 70000]);

    let (_, events) = run(&request);

    let failed = events
        .iter()
        .filter(|e| matches!(e, ProcessEvent::VariantFailed { .. }))
        .count();
    assert_eq!(failed, 2);
    assert_eq!(
        dir_entries(&site.img("")),
        vec!["hero-320.jpeg", "hero-320.webp", "hero.png"]
    );

    let (second, _) = run(&request);
    assert_eq!(second.plan.existing, 2);
    assert_ne!(second.plan.decision, GenerationDecision::Skip);
    assert_eq!(second.dispatched, 4);
}
