//! `<picture>` markup for a planned image.
//!
//! Rendering is pure and synchronous: it reads the same [`VariantSpec`]s the
//! encoder jobs write, so every path is correct by construction whether the
//! files were just dispatched, are still being written, or were already on
//! disk from a previous build.
//!
//! ## Output shape
//!
//! ```html
//! <picture>
//!   <source type="image/webp" srcset="img/hero-320.webp 320w, img/hero-640.webp 640w" sizes="100vw">
//!   <img srcset="img/hero-320.jpeg 320w, img/hero-640.jpeg 640w" sizes="100vw"
//!        src="img/hero-320.jpeg" alt="Hero" loading="lazy">
//! </picture>
//! ```
//!
//! (Rendered without the whitespace shown above.) `class`, `width`,
//! `height` and `id` appear on the `<img>` only when the request sets them.
//! All values are HTML-escaped by maud.

use crate::imaging::OutputFormat;
use crate::plan::{VariantPlan, VariantSpec};
use crate::request::ValidatedRequest;
use maud::{Markup, html};

/// `"<path> <width>w"` entries joined with `", "`, in plan order.
pub fn srcset<'a>(variants: impl IntoIterator<Item = &'a VariantSpec>) -> String {
    variants
        .into_iter()
        .map(|v| format!("{} {}w", v.public_path, v.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Public path of the JPEG used for `<img src>`.
fn fallback_src(request: &ValidatedRequest, plan: &VariantPlan) -> String {
    let width = request.fallback_width();
    plan.of_format(OutputFormat::Jpeg)
        .find(|v| v.width == width)
        .map(|v| v.public_path.clone())
        .unwrap_or_default()
}

/// Build the `<picture>` element for a request and its plan.
pub fn render_picture(request: &ValidatedRequest, plan: &VariantPlan) -> Markup {
    let webp_srcset = srcset(plan.of_format(OutputFormat::WebP));
    let jpeg_srcset = srcset(plan.of_format(OutputFormat::Jpeg));
    let src = fallback_src(request, plan);

    html! {
        picture {
            source type=(OutputFormat::WebP.mime_type()) srcset=(webp_srcset) sizes=(request.sizes);
            img srcset=(jpeg_srcset)
                sizes=(request.sizes)
                src=(src)
                alt=(request.alt)
                class=[request.class.as_deref()]
                width=[request.display_width]
                height=[request.display_height]
                loading="lazy"
                id=[request.id.as_deref()];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::plan::plan;
    use crate::request::SourceFormat;
    use crate::store::tests::MemoryStore;

    fn request() -> ValidatedRequest {
        ValidatedRequest {
            source: "hero.png".into(),
            base_name: "hero".into(),
            format: SourceFormat::Png,
            alt: "Hero".into(),
            class: None,
            id: None,
            display_width: None,
            display_height: None,
            sizes: "100vw".into(),
            input_dir: "./site/".into(),
            image_dir: "/img/".into(),
            widths: vec![320, 640, 1024],
            quality: Quality::default(),
            overwrite: false,
            debug: false,
            fallback_src_width: None,
        }
    }

    fn render(request: &ValidatedRequest) -> String {
        render_picture(request, &plan(request, &MemoryStore::new())).into_string()
    }

    #[test]
    fn minimal_picture_markup() {
        assert_eq!(
            render(&request()),
            concat!(
                "<picture>",
                r#"<source type="image/webp" srcset="img/hero-320.webp 320w, img/hero-640.webp 640w, img/hero-1024.webp 1024w" sizes="100vw">"#,
                r#"<img srcset="img/hero-320.jpeg 320w, img/hero-640.jpeg 640w, img/hero-1024.jpeg 1024w" sizes="100vw" src="img/hero-320.jpeg" alt="Hero" loading="lazy">"#,
                "</picture>",
            )
        );
    }

    #[test]
    fn optional_attributes_rendered_in_order() {
        let req = ValidatedRequest {
            class: Some("hero-image".into()),
            id: Some("top".into()),
            display_width: Some(1024),
            display_height: Some(768),
            ..request()
        };
        let html = render(&req);
        assert!(html.contains(
            r#"alt="Hero" class="hero-image" width="1024" height="768" loading="lazy" id="top">"#
        ));
    }

    #[test]
    fn fallback_width_override() {
        let req = ValidatedRequest {
            fallback_src_width: Some(640),
            ..request()
        };
        assert!(render(&req).contains(r#"src="img/hero-640.jpeg""#));
    }

    #[test]
    fn sizes_echoed_on_both_elements() {
        let req = ValidatedRequest {
            sizes: "(max-width: 600px) 100vw, 50vw".into(),
            ..request()
        };
        let html = render(&req);
        assert_eq!(
            html.matches(r#"sizes="(max-width: 600px) 100vw, 50vw""#).count(),
            2
        );
    }

    #[test]
    fn attribute_values_are_escaped() {
        let req = ValidatedRequest {
            alt: r#"Tom & "Jerry" <3"#.into(),
            ..request()
        };
        assert!(render(&req).contains(r#"alt="Tom &amp; &quot;Jerry&quot; &lt;3""#));
    }

    #[test]
    fn markup_ignores_disk_state() {
        let req = request();
        let present = MemoryStore::with_files(
            crate::plan::expected_variants(&req)
                .into_iter()
                .map(|v| v.output_path),
        );
        let with_files = render_picture(&req, &plan(&req, &present)).into_string();
        assert_eq!(with_files, render(&req));
    }

    #[test]
    fn srcset_joins_entries() {
        let plan = plan(&request(), &MemoryStore::new());
        assert_eq!(
            srcset(plan.of_format(OutputFormat::Jpeg).take(2)),
            "img/hero-320.jpeg 320w, img/hero-640.jpeg 640w"
        );
        assert_eq!(srcset(std::iter::empty()), "");
    }
}
