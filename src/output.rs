//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! ```text
//! hero.png → 6 variants (regenerate: 0 of 6 present)
//!     Source: ./site//img/hero.png
//!     320w jpeg: img/hero-320.jpeg
//!     320w webp: img/hero-320.webp
//!     ...
//! ```
//!
//! ## Render progress
//!
//! ```text
//! hero.png: transforming 6 variants, one moment
//!     hero-320.jpeg: 12.345 KB
//!     hero-320.webp: failed (Failed to encode variant: ...)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::bytes_to_kb;
use crate::plan::{GenerationDecision, RegenerateReason, VariantPlan};
use crate::process::ProcessEvent;
use crate::request::ValidatedRequest;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One-line summary of a generation decision.
fn decision_label(plan: &VariantPlan) -> String {
    match plan.decision {
        GenerationDecision::Skip => format!("skip: all {} present", plan.existing),
        GenerationDecision::Regenerate(RegenerateReason::Forced) => {
            "regenerate: overwrite requested".to_string()
        }
        GenerationDecision::Regenerate(RegenerateReason::Incomplete { existing, expected }) => {
            format!("regenerate: {existing} of {expected} present")
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Format the variant plan for one request.
pub fn format_plan(request: &ValidatedRequest, plan: &VariantPlan) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} → {} variants ({})",
            request.source,
            plan.variants.len(),
            decision_label(plan)
        ),
        format!("{}Source: {}", indent(1), request.source_path().display()),
    ];
    for spec in &plan.variants {
        lines.push(format!(
            "{}{}w {}: {}",
            indent(1),
            spec.width,
            spec.format,
            spec.public_path
        ));
    }
    lines
}

pub fn print_plan(request: &ValidatedRequest, plan: &VariantPlan) {
    for line in format_plan(request, plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Render progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Skipped { source, existing } => vec![format!(
            "{}: all {} variants present, skipping",
            file_name(source),
            existing
        )],
        ProcessEvent::Dispatched { source, count } => vec![format!(
            "{}: transforming {} variants, one moment",
            file_name(source),
            count
        )],
        ProcessEvent::VariantEncoded {
            spec, byte_size, ..
        } => vec![format!(
            "{}{}: {} KB",
            indent(1),
            spec.filename(),
            bytes_to_kb(*byte_size)
        )],
        ProcessEvent::VariantFailed { spec, error, .. } => vec![format!(
            "{}{}: failed ({})",
            indent(1),
            spec.filename(),
            error
        )],
    }
}
