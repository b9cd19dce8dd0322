//! Encode dispatch.
//!
//! When a plan calls for regeneration, [`dispatch`] hands one job per
//! [`VariantSpec`] to the rayon pool with [`rayon::spawn`] and returns at
//! once. Nothing waits on those jobs: the markup for the image is built
//! while they run, and a build that embeds it may finish writing pages
//! before every variant is on disk.
//!
//! ## Failure isolation
//!
//! A job that fails (or panics inside the encoder) is logged with its source
//! path, target path and format, and reported as
//! [`ProcessEvent::VariantFailed`]. Sibling jobs are unaffected and the
//! caller never sees the error.
//!
//! ## Observing completion
//!
//! Callers that do care when the work is done (the CLI before exiting,
//! tests) pass a channel sender. Every dispatched job sends exactly one
//! [`ProcessEvent::VariantEncoded`] or [`ProcessEvent::VariantFailed`], and
//! each job holds its own clone of the sender, so the receiving iterator
//! ends once the caller drops its sender and all jobs have finished.

use crate::imaging::{EncodeError, EncodeParams, ImageEncoder, OutputFormat, bytes_to_kb};
use crate::plan::{GenerationDecision, VariantPlan, VariantSpec};
use crate::request::ValidatedRequest;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// Progress events emitted while handling an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Every variant already exists; nothing was dispatched.
    Skipped { source: PathBuf, existing: usize },
    /// Encode jobs were handed to the pool.
    Dispatched { source: PathBuf, count: usize },
    VariantEncoded {
        source: PathBuf,
        spec: VariantSpec,
        byte_size: u64,
    },
    VariantFailed {
        source: PathBuf,
        spec: VariantSpec,
        error: String,
    },
}

impl ProcessEvent {
    /// True for the one terminal event each dispatched job sends.
    pub fn is_encode_result(&self) -> bool {
        matches!(
            self,
            ProcessEvent::VariantEncoded { .. } | ProcessEvent::VariantFailed { .. }
        )
    }
}

fn send(events: &Option<Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// Launch encode jobs for a plan. Returns the number of jobs dispatched.
pub fn dispatch<E: ImageEncoder + 'static>(
    encoder: &Arc<E>,
    request: &ValidatedRequest,
    plan: &VariantPlan,
    events: Option<Sender<ProcessEvent>>,
) -> usize {
    let source = request.source_path();

    if plan.decision == GenerationDecision::Skip {
        tracing::info!(
            source = %source.display(),
            existing = plan.existing,
            "all variants present, skipping"
        );
        send(
            &events,
            ProcessEvent::Skipped {
                source,
                existing: plan.existing,
            },
        );
        return 0;
    }

    tracing::info!(
        source = %source.display(),
        variants = plan.variants.len(),
        decision = ?plan.decision,
        "transforming image, one moment"
    );
    send(
        &events,
        ProcessEvent::Dispatched {
            source: source.clone(),
            count: plan.variants.len(),
        },
    );

    for spec in &plan.variants {
        let job = EncodeJob {
            params: EncodeParams {
                source: source.clone(),
                output: spec.output_path.clone(),
                width: spec.width,
                format: spec.format,
                quality: request.quality,
            },
            spec: spec.clone(),
            debug: request.debug,
        };
        let encoder = Arc::clone(encoder);
        let events = events.clone();
        rayon::spawn(move || job.run(encoder.as_ref(), &events));
    }

    plan.variants.len()
}

/// One detached encode.
struct EncodeJob {
    params: EncodeParams,
    spec: VariantSpec,
    debug: bool,
}

impl EncodeJob {
    fn run(self, encoder: &impl ImageEncoder, events: &Option<Sender<ProcessEvent>>) {
        let result = catch_unwind(AssertUnwindSafe(|| encoder.encode(&self.params)))
            .unwrap_or_else(|panic| Err(EncodeError::Panicked(panic_message(panic.as_ref()))));

        match result {
            Ok(encoded) => {
                if self.debug {
                    tracing::info!(
                        file = %encoded.output.display(),
                        width = self.spec.width,
                        size = %format!("{} KB", bytes_to_kb(encoded.byte_size)),
                        "variant written"
                    );
                }
                send(
                    events,
                    ProcessEvent::VariantEncoded {
                        source: self.params.source,
                        spec: self.spec,
                        byte_size: encoded.byte_size,
                    },
                );
            }
            Err(error) => {
                tracing::warn!(
                    source = %self.params.source.display(),
                    target = %self.params.output.display(),
                    format = %format_label(self.spec.format),
                    width = self.spec.width,
                    %error,
                    "failed to transform image"
                );
                send(
                    events,
                    ProcessEvent::VariantFailed {
                        source: self.params.source,
                        spec: self.spec,
                        error: error.to_string(),
                    },
                );
            }
        }
    }
}

fn format_label(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Jpeg => "JPEG",
        OutputFormat::WebP => "WebP",
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
