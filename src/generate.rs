//! One invocation: validate → plan → dispatch → markup.
//!
//! [`generate`] is what a build framework calls for each image reference.
//! It returns as soon as the markup is built; encoding continues in the
//! background (see [`process`](crate::process)).

use crate::imaging::ImageEncoder;
use crate::markup::render_picture;
use crate::plan::{VariantPlan, plan};
use crate::process::{ProcessEvent, dispatch};
use crate::request::ImageRequest;
use crate::store::FileStore;
use crate::validate::{ValidationError, validate};
use std::sync::Arc;
use std::sync::mpsc::Sender;

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    /// The `<picture>` fragment.
    pub html: String,
    pub plan: VariantPlan,
    /// Encode jobs launched by this call (0 when skipped).
    pub dispatched: usize,
}

/// Produce markup for one image, dispatching encodes if variants are missing.
///
/// Validation errors are returned before any encoder call. Encode failures
/// never surface here; they are logged and sent on `events`.
pub fn generate<E: ImageEncoder + 'static>(
    request: &ImageRequest,
    encoder: &Arc<E>,
    store: &impl FileStore,
    events: Option<Sender<ProcessEvent>>,
) -> Result<Rendered, ValidationError> {
    let request = validate(request, store)?;
    let plan = plan(&request, store);
    let dispatched = dispatch(encoder, &request, &plan, events);
    let html = render_picture(&request, &plan).into_string();
    Ok(Rendered {
        html,
        plan,
        dispatched,
    })
}
