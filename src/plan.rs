//! Variant planning: which files must exist, and whether to (re)build them.
//!
//! # Expected variants
//!
//! For a validated request with widths `w1 < w2 < ... < wN` the planner
//! derives `2·N` [`VariantSpec`]s, ordered by width and JPEG before WebP:
//!
//! ```text
//! hero-320.jpeg, hero-320.webp, hero-640.jpeg, hero-640.webp, ...
//! ```
//!
//! Specs are computed fresh on every call; nothing is remembered between
//! invocations. Disk state is the only memory.
//!
//! # Decision policy
//!
//! | existing | overwrite | decision |
//! |---|---|---|
//! | all | false | skip, no encoder calls |
//! | all | true | regenerate all (forced) |
//! | some or none | any | regenerate all (incomplete) |
//!
//! A partial set is always rebuilt in full; individual missing variants are
//! never patched in.

use crate::imaging::OutputFormat;
use crate::naming;
use crate::request::ValidatedRequest;
use crate::store::FileStore;
use serde::Serialize;
use std::path::PathBuf;

/// Deterministic descriptor of one variant, whether or not it exists yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantSpec {
    pub width: u32,
    pub format: OutputFormat,
    /// Where the encoder writes the file.
    pub output_path: PathBuf,
    /// How markup references the file.
    pub public_path: String,
}

impl VariantSpec {
    pub fn filename(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Why a regeneration was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum RegenerateReason {
    /// Every variant exists but the request asked to overwrite.
    Forced,
    /// At least one variant is missing.
    Incomplete { existing: usize, expected: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum GenerationDecision {
    Skip,
    Regenerate(RegenerateReason),
}

impl GenerationDecision {
    pub fn regenerate(self) -> bool {
        matches!(self, GenerationDecision::Regenerate(_))
    }
}

/// Full plan for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPlan {
    pub variants: Vec<VariantSpec>,
    pub existing: usize,
    pub decision: GenerationDecision,
}

impl VariantPlan {
    /// Specs of one format, in ascending width order.
    pub fn of_format(&self, format: OutputFormat) -> impl Iterator<Item = &VariantSpec> {
        self.variants.iter().filter(move |v| v.format == format)
    }
}

/// Every variant the request implies, ordered by width then format.
pub fn expected_variants(request: &ValidatedRequest) -> Vec<VariantSpec> {
    request
        .widths
        .iter()
        .flat_map(|&width| {
            OutputFormat::ALL.into_iter().map(move |format| {
                let file = naming::variant_filename(&request.base_name, width, format.extension());
                VariantSpec {
                    width,
                    format,
                    output_path: naming::filesystem_path(
                        &request.input_dir,
                        &request.image_dir,
                        &file,
                    ),
                    public_path: naming::public_path(&request.image_dir, &file),
                }
            })
        })
        .collect()
}

/// Apply the decision policy to an existence count.
pub fn decide(existing: usize, expected: usize, overwrite: bool) -> GenerationDecision {
    if existing < expected {
        GenerationDecision::Regenerate(RegenerateReason::Incomplete { existing, expected })
    } else if overwrite {
        GenerationDecision::Regenerate(RegenerateReason::Forced)
    } else {
        GenerationDecision::Skip
    }
}

/// Compute the expected variants, check the store, and decide.
pub fn plan(request: &ValidatedRequest, store: &impl FileStore) -> VariantPlan {
    let variants = expected_variants(request);
    let existing = variants
        .iter()
        .filter(|v| store.exists(&v.output_path))
        .count();
    let decision = decide(existing, variants.len(), request.overwrite);
    VariantPlan {
        variants,
        existing,
        decision,
    }
}
