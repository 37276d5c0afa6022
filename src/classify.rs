//! Attack-type and modality classification.
//!
//! A run is classified from its descriptor fields, a sample from its own
//! metadata and tags with the run's result as the fallback. Each value is
//! a fallback chain: explicit annotation first, keyword inference second,
//! inherited or default value last.

use serde_json::Value;

use crate::json::{as_nonempty_string, get_nonempty};
use crate::record::RunHeader;
use crate::taxonomy::Taxonomy;

/// Modality assigned when nothing else matches.
pub const DEFAULT_MODALITY: &str = "text";

/// Run-level classification result. `attack_type` stays empty when neither
/// the descriptor nor the keyword tables say anything; `modality` always
/// holds at least the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunClassification {
    pub attack_type: Option<String>,
    pub modality: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleClassification {
    pub attack_type: Option<String>,
    pub modality: String,
}

/// Classifies a run: explicit category, then task keywords, then task id
/// keywords for the attack type; task keywords or the default for the
/// modality.
pub fn classify_run(taxonomy: &Taxonomy, header: &RunHeader) -> RunClassification {
    let task = header.task.as_deref().unwrap_or_default();
    let task_id = header.task_id.as_deref().unwrap_or_default();

    let attack_type = crate::first_nonempty!(
        header.category.clone(),
        label_of(taxonomy.attack_label(task)),
        label_of(taxonomy.attack_label(task_id))
    );
    let modality = label_of(taxonomy.modality_label(task))
        .unwrap_or_else(|| DEFAULT_MODALITY.to_string());
    RunClassification { attack_type, modality }
}

/// Classifies a sample: its own metadata annotation, then keywords found
/// in its tags, then whatever the run was classified as.
pub fn classify_sample(
    taxonomy: &Taxonomy,
    meta: Option<&Value>,
    tags_haystack: &str,
    run: &RunClassification,
) -> SampleClassification {
    let attack_type = crate::first_nonempty!(
        meta_field(meta, "attack_type"),
        label_of(taxonomy.attack_label(tags_haystack)),
        run.attack_type.clone()
    );
    let modality = crate::first_nonempty!(
        meta_field(meta, "modality"),
        label_of(taxonomy.modality_label(tags_haystack))
    )
    .unwrap_or_else(|| run.modality.clone());
    SampleClassification { attack_type, modality }
}

fn meta_field(meta: Option<&Value>, key: &str) -> Option<String> {
    meta.and_then(|m| get_nonempty(m, key)).and_then(as_nonempty_string)
}

// A matched rule with an empty label is a miss, the chain moves on.
fn label_of(label: Option<&str>) -> Option<String> {
    label.filter(|l| !l.is_empty()).map(str::to_string)
}
