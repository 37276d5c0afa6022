//! Output record types and descriptor field extraction.
//!
//! `RunRecord` and `SampleRecord` are the rows of the two normalized
//! datasets. Field order here is the column order of the CSV exports, so
//! reordering fields is a format change.

use serde::Serialize;
use serde_json::Value;

use crate::json::{as_nonempty_string, get_nonempty, get_path, render_scalar, string_list};

/// One row of the run-level dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunRecord {
    pub eval_id: String,
    pub eval_file: String,
    pub task: Option<String>,
    pub task_id: Option<String>,
    pub attack_type: Option<String>,
    pub modality: String,
    /// Model names joined with `", "`, absent when the run names none.
    pub models: Option<String>,
    pub created: Option<String>,
    pub num_samples: usize,
}

/// One row of the sample-level dataset.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SampleRecord {
    pub eval_id: String,
    pub eval_file: String,
    pub sample_id: Option<String>,
    pub attack_type: Option<String>,
    pub modality: String,
    pub primary_metric_name: Option<String>,
    /// The primary metric's value verbatim, whatever its JSON type.
    pub primary_metric_value: Option<Value>,
    /// The raw score field verbatim, before normalization.
    pub score: Option<Value>,
    /// Normalized score in `[0, 1]`, when one could be derived.
    pub score_bool: Option<f64>,
    pub tags: Vec<Value>,
}

/// Scalar fields lifted out of a run descriptor. Everything downstream
/// (classification, record assembly) works from this instead of poking at
/// the raw document again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHeader {
    /// Run id from the descriptor, or the archive file stem as last resort.
    pub eval_id: String,
    pub task: Option<String>,
    pub task_id: Option<String>,
    pub created: Option<String>,
    /// Explicit category from the descriptor, overriding keyword inference.
    pub category: Option<String>,
    pub models: Vec<String>,
}

impl RunHeader {
    /// Extracts the header fields from a `_journal/start.json` document.
    ///
    /// Producers are sloppy about shapes, so every field is narrowed: a
    /// non-object `eval` or `plan` section is treated as absent, scalars
    /// are rendered to text and compound values where a scalar belongs are
    /// dropped. `task_id` and `created` keep empty strings verbatim; the
    /// fallback fields treat them as absent.
    pub fn from_descriptor(descriptor: &Value, file_stem: &str) -> Self {
        let eval_info = section(descriptor, "eval");
        let plan = section(descriptor, "plan");

        let eval_id = get_nonempty(eval_info, "eval_id")
            .and_then(as_nonempty_string)
            .unwrap_or_else(|| file_stem.to_string());

        let task = crate::first_nonempty!(
            get_nonempty(eval_info, "task"),
            get_nonempty(eval_info, "task_registry_name")
        )
        .and_then(as_nonempty_string);

        let task_id = eval_info.get("task_id").and_then(render_scalar);
        let created = eval_info.get("created").and_then(render_scalar);

        let category =
            get_path(eval_info, &["task_attribs", "category"]).and_then(as_nonempty_string);

        let models = crate::first_nonempty!(
            get_nonempty(plan, "models"),
            get_nonempty(plan, "model")
        )
        .map(string_list)
        .unwrap_or_default();

        Self { eval_id, task, task_id, created, category, models }
    }

    /// Joined model list for the run row, `None` when empty.
    pub fn joined_models(&self) -> Option<String> {
        if self.models.is_empty() {
            None
        } else {
            Some(self.models.join(", "))
        }
    }
}

fn section<'a>(descriptor: &'a Value, key: &str) -> &'a Value {
    descriptor.get(key).filter(|v| v.is_object()).unwrap_or(&Value::Null)
}
