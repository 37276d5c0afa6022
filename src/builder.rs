//! Per-archive record assembly: descriptor and sample documents in, one
//! run record and its sample rows out.

use serde_json::Value;

use crate::archive::EvalArchive;
use crate::classify::{classify_run, classify_sample, RunClassification};
use crate::error::Result;
use crate::json::{
    as_nonempty_string, display_fragment, get_nonempty, get_path, nonempty, value_list,
};
use crate::record::{RunHeader, RunRecord, SampleRecord};
use crate::scoring::{coerce_score_bool, extract_primary_metric};
use crate::taxonomy::Taxonomy;

/// Parses one opened archive. Any unreadable or malformed member fails the
/// whole archive; partial output would silently skew the rollups.
pub fn build_records(
    archive: &mut EvalArchive,
    taxonomy: &Taxonomy,
) -> Result<(RunRecord, Vec<SampleRecord>)> {
    let descriptor = archive.read_descriptor()?;
    let header = RunHeader::from_descriptor(&descriptor, &archive.file_stem());
    let run_class = classify_run(taxonomy, &header);
    let eval_file = archive.file_name();

    let members = archive.sample_members().to_vec();
    let mut samples = Vec::with_capacity(members.len());
    for member in &members {
        let doc = archive.read_member(member)?;
        samples.push(build_sample(&doc, taxonomy, &header.eval_id, &eval_file, &run_class));
    }

    let run = RunRecord {
        models: header.joined_models(),
        eval_id: header.eval_id,
        eval_file,
        task: header.task,
        task_id: header.task_id,
        attack_type: run_class.attack_type,
        modality: run_class.modality,
        created: header.created,
        num_samples: samples.len(),
    };
    Ok((run, samples))
}

fn build_sample(
    doc: &Value,
    taxonomy: &Taxonomy,
    eval_id: &str,
    eval_file: &str,
    run: &RunClassification,
) -> SampleRecord {
    let sample_id = crate::first_nonempty!(
        get_nonempty(doc, "id"),
        get_nonempty(doc, "sample_id"),
        get_nonempty(doc, "name")
    )
    .and_then(as_nonempty_string);

    let scores = doc.get("scores").unwrap_or(&Value::Null);
    let primary = extract_primary_metric(scores);
    let raw_score = crate::first_nonempty!(
        get_nonempty(doc, "score"),
        get_path(doc, &["result", "score"]).and_then(nonempty)
    )
    .cloned();
    let score_bool =
        coerce_score_bool(taxonomy, primary.as_ref().map(|(_, v)| v), raw_score.as_ref());

    // Metadata must be an object to be usable; tags may live on the sample
    // itself or inside the metadata.
    let meta = crate::first_nonempty!(get_nonempty(doc, "meta"), get_nonempty(doc, "metadata"))
        .filter(|v| v.is_object());
    let tags = crate::first_nonempty!(
        get_nonempty(doc, "tags"),
        meta.and_then(|m| get_nonempty(m, "tags"))
    )
    .map(value_list)
    .unwrap_or_default();

    let haystack = tags.iter().map(display_fragment).collect::<Vec<_>>().join(" ");
    let classification = classify_sample(taxonomy, meta, &haystack, run);
    let (primary_metric_name, primary_metric_value) = primary.unzip();

    SampleRecord {
        eval_id: eval_id.to_string(),
        eval_file: eval_file.to_string(),
        sample_id,
        attack_type: classification.attack_type,
        modality: classification.modality,
        primary_metric_name,
        primary_metric_value,
        score: raw_score,
        score_bool,
        tags,
    }
}
