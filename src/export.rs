// Evaltab - GPL-3.0-or-later
// This file is part of Evaltab.
//
// Copyright (C) 2025 Evaltab contributors
//
// Evaltab is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Evaltab is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Evaltab.  If not, see <https://www.gnu.org/licenses/>.

//! Dataset writers: each batch lands as paired CSV and JSON files.
//!
//! CSV cells for absent values are empty, compound values render as
//! compact JSON. The JSON files hold the records verbatim, pretty-printed
//! as one top-level array.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::record::{RunRecord, SampleRecord};

/// Subdirectory the rollup reports land in; created eagerly so report runs
/// never have to.
pub const ROLLUP_DIR: &str = "rollups";

pub const RUN_CSV: &str = "eval_summary.csv";
pub const RUN_JSON: &str = "eval_summary.json";
pub const SAMPLE_CSV: &str = "sample_rows.csv";
pub const SAMPLE_JSON: &str = "sample_rows.json";

const RUN_HEADER: [&str; 9] = [
    "eval_id",
    "eval_file",
    "task",
    "task_id",
    "attack_type",
    "modality",
    "models",
    "created",
    "num_samples",
];

const SAMPLE_HEADER: [&str; 10] = [
    "eval_id",
    "eval_file",
    "sample_id",
    "attack_type",
    "modality",
    "primary_metric_name",
    "primary_metric_value",
    "score",
    "score_bool",
    "tags",
];

/// Writes all four dataset files (and the rollup directory) under `out_dir`.
pub fn write_datasets(out_dir: &Path, runs: &[RunRecord], samples: &[SampleRecord]) -> Result<()> {
    std::fs::create_dir_all(out_dir.join(ROLLUP_DIR))?;
    write_run_csv(&out_dir.join(RUN_CSV), runs)?;
    write_sample_csv(&out_dir.join(SAMPLE_CSV), samples)?;
    write_json(&out_dir.join(RUN_JSON), runs)?;
    write_json(&out_dir.join(SAMPLE_JSON), samples)?;
    for name in [RUN_CSV, SAMPLE_CSV, RUN_JSON, SAMPLE_JSON] {
        info!("wrote {}", out_dir.join(name).display());
    }
    Ok(())
}

fn write_run_csv(path: &Path, runs: &[RunRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(RUN_HEADER)?;
    for run in runs {
        writer.write_record([
            run.eval_id.clone(),
            run.eval_file.clone(),
            opt_str(run.task.as_ref()),
            opt_str(run.task_id.as_ref()),
            opt_str(run.attack_type.as_ref()),
            run.modality.clone(),
            opt_str(run.models.as_ref()),
            opt_str(run.created.as_ref()),
            run.num_samples.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_sample_csv(path: &Path, samples: &[SampleRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SAMPLE_HEADER)?;
    for sample in samples {
        writer.write_record([
            sample.eval_id.clone(),
            sample.eval_file.clone(),
            opt_str(sample.sample_id.as_ref()),
            opt_str(sample.attack_type.as_ref()),
            sample.modality.clone(),
            opt_str(sample.primary_metric_name.as_ref()),
            opt_value(sample.primary_metric_value.as_ref()),
            opt_value(sample.score.as_ref()),
            float_cell(sample.score_bool),
            compact_json(&sample.tags),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn opt_str(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

// Strings go into the cell raw; everything structured becomes compact JSON.
fn opt_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(compound @ (Value::Array(_) | Value::Object(_))) => compact_json(compound),
    }
}

// Debug formatting keeps the ".0" on integral floats, so the cell reads as
// a float the way the JSON files spell it.
pub(crate) fn float_cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |x| format!("{x:?}"))
}

fn compact_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_fixture() -> RunRecord {
        RunRecord {
            eval_id: "E1".to_string(),
            eval_file: "E1.eval".to_string(),
            task: Some("injection set".to_string()),
            task_id: None,
            attack_type: Some("prompt_injection".to_string()),
            modality: "text".to_string(),
            models: Some("m1, m2".to_string()),
            created: None,
            num_samples: 1,
        }
    }

    fn sample_fixture() -> SampleRecord {
        SampleRecord {
            eval_id: "E1".to_string(),
            eval_file: "E1.eval".to_string(),
            sample_id: Some("s1".to_string()),
            attack_type: None,
            modality: "text".to_string(),
            primary_metric_name: Some("accuracy".to_string()),
            primary_metric_value: Some(json!("C")),
            score: Some(json!({"inner": 1})),
            score_bool: Some(1.0),
            tags: vec![json!("a"), json!(2)],
        }
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .expect("open csv");
        reader
            .records()
            .map(|r| r.expect("record").iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_csv_cells_render_absent_and_compound_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), &[run_fixture()], &[sample_fixture()]).expect("write");

        let rows = read_rows(&dir.path().join(RUN_CSV));
        assert_eq!(rows[0], RUN_HEADER.map(String::from).to_vec());
        assert_eq!(
            rows[1],
            ["E1", "E1.eval", "injection set", "", "prompt_injection", "text", "m1, m2", "", "1"]
        );

        let rows = read_rows(&dir.path().join(SAMPLE_CSV));
        assert_eq!(rows[0], SAMPLE_HEADER.map(String::from).to_vec());
        assert_eq!(
            rows[1],
            [
                "E1",
                "E1.eval",
                "s1",
                "",
                "text",
                "accuracy",
                "C",
                r#"{"inner":1}"#,
                "1.0",
                r#"["a",2]"#
            ]
        );
    }

    #[test]
    fn test_json_files_hold_record_arrays() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), &[run_fixture()], &[sample_fixture()]).expect("write");

        let text = std::fs::read_to_string(dir.path().join(SAMPLE_JSON)).expect("read");
        let parsed: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(parsed[0]["eval_id"], "E1");
        assert_eq!(parsed[0]["attack_type"], Value::Null);
        assert_eq!(parsed[0]["score_bool"], json!(1.0));
        assert_eq!(parsed[0]["tags"], json!(["a", 2]));

        let text = std::fs::read_to_string(dir.path().join(RUN_JSON)).expect("read");
        let parsed: Value = serde_json::from_str(&text).expect("parse");
        assert_eq!(parsed[0]["models"], "m1, m2");
        assert_eq!(parsed[0]["num_samples"], 1);
    }

    #[test]
    fn test_empty_batch_still_writes_all_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_datasets(dir.path(), &[], &[]).expect("write");

        for name in [RUN_CSV, SAMPLE_CSV, RUN_JSON, SAMPLE_JSON] {
            assert!(dir.path().join(name).exists(), "{name} missing");
        }
        assert!(dir.path().join(ROLLUP_DIR).is_dir());

        let rows = read_rows(&dir.path().join(RUN_CSV));
        assert_eq!(rows.len(), 1, "header only");
        let text = std::fs::read_to_string(dir.path().join(RUN_JSON)).expect("read");
        assert_eq!(text.trim(), "[]");
    }
}
