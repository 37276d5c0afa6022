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

//! Accuracy rollups over previously exported datasets.
//!
//! The report step is deliberately decoupled from parsing: it reads the
//! dataset files back (JSON preferred, CSV as fallback), so it also works
//! on datasets produced elsewhere. Rows with a missing group key are
//! dropped from that rollup; `n` counts rows with a sample id and
//! `accuracy` averages the rows that have a normalized score.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::Result;
use crate::export::{float_cell, RUN_CSV, RUN_JSON, SAMPLE_CSV, SAMPLE_JSON};
use crate::json::render_scalar;

/// The sample-row fields the rollups need. Unknown columns are ignored, so
/// the loader accepts datasets with extra fields.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SampleRow {
    pub eval_id: Option<String>,
    pub sample_id: Option<String>,
    pub attack_type: Option<String>,
    pub modality: Option<String>,
    pub score_bool: Option<f64>,
}

/// The run-row fields the model rollup needs.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunRow {
    pub eval_id: Option<String>,
    /// Comma-joined model list as exported.
    pub models: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct GroupStats {
    /// Rows carrying a sample id.
    pub n: usize,
    sum: f64,
    scored: usize,
}

impl GroupStats {
    fn add(&mut self, row: &SampleRow) {
        if row.sample_id.is_some() {
            self.n += 1;
        }
        if let Some(x) = row.score_bool {
            self.sum += x;
            self.scored += 1;
        }
    }

    /// Mean of the normalized scores, absent when no row had one.
    pub fn accuracy(&self) -> Option<f64> {
        (self.scored > 0).then(|| self.sum / self.scored as f64)
    }
}

/// Groups samples by attack type, dropping unclassified rows.
pub fn by_attack(samples: &[SampleRow]) -> BTreeMap<String, GroupStats> {
    group_by_key(samples, |row| row.attack_type.as_ref())
}

/// Groups samples by modality.
pub fn by_modality(samples: &[SampleRow]) -> BTreeMap<String, GroupStats> {
    group_by_key(samples, |row| row.modality.as_ref())
}

/// Groups samples by (model, attack type).
///
/// The run rows supply the model list per eval id; every model of a run
/// counts each of its samples once. Samples of runs without models, or
/// with an eval id no run row matches, contribute nothing.
pub fn by_model_attack(
    samples: &[SampleRow],
    runs: &[RunRow],
) -> BTreeMap<(String, String), GroupStats> {
    let mut models_by_eval: HashMap<&str, Vec<&str>> = HashMap::new();
    for run in runs {
        let Some(eval_id) = run.eval_id.as_deref() else { continue };
        let models = run.models.as_deref().unwrap_or_default();
        models_by_eval
            .entry(eval_id)
            .or_default()
            .extend(models.split(',').map(str::trim).filter(|m| !m.is_empty()));
    }

    let mut groups: BTreeMap<(String, String), GroupStats> = BTreeMap::new();
    for row in samples {
        let (Some(eval_id), Some(attack)) = (&row.eval_id, &row.attack_type) else { continue };
        let Some(models) = models_by_eval.get(eval_id.as_str()) else { continue };
        for model in models {
            groups.entry(((*model).to_string(), attack.clone())).or_default().add(row);
        }
    }
    groups
}

fn group_by_key<F>(samples: &[SampleRow], key: F) -> BTreeMap<String, GroupStats>
where
    F: Fn(&SampleRow) -> Option<&String>,
{
    let mut groups: BTreeMap<String, GroupStats> = BTreeMap::new();
    for row in samples {
        if let Some(k) = key(row) {
            groups.entry(k.clone()).or_default().add(row);
        }
    }
    groups
}

/// Loads the sample dataset from `dir`, preferring the JSON file.
pub fn load_samples(dir: &Path) -> Result<Vec<SampleRow>> {
    let json_path = dir.join(SAMPLE_JSON);
    if json_path.exists() {
        let docs: Vec<Value> = serde_json::from_reader(BufReader::new(File::open(&json_path)?))?;
        return Ok(docs.iter().map(sample_from_value).collect());
    }
    read_csv_rows(&dir.join(SAMPLE_CSV))
}

/// Loads the run dataset from `dir`, preferring the JSON file.
pub fn load_runs(dir: &Path) -> Result<Vec<RunRow>> {
    let json_path = dir.join(RUN_JSON);
    if json_path.exists() {
        let docs: Vec<Value> = serde_json::from_reader(BufReader::new(File::open(&json_path)?))?;
        return Ok(docs
            .iter()
            .map(|v| RunRow {
                eval_id: v.get("eval_id").and_then(render_scalar),
                models: v.get("models").and_then(render_scalar),
            })
            .collect());
    }
    read_csv_rows(&dir.join(RUN_CSV))
}

// Scalars are rendered so datasets written by other tools (numeric sample
// ids for instance) still load.
fn sample_from_value(doc: &Value) -> SampleRow {
    SampleRow {
        eval_id: doc.get("eval_id").and_then(render_scalar),
        sample_id: doc.get("sample_id").and_then(render_scalar),
        attack_type: doc.get("attack_type").and_then(render_scalar),
        modality: doc.get("modality").and_then(render_scalar),
        score_bool: doc.get("score_bool").and_then(Value::as_f64),
    }
}

fn read_csv_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Computes the three rollups from the datasets in `parsed_dir` and writes
/// them as CSV files under `out_dir`.
pub fn write_rollups(parsed_dir: &Path, out_dir: &Path) -> Result<()> {
    let samples = load_samples(parsed_dir)?;
    let runs = load_runs(parsed_dir)?;
    std::fs::create_dir_all(out_dir)?;

    write_single_key(&out_dir.join("by_attack.csv"), "attack_type", &by_attack(&samples))?;
    write_single_key(&out_dir.join("by_modality.csv"), "modality", &by_modality(&samples))?;
    write_model_attack(&out_dir.join("by_model_attack.csv"), &by_model_attack(&samples, &runs))?;

    for name in ["by_attack.csv", "by_modality.csv", "by_model_attack.csv"] {
        info!("wrote {}", out_dir.join(name).display());
    }
    Ok(())
}

fn write_single_key(
    path: &Path,
    key_column: &str,
    groups: &BTreeMap<String, GroupStats>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([key_column, "n", "accuracy"])?;
    for (key, stats) in groups {
        writer.write_record([key.clone(), stats.n.to_string(), float_cell(stats.accuracy())])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_model_attack(
    path: &Path,
    groups: &BTreeMap<(String, String), GroupStats>,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["model", "attack_type", "n", "accuracy"])?;
    for ((model, attack), stats) in groups {
        writer.write_record([
            model.clone(),
            attack.clone(),
            stats.n.to_string(),
            float_cell(stats.accuracy()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
