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

//! Keyword taxonomy loaded from a YAML file.
//!
//! The taxonomy drives classification (keyword tables for attack type and
//! modality) and score normalization (the label-to-score map). Table order
//! in the document is significant: the first matching keyword wins.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use tracing::info;

use crate::error::{EvalError, Result};

/// Raw document shape. All sections are optional; a sparse taxonomy is a
/// valid taxonomy. Values are kept loose here because real taxonomy files
/// mix strings and bare numbers; narrowing happens in `load`.
#[derive(Debug, Default, Deserialize)]
struct TaxonomyDoc {
    #[serde(default)]
    attack_keywords: IndexMap<String, YamlValue>,
    #[serde(default)]
    modality_keywords: IndexMap<String, YamlValue>,
    #[serde(default)]
    score_map: IndexMap<String, YamlValue>,
}

/// Keyword tables and the grade map. `IndexMap` keeps the document order,
/// which is the tie-break when several keywords occur in one haystack.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    /// Keyword fragment to attack label.
    attack_keywords: IndexMap<String, String>,
    /// Keyword fragment to modality label.
    modality_keywords: IndexMap<String, String>,
    /// Grade label to numeric score, keys uppercased at load.
    score_map: IndexMap<String, f64>,
}

impl Taxonomy {
    /// Loads the taxonomy from `path`. A missing file yields an empty
    /// taxonomy (every lookup misses); an unreadable or malformed file is
    /// an error, since classifying a whole batch against a half-loaded
    /// rule set would be worse than stopping.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no taxonomy at {}, classification will use fallbacks", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::taxonomy(path, e.to_string()))?;
        let doc: TaxonomyDoc = serde_yaml::from_str(&text)
            .map_err(|e| EvalError::taxonomy(path, e.to_string()))?;
        let mut score_map = IndexMap::with_capacity(doc.score_map.len());
        for (k, v) in &doc.score_map {
            score_map.insert(k.to_uppercase(), score_value(path, k, v)?);
        }
        Ok(Self {
            attack_keywords: label_table(doc.attack_keywords),
            modality_keywords: label_table(doc.modality_keywords),
            score_map,
        })
    }

    /// Label of the first attack keyword contained in the haystack.
    pub fn attack_label(&self, haystack: &str) -> Option<&str> {
        Self::match_table(&self.attack_keywords, haystack)
    }

    /// Label of the first modality keyword contained in the haystack.
    pub fn modality_label(&self, haystack: &str) -> Option<&str> {
        Self::match_table(&self.modality_keywords, haystack)
    }

    // The haystack is lowercased; keywords are used verbatim, so tables are
    // expected to carry lowercase fragments (as the shipped taxonomy does).
    fn match_table<'a>(table: &'a IndexMap<String, String>, haystack: &str) -> Option<&'a str> {
        let hs = haystack.to_lowercase();
        table.iter().find(|(k, _)| hs.contains(k.as_str())).map(|(_, v)| v.as_str())
    }

    /// Numeric score for a grade label, matched case-insensitively.
    pub fn score_for(&self, label: &str) -> Option<f64> {
        self.score_map.get(&label.to_uppercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.attack_keywords.is_empty()
            && self.modality_keywords.is_empty()
            && self.score_map.is_empty()
    }
}

// Keyword labels are used as opaque text, so bare YAML numbers stringify.
// A non-scalar label becomes the empty string, which still ends a table
// scan but never classifies anything.
fn label_table(raw: IndexMap<String, YamlValue>) -> IndexMap<String, String> {
    raw.into_iter().map(|(k, v)| (k, scalar_text(&v))).collect()
}

fn scalar_text(value: &YamlValue) -> String {
    match value {
        YamlValue::String(s) => s.clone(),
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null | YamlValue::Sequence(_) | YamlValue::Mapping(_) | YamlValue::Tagged(_) => {
            String::new()
        }
    }
}

fn score_value(path: &Path, label: &str, value: &YamlValue) -> Result<f64> {
    let parsed = match value {
        YamlValue::Number(n) => n.as_f64(),
        YamlValue::String(s) => s.trim().parse::<f64>().ok(),
        YamlValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        YamlValue::Null | YamlValue::Sequence(_) | YamlValue::Mapping(_) | YamlValue::Tagged(_) => {
            None
        }
    };
    parsed.ok_or_else(|| {
        EvalError::taxonomy(path, format!("score_map entry {label:?} is not numeric"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::taxonomy_from_str;

    #[test]
    fn test_first_keyword_wins_in_document_order() {
        let tax = taxonomy_from_str(
            r"
attack_keywords:
  injection: prompt_injection
  prompt: generic_prompt
",
        );
        // Both fragments occur; the earlier table entry decides.
        assert_eq!(tax.attack_label("a prompt injection probe"), Some("prompt_injection"));
        assert_eq!(tax.attack_label("prompted reply"), Some("generic_prompt"));
        assert_eq!(tax.attack_label("benign math task"), None);
    }

    #[test]
    fn test_haystack_is_lowercased_before_matching() {
        let tax = taxonomy_from_str(
            r"
attack_keywords:
  injection: prompt_injection
modality_keywords:
  audio: audio
",
        );
        assert_eq!(tax.attack_label("INJECTION Probe"), Some("prompt_injection"));
        assert_eq!(tax.modality_label("AUDIO transcript"), Some("audio"));
    }

    #[test]
    fn test_score_map_keys_uppercased_at_load() {
        let tax = taxonomy_from_str(
            r"
score_map:
  c: 1.0
  I: 0
  P: 0.5
",
        );
        assert_eq!(tax.score_for("C"), Some(1.0));
        assert_eq!(tax.score_for("c"), Some(1.0));
        assert_eq!(tax.score_for("i"), Some(0.0));
        assert_eq!(tax.score_for("Q"), None);
    }

    #[test]
    fn test_loose_value_shapes() {
        // Quoted scores and bare-number labels both occur in the wild.
        let tax = taxonomy_from_str(
            r#"
attack_keywords:
  variant_7: 7
score_map:
  C: "1.0"
  I: 0
"#,
        );
        assert_eq!(tax.attack_label("task variant_7 run"), Some("7"));
        assert_eq!(tax.score_for("C"), Some(1.0));
        assert_eq!(tax.score_for("I"), Some(0.0));
    }

    #[test]
    fn test_non_numeric_score_value_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taxonomy.yaml");
        std::fs::write(&path, "score_map:\n  C: correct\n").expect("write");
        let err = Taxonomy::load(&path).expect_err("must fail");
        assert!(matches!(err, EvalError::Taxonomy { .. }));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let tax = taxonomy_from_str("score_map:\n  C: 1.0\n");
        assert_eq!(tax.attack_label("injection"), None);
        assert_eq!(tax.modality_label("audio"), None);
        assert_eq!(tax.score_for("C"), Some(1.0));
    }

    #[test]
    fn test_missing_file_yields_empty_taxonomy() {
        let tax =
            Taxonomy::load(Path::new("/nonexistent/taxonomy.yaml")).expect("empty, not error");
        assert!(tax.is_empty());
        assert_eq!(tax.attack_label("injection"), None);
        assert_eq!(tax.score_for("C"), None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("taxonomy.yaml");
        std::fs::write(&path, "attack_keywords: [not, a, mapping]").expect("write");
        let err = Taxonomy::load(&path).expect_err("must fail");
        assert!(matches!(err, EvalError::Taxonomy { .. }));
        assert!(!err.is_archive_scoped());
    }
}
