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

//! Batch orchestration: parse every archive, isolate failures, keep order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::archive::EvalArchive;
use crate::builder::build_records;
use crate::error::Result;
use crate::record::{RunRecord, SampleRecord};
use crate::taxonomy::Taxonomy;

/// One archive that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFailure {
    pub file: String,
    pub error: String,
}

/// Everything a batch produced. Runs and samples keep the order of the
/// archive list; a failed archive contributes a failure entry and nothing
/// else.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub runs: Vec<RunRecord>,
    pub samples: Vec<SampleRecord>,
    pub failures: Vec<ArchiveFailure>,
}

/// Parses the given archives. With `parallel` the work spreads over the
/// rayon pool; collection preserves input order either way, so the output
/// datasets come out identical.
///
/// Archive-scoped errors are logged and recorded as `failures`; any other
/// error aborts the batch.
pub fn run_batch(paths: &[PathBuf], taxonomy: &Taxonomy, parallel: bool) -> Result<BatchOutcome> {
    let results: Vec<Result<(RunRecord, Vec<SampleRecord>)>> = if parallel {
        paths.par_iter().map(|p| parse_archive(p, taxonomy)).collect()
    } else {
        paths.iter().map(|p| parse_archive(p, taxonomy)).collect()
    };

    let mut outcome = BatchOutcome::default();
    for (path, result) in paths.iter().zip(results) {
        let file = display_name(path);
        match result {
            Ok((run, samples)) => {
                info!("{file}: {} samples", run.num_samples);
                outcome.runs.push(run);
                outcome.samples.extend(samples);
            }
            Err(err) if err.is_archive_scoped() => {
                warn!("{file}: {err}");
                outcome.failures.push(ArchiveFailure { file, error: err.to_string() });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(outcome)
}

/// Opens and parses a single archive.
pub fn parse_archive(path: &Path, taxonomy: &Taxonomy) -> Result<(RunRecord, Vec<SampleRecord>)> {
    let mut archive = EvalArchive::open(path)?;
    build_records(&mut archive, taxonomy)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
