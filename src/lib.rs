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

//! Evaltab reads `.eval` archives (ZIP files written by eval runners)
//! directly, without any runner SDK, and normalizes them into two flat
//! datasets: one row per run and one row per sample. A small YAML taxonomy
//! drives attack/modality classification and grade-to-score mapping.
//!
//! The pipeline, one stage per module: [`discover`] finds archives,
//! [`archive`] reads one, [`builder`] turns its documents into
//! [`record`] rows (using [`scoring`] and [`classify`]), [`pipeline`]
//! runs the batch with per-archive failure isolation, [`export`] writes
//! the datasets and [`report`] computes accuracy rollups from them.

pub mod archive;
pub mod builder;
pub mod classify;
pub mod discover;
pub mod error;
pub mod export;
pub mod json;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod scoring;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{EvalError, Result};
pub use record::{RunRecord, SampleRecord};
pub use taxonomy::Taxonomy;
