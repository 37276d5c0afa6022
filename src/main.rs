/// Evaltab - eval archive extraction and normalization
///
/// Copyright (C) 2025 Evaltab contributors
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use evaltab::discover::discover_archives;
use evaltab::export::write_datasets;
use evaltab::pipeline::run_batch;
use evaltab::taxonomy::Taxonomy;

#[derive(Parser, Debug)]
#[command(name = "evaltab")]
#[command(version)]
#[command(about = "Normalize .eval archives into tabular datasets", long_about = None)]
struct Args {
    /// Path to one .eval archive or a directory tree of archives
    #[arg(long, value_name = "PATH", default_value = "logs")]
    logs: PathBuf,

    /// Output directory for the datasets
    #[arg(long, value_name = "DIR", default_value = "parsed")]
    out: PathBuf,

    /// Taxonomy file; defaults to ./taxonomy.yaml, then the user config dir
    #[arg(long, value_name = "FILE")]
    taxonomy: Option<PathBuf>,

    /// Parse archives on the rayon thread pool
    #[arg(long)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG to override (e.g. RUST_LOG=evaltab=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evaltab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("evaltab {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_HASH"));

    let taxonomy_path = args.taxonomy.unwrap_or_else(default_taxonomy_path);
    let taxonomy = Taxonomy::load(&taxonomy_path)
        .with_context(|| format!("loading taxonomy from {}", taxonomy_path.display()))?;

    let archives = discover_archives(&args.logs);
    if archives.is_empty() {
        warn!("no .eval files found under {}", args.logs.display());
    }

    let outcome = run_batch(&archives, &taxonomy, args.parallel)?;
    if outcome.runs.is_empty() && !archives.is_empty() {
        warn!("no archive parsed successfully");
    }
    write_datasets(&args.out, &outcome.runs, &outcome.samples)
        .with_context(|| format!("writing datasets to {}", args.out.display()))?;

    info!(
        "{} runs, {} samples, {} failed archives",
        outcome.runs.len(),
        outcome.samples.len(),
        outcome.failures.len()
    );
    Ok(())
}

/// `./taxonomy.yaml` when present, otherwise the per-user config location.
fn default_taxonomy_path() -> PathBuf {
    let local = PathBuf::from("taxonomy.yaml");
    if local.exists() {
        return local;
    }
    dirs::config_dir().map_or(local, |dir| dir.join("evaltab").join("taxonomy.yaml"))
}
