//! Rollup CLI: reads previously exported datasets and writes the accuracy
//! breakdowns as CSV files.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use evaltab::report::write_rollups;

#[derive(Parser, Debug)]
#[command(name = "evaltab-report")]
#[command(version)]
#[command(about = "Accuracy rollups over evaltab datasets", long_about = None)]
struct Args {
    /// Directory holding the eval_summary / sample_rows datasets
    #[arg(long, value_name = "DIR", default_value = "parsed")]
    parsed: PathBuf,

    /// Output directory for the rollup CSVs
    #[arg(long, value_name = "DIR", default_value = "parsed/rollups")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evaltab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    write_rollups(&args.parsed, &args.out)
        .with_context(|| format!("building rollups from {}", args.parsed.display()))
}
