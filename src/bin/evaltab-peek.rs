//! Quick look at archive headers without running the full pipeline: one
//! line per archive with task, category and creation time.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use evaltab::archive::EvalArchive;
use evaltab::error::Result;
use evaltab::first_nonempty;
use evaltab::json::{as_nonempty_string, get_nonempty, get_path, render_scalar};

#[derive(Parser, Debug)]
#[command(name = "evaltab-peek")]
#[command(version)]
#[command(about = "Print header fields of eval archives", long_about = None)]
struct Args {
    /// Archives to inspect
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    // Summary lines go to stdout; the subscriber keeps any log output on
    // stderr like the other binaries.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("evaltab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut files = Args::parse().files;
    files.sort();
    for path in &files {
        // A broken archive gets its error line; the rest still print.
        match peek(path) {
            Ok(line) => println!("{line}"),
            Err(err) => println!("{} | ERROR: {err}", display_name(path)),
        }
    }
}

fn peek(path: &Path) -> Result<String> {
    let mut archive = EvalArchive::open(path)?;
    let descriptor = archive.read_descriptor()?;
    let eval_info = descriptor.get("eval").unwrap_or(&Value::Null);

    let task = first_nonempty!(
        get_nonempty(eval_info, "task"),
        get_nonempty(eval_info, "task_registry_name")
    )
    .and_then(as_nonempty_string);
    let category = get_path(eval_info, &["task_attribs", "category"]).and_then(as_nonempty_string);
    let created = eval_info.get("created").and_then(render_scalar).map(|c| normalize_created(&c));

    Ok(format!(
        "{} | task={} | category={} | created={}",
        archive.file_name(),
        task.as_deref().unwrap_or("-"),
        category.as_deref().unwrap_or("-"),
        created.as_deref().unwrap_or("-"),
    ))
}

// Timestamps come in with varying offsets; print them in UTC when they
// parse, verbatim when they do not.
fn normalize_created(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|_| raw.to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
