//! Read access to a single `.eval` archive (a ZIP file).
//!
//! An archive carries one run descriptor under a fixed member name and any
//! number of per-sample JSON documents under `samples/`. Everything else in
//! the archive is ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use zip::ZipArchive;

use crate::error::{EvalError, Result};

/// Member holding the run descriptor.
pub const DESCRIPTOR_MEMBER: &str = "_journal/start.json";

const SAMPLE_PREFIX: &str = "samples/";
const SAMPLE_SUFFIX: &str = ".json";

/// An opened eval archive. Sample member names are collected once at open
/// time, in lexicographic order, so iteration order is stable regardless of
/// the order entries were written in.
#[derive(Debug)]
pub struct EvalArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
    sample_names: Vec<String>,
}

impl EvalArchive {
    /// Opens the archive and verifies the descriptor member is present.
    /// An archive without one fails here with `MissingDescriptor`.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let zip = ZipArchive::new(BufReader::new(file))?;
        if !zip.file_names().any(|n| n == DESCRIPTOR_MEMBER) {
            return Err(EvalError::missing_descriptor(path));
        }
        let mut sample_names: Vec<String> = zip
            .file_names()
            .filter(|n| n.starts_with(SAMPLE_PREFIX) && n.ends_with(SAMPLE_SUFFIX))
            .map(String::from)
            .collect();
        sample_names.sort();
        Ok(Self { path: path.to_path_buf(), zip, sample_names })
    }

    /// The run descriptor. Presence was checked at open time, so a failure
    /// here means the member is not valid JSON.
    pub fn read_descriptor(&mut self) -> Result<Value> {
        self.read_member(DESCRIPTOR_MEMBER)
    }

    /// Parses one member as JSON.
    pub fn read_member(&mut self, name: &str) -> Result<Value> {
        let member = self.zip.by_name(name)?;
        serde_json::from_reader(member)
            .map_err(|e| EvalError::malformed_member(name, e.to_string()))
    }

    /// Sample member names, lexicographically sorted.
    pub fn sample_members(&self) -> &[String] {
        &self.sample_names
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base name of the archive file, for log lines and failure reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Base name without the final extension. Used as the run id of last
    /// resort when the descriptor carries none.
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}
