use std::path::PathBuf;
use thiserror::Error;

/// Evaltab's error types. Archive-scoped variants fail one archive and are
/// caught at the batch boundary; a taxonomy failure is fatal to the process.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: missing {}", .archive.display(), crate::archive::DESCRIPTOR_MEMBER)]
    MissingDescriptor { archive: PathBuf },

    #[error("malformed member {member}: {reason}")]
    MalformedMember { member: String, reason: String },

    #[error("taxonomy {}: {reason}", .path.display())]
    Taxonomy { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, EvalError>;

impl EvalError {
    pub fn missing_descriptor<P: Into<PathBuf>>(archive: P) -> Self {
        Self::MissingDescriptor { archive: archive.into() }
    }

    pub fn malformed_member<S1: Into<String>, S2: Into<String>>(member: S1, reason: S2) -> Self {
        Self::MalformedMember { member: member.into(), reason: reason.into() }
    }

    pub fn taxonomy<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Taxonomy { path: path.into(), reason: reason.into() }
    }

    /// True for errors confined to a single archive. The batch loop skips
    /// the archive and keeps going; anything else should stop the process.
    pub fn is_archive_scoped(&self) -> bool {
        match self {
            Self::Io(_)
            | Self::Zip(_)
            | Self::MissingDescriptor { .. }
            | Self::MalformedMember { .. } => true,
            Self::Csv(_) | Self::Json(_) | Self::Taxonomy { .. } => false,
        }
    }
}
