//! Export configuration and statistics types.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Where the export writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportMode {
    /// Copy blobs into `<output_dir>/<label>/<hash>.jpg` and write
    /// `lobe-<project>.csv` into `output_dir`.
    Copy { output_dir: PathBuf },
    /// Copy nothing; write `lobe-<project>_export.csv` into `dir`.
    InPlace { dir: PathBuf },
}

impl ExportMode {
    /// Directory receiving the manifest (and copied files in copy mode).
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        match self {
            Self::Copy { output_dir } => output_dir,
            Self::InPlace { dir } => dir,
        }
    }

    #[must_use]
    pub fn copies_files(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    /// Manifest file name for `project` in this mode.
    #[must_use]
    pub fn manifest_file_name(&self, project: &str) -> String {
        match self {
            Self::Copy { .. } => format!("lobe-{project}.csv"),
            Self::InPlace { .. } => format!("lobe-{project}_export.csv"),
        }
    }
}

/// What the copy loop does when a record's blob file is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingBlobPolicy {
    /// Stop at the first missing blob and fail the run.
    #[default]
    Abort,
    /// Log, count as skipped, and continue with the next record.
    Skip,
}

/// Statistics for the copy stage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CopyStats {
    /// Files written to the output tree.
    pub copied: usize,
    /// Records skipped because their blob was missing.
    pub skipped: usize,
    /// Label directories touched.
    pub labels: usize,
}

/// Result of a completed export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub project: String,
    /// Records read from the project database.
    pub records: usize,
    /// Whether the phash column was computed.
    pub fingerprinted: bool,
    /// Records with a fingerprint.
    pub fingerprints: usize,
    /// Records whose image could not be read.
    pub unreadable: usize,
    /// Fingerprint workers used, 0 when fingerprinting was off.
    pub workers: usize,
    /// Copy stage stats, `None` in in-place mode.
    pub copy: Option<CopyStats>,
    pub manifest: PathBuf,
    pub elapsed_ms: u128,
}
