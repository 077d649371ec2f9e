//! Copy content-addressed blobs into a label-partitioned tree.
//!
//! Every record's blob `input_dir/<content_hash>` lands at
//! `output_dir/<label>/<content_hash>.jpg`. Runs overwrite, so repeating an
//! export converges on the same files rather than appending.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::export::file::copy_preserving;
use crate::export::types::{CopyStats, MissingBlobPolicy};
use crate::model::{is_blob_name, ExampleRecord};

/// Directory used for records without a label.
pub const UNLABELED_DIR: &str = "_unlabeled";

/// Extension given to exported blobs.
pub const EXPORT_EXTENSION: &str = "jpg";

/// Copies blobs for a list of records, sequentially.
pub struct Exporter<'a> {
    input_dir: &'a Path,
    output_dir: &'a Path,
    policy: MissingBlobPolicy,
}

impl<'a> Exporter<'a> {
    #[must_use]
    pub fn new(input_dir: &'a Path, output_dir: &'a Path) -> Self {
        Self {
            input_dir,
            output_dir,
            policy: MissingBlobPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MissingBlobPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Output path for a record.
    #[must_use]
    pub fn destination(&self, record: &ExampleRecord) -> PathBuf {
        self.output_dir
            .join(&*label_dir_name(record.label.as_deref()))
            .join(format!("{}.{EXPORT_EXTENSION}", record.content_hash))
    }

    /// Copy every record's blob, in order, advancing `progress` per record.
    ///
    /// # Errors
    ///
    /// Returns `SourceBlobMissing` at the first missing blob under the abort
    /// policy (earlier copies stay in place), `Interrupted` if `cancel` fires
    /// between records, or an I/O error from a copy.
    pub fn export(
        &self,
        records: &[ExampleRecord],
        cancel: &CancellationToken,
        progress: &ProgressBar,
    ) -> Result<CopyStats> {
        self.export_each(records, cancel, |_| progress.inc(1))
    }

    /// Like [`export`](Self::export), calling `on_record` with the index of
    /// each record once it has been copied or skipped.
    ///
    /// A content hash that is not a single file name is handled like a
    /// missing blob.
    ///
    /// # Errors
    ///
    /// Same as [`export`](Self::export).
    pub fn export_each<F>(
        &self,
        records: &[ExampleRecord],
        cancel: &CancellationToken,
        mut on_record: F,
    ) -> Result<CopyStats>
    where
        F: FnMut(usize),
    {
        info!(
            records = records.len(),
            output = %self.output_dir.display(),
            policy = ?self.policy,
            "Copying files"
        );

        let mut stats = CopyStats::default();
        let mut labels = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Interrupted);
            }

            let source = self.input_dir.join(&record.content_hash);
            if !is_blob_name(&record.content_hash) || !source.is_file() {
                match self.policy {
                    MissingBlobPolicy::Abort => {
                        return Err(Error::SourceBlobMissing {
                            example_id: record.example_id.clone(),
                            path: source,
                        });
                    }
                    MissingBlobPolicy::Skip => {
                        warn!(
                            example_id = %record.example_id,
                            path = %source.display(),
                            "Source blob missing, skipping"
                        );
                        stats.skipped += 1;
                        on_record(index);
                        continue;
                    }
                }
            }

            let destination = self.destination(record);
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            copy_preserving(&source, &destination)?;
            debug!(from = %source.display(), to = %destination.display(), "Copied");

            labels.insert(label_dir_name(record.label.as_deref()));
            stats.copied += 1;
            on_record(index);
        }

        stats.labels = labels.len();
        Ok(stats)
    }
}

/// Directory name for a label.
///
/// The label becomes one path component: separators turn into `_`, and
/// empty, `.` and `..` labels become `_`. A missing label maps to
/// [`UNLABELED_DIR`].
#[must_use]
pub fn label_dir_name(label: Option<&str>) -> Cow<'_, str> {
    match label {
        None => Cow::Borrowed(UNLABELED_DIR),
        Some("" | "." | "..") => Cow::Borrowed("_"),
        Some(l) if l.contains(['/', '\\']) => Cow::Owned(l.replace(['/', '\\'], "_")),
        Some(l) => Cow::Borrowed(l),
    }
}
