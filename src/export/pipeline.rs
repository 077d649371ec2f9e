//! End-to-end export run.
//!
//! Stages run in a fixed sequence on the calling thread:
//! 1. Validate the output target
//! 2. Read metadata from the project database
//! 3. Fingerprint images on the worker pool (optional)
//! 4. Copy blobs into label folders (copy mode only)
//! 5. Write the manifest
//!
//! The cancellation token is checked between stages and inside the long
//! stages. An interrupted run never writes a manifest.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{default_workers, ProjectPaths};
use crate::error::{Error, Result};
use crate::export::copy::Exporter;
use crate::export::manifest::write_manifest;
use crate::export::types::{ExportMode, ExportSummary, MissingBlobPolicy};
use crate::fingerprint::FingerprintPool;
use crate::storage::MetadataReader;

/// Everything one export run needs.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub project: ProjectPaths,
    pub mode: ExportMode,
    /// Compute the `phash` column.
    pub fingerprint: bool,
    /// Fingerprint workers; `None` uses the host's available parallelism.
    pub workers: Option<usize>,
    pub missing_blobs: MissingBlobPolicy,
    /// Reserved for cached intermediate data; not read by the pipeline yet.
    pub cache_dir: Option<PathBuf>,
    /// Draw progress bars on stderr.
    pub show_progress: bool,
}

impl ExportOptions {
    #[must_use]
    pub fn new(project: ProjectPaths, mode: ExportMode) -> Self {
        Self {
            project,
            mode,
            fingerprint: false,
            workers: None,
            missing_blobs: MissingBlobPolicy::default(),
            cache_dir: None,
            show_progress: false,
        }
    }
}

/// Check that the output target exists and is a directory.
///
/// # Errors
///
/// Returns `InvalidOutputTarget` otherwise. A missing directory is never
/// created here.
pub fn validate_output_target(mode: &ExportMode) -> Result<()> {
    let dir = mode.target_dir();
    if !dir.is_dir() {
        return Err(Error::InvalidOutputTarget {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Run an export.
///
/// # Errors
///
/// Returns the first fatal error: `InvalidOutputTarget` before any work,
/// `DataSourceUnavailable`/`SchemaMismatch` from the metadata read,
/// `SourceBlobMissing` under the abort policy, `Interrupted` if `cancel`
/// fires, or an I/O error.
pub fn run_export(options: &ExportOptions, cancel: &CancellationToken) -> Result<ExportSummary> {
    let started = Instant::now();
    let target = options.mode.target_dir();

    validate_output_target(&options.mode)?;
    // No-op for a validated directory
    fs::create_dir_all(target)?;

    if let Some(cache_dir) = &options.cache_dir {
        debug!(path = %cache_dir.display(), "Cache directory reserved, not used");
    }

    let reader = MetadataReader::open(&options.project.db_path)?;
    let mut table = reader.read_examples()?;
    info!(project = %options.project.id, items = table.len(), "Found items");

    let mut workers = 0;
    if options.fingerprint {
        check_cancelled(cancel)?;
        let pool = FingerprintPool::new(options.workers.unwrap_or_else(default_workers))?;
        workers = pool.workers();

        let progress = progress_bar(table.len(), "phash", options.show_progress);
        let fingerprints = pool.fingerprint_all(
            &options.project.blob_dir,
            &table.content_hashes(),
            cancel,
            &progress,
        );
        progress.finish_and_clear();
        table.attach_fingerprints(fingerprints?)?;
    }

    let copy = if let ExportMode::Copy { output_dir } = &options.mode {
        check_cancelled(cancel)?;
        let progress = progress_bar(table.len(), "copy", options.show_progress);
        let stats = Exporter::new(&options.project.blob_dir, output_dir)
            .with_policy(options.missing_blobs)
            .export(table.records(), cancel, &progress);
        progress.finish_and_clear();
        Some(stats?)
    } else {
        None
    };

    check_cancelled(cancel)?;
    let manifest = target.join(options.mode.manifest_file_name(&options.project.id));
    write_manifest(&manifest, &table)?;

    let fingerprints = table
        .records()
        .iter()
        .filter(|r| r.perceptual_hash.is_some())
        .count();

    Ok(ExportSummary {
        project: options.project.id.clone(),
        records: table.len(),
        fingerprinted: table.is_fingerprinted(),
        fingerprints,
        unreadable: if table.is_fingerprinted() {
            table.len() - fingerprints
        } else {
            0
        },
        workers,
        copy,
        manifest,
        elapsed_ms: started.elapsed().as_millis(),
    })
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Interrupted);
    }
    Ok(())
}

fn progress_bar(len: usize, stage: &'static str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{prefix:>6} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_prefix(stage);
    bar
}
