//! Parallel fingerprinting over a dedicated worker pool.

use std::path::Path;

use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fingerprint::phash;
use crate::model::is_blob_name;

/// Minimum number of items a worker takes at once.
pub const BATCH_SIZE: usize = 5;

/// Fixed-size pool computing perceptual hashes.
///
/// Workers share nothing: each item reads one file and fills one slot of a
/// pre-sized result buffer at the item's input position.
pub struct FingerprintPool {
    pool: ThreadPool,
    workers: usize,
}

impl FingerprintPool {
    /// Create a pool with `workers` threads.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for zero workers, or an error if the threads
    /// cannot be spawned.
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidArgument(
                "worker count must be at least 1".to_string(),
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("phash-{i}"))
            .build()
            .map_err(|e| Error::Other(format!("failed to start fingerprint workers: {e}")))?;

        Ok(Self { pool, workers })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fingerprint `base_dir/<id>` for every id.
    ///
    /// The result has exactly one entry per id, in input order. Missing or
    /// undecodable files give `None` at their position and never fail the
    /// batch, and so do ids that are not a single file name. `progress` is
    /// advanced once per finished item.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if `cancel` fires before the batch completes;
    /// remaining items are skipped and no partial result is returned.
    pub fn fingerprint_all(
        &self,
        base_dir: &Path,
        ids: &[String],
        cancel: &CancellationToken,
        progress: &ProgressBar,
    ) -> Result<Vec<Option<String>>> {
        info!(items = ids.len(), workers = self.workers, "Computing fingerprints");

        let mut results = Vec::with_capacity(ids.len());
        self.pool.install(|| {
            ids.par_iter()
                .with_min_len(BATCH_SIZE)
                .map_init(phash::hasher, |hasher, id| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let fingerprint = if is_blob_name(id) {
                        phash::fingerprint_file(hasher, &base_dir.join(id))
                    } else {
                        debug!(id = %id, "Not a blob file name, fingerprint absent");
                        None
                    };
                    progress.inc(1);
                    fingerprint
                })
                .collect_into_vec(&mut results);
        });

        if cancel.is_cancelled() {
            return Err(Error::Interrupted);
        }

        let absent = results.iter().filter(|r| r.is_none()).count();
        debug!(total = results.len(), absent, "Fingerprints computed");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::phash::tests::write_image_blob;
    use tempfile::TempDir;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(
            FingerprintPool::new(0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_single_worker_missing_second() {
        let temp_dir = TempDir::new().unwrap();
        write_image_blob(&temp_dir.path().join("a1"), 0);

        let pool = FingerprintPool::new(1).unwrap();
        let results = pool
            .fingerprint_all(
                temp_dir.path(),
                &ids(&["a1", "b2"]),
                &CancellationToken::new(),
                &ProgressBar::hidden(),
            )
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().map(String::len), Some(16));
        assert!(results[1].is_none());
    }

    #[test]
    fn test_results_aligned_with_input_for_any_worker_count() {
        let temp_dir = TempDir::new().unwrap();
        let mut names = Vec::new();
        for i in 0..23u8 {
            let name = format!("blob{i:02}");
            // Every third id has no backing file
            if i % 3 != 0 {
                write_image_blob(&temp_dir.path().join(&name), i * 11);
            }
            names.push(name);
        }

        let hasher = phash::hasher();
        let expected: Vec<_> = names
            .iter()
            .map(|n| phash::fingerprint_file(&hasher, &temp_dir.path().join(n)))
            .collect();

        for workers in [1, 2, 4, 8] {
            let pool = FingerprintPool::new(workers).unwrap();
            let results = pool
                .fingerprint_all(
                    temp_dir.path(),
                    &names,
                    &CancellationToken::new(),
                    &ProgressBar::hidden(),
                )
                .unwrap();
            assert_eq!(results, expected, "workers = {workers}");
        }
    }

    #[test]
    fn test_corrupt_file_only_affects_its_position() {
        let temp_dir = TempDir::new().unwrap();
        write_image_blob(&temp_dir.path().join("good1"), 1);
        std::fs::write(temp_dir.path().join("bad"), b"garbage").unwrap();
        write_image_blob(&temp_dir.path().join("good2"), 2);

        let pool = FingerprintPool::new(2).unwrap();
        let results = pool
            .fingerprint_all(
                temp_dir.path(),
                &ids(&["good1", "bad", "good2"]),
                &CancellationToken::new(),
                &ProgressBar::hidden(),
            )
            .unwrap();

        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_some());
    }

    #[test]
    fn test_empty_input() {
        let temp_dir = TempDir::new().unwrap();
        let pool = FingerprintPool::new(2).unwrap();
        let results = pool
            .fingerprint_all(
                temp_dir.path(),
                &[],
                &CancellationToken::new(),
                &ProgressBar::hidden(),
            )
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_progress_counts_items() {
        let temp_dir = TempDir::new().unwrap();
        let pool = FingerprintPool::new(3).unwrap();
        let progress = ProgressBar::hidden();
        pool.fingerprint_all(
            temp_dir.path(),
            &ids(&["a", "b", "c", "d", "e", "f", "g"]),
            &CancellationToken::new(),
            &progress,
        )
        .unwrap();
        assert_eq!(progress.position(), 7);
    }

    #[test]
    fn test_cancelled_returns_interrupted() {
        let temp_dir = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let pool = FingerprintPool::new(2).unwrap();
        let result = pool.fingerprint_all(
            temp_dir.path(),
            &ids(&["a", "b"]),
            &cancel,
            &ProgressBar::hidden(),
        );
        assert!(matches!(result, Err(Error::Interrupted)));
    }

    #[test]
    fn test_ids_outside_base_dir_are_absent() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = temp_dir.path().join("blobs");
        std::fs::create_dir(&blobs).unwrap();
        write_image_blob(&temp_dir.path().join("outside"), 7);
        write_image_blob(&blobs.join("inside"), 7);

        let pool = FingerprintPool::new(2).unwrap();
        let results = pool
            .fingerprint_all(
                &blobs,
                &ids(&["../outside", "inside", ".."]),
                &CancellationToken::new(),
                &ProgressBar::hidden(),
            )
            .unwrap();

        assert!(results[0].is_none());
        assert!(results[1].is_some());
        assert!(results[2].is_none());
    }
}
