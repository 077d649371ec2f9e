//! File operations for export.
//!
//! - Atomic writes: write to a temp sibling, sync to disk, then rename
//! - Blob copies that carry the source timestamps over when possible

use std::fs::{self, File, FileTimes};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Write a file atomically through a buffered writer.
///
/// `write` fills a temporary file next to `path` (same name plus `.tmp`);
/// after a flush and `fsync` the temp file is renamed over `path`. If `write`
/// fails the temp file is removed and `path` is left untouched.
///
/// # Errors
///
/// Returns the error from `write` or from any file operation.
pub fn atomic_write_with<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = write_synced(&temp_path, write) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

fn write_synced<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)?;
    writer.flush()?;
    // Sync to disk before rename
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Copy `from` to `to`, overwriting, and carry timestamps over.
///
/// Content and permissions come from `fs::copy`. Access and modification
/// times are best effort: failures are logged and ignored.
///
/// # Errors
///
/// Returns an error if the content copy fails.
pub fn copy_preserving(from: &Path, to: &Path) -> Result<u64> {
    let bytes = fs::copy(from, to)?;

    if let Err(e) = copy_times(from, to) {
        debug!(path = %to.display(), error = %e, "Could not preserve timestamps");
    }
    Ok(bytes)
}

fn copy_times(from: &Path, to: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options().write(true).open(to)?.set_times(times)
}
