//! CSV manifest of exported examples.
//!
//! One row per record in read order, never filtered or re-sorted. Absent
//! values are written as empty fields. The `phash` column only exists when
//! fingerprints were attached to the table.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::export::file::atomic_write_with;
use crate::model::ExampleTable;

/// Header for the base columns.
pub const BASE_COLUMNS: [&str; 6] = [
    "example_id",
    "content_hash",
    "filename",
    "label",
    "date",
    "accuracy",
];

/// Header for the optional fingerprint column.
pub const PHASH_COLUMN: &str = "phash";

/// Column names for a table.
#[must_use]
pub fn header(table: &ExampleTable) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if table.is_fingerprinted() {
        columns.push(PHASH_COLUMN);
    }
    columns
}

/// Write `table` as CSV to `path`, atomically.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_manifest(path: &Path, table: &ExampleTable) -> Result<usize> {
    atomic_write_with(path, |writer| {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(header(table))?;

        for record in table.records() {
            let mut row = vec![
                record.example_id.as_str(),
                record.content_hash.as_str(),
                record.filename.as_deref().unwrap_or(""),
                record.label.as_deref().unwrap_or(""),
                record.modified_at.as_deref().unwrap_or(""),
                record.accuracy.as_deref().unwrap_or(""),
            ];
            if table.is_fingerprinted() {
                row.push(record.perceptual_hash.as_deref().unwrap_or(""));
            }
            csv.write_record(&row)?;
        }

        csv.flush()?;
        Ok(())
    })?;

    info!(path = %path.display(), rows = table.len(), "Manifest written");
    Ok(table.len())
}
