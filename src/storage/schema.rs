//! Lobe project database schema expectations.
//!
//! The project database belongs to the Lobe desktop app and is never written
//! by this crate. We only describe the subset of tables and columns the export
//! query depends on, and verify it before running the query.

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Tables and columns the export query reads.
pub const EXPECTED_TABLES: &[(&str, &[&str])] = &[
    ("example_images", &["example_id", "hash", "metadata"]),
    ("example_labels", &["example_id", "label", "modified"]),
    ("example_metrics", &["example_id", "accuracy"]),
    ("examples", &["example_id"]),
];

/// Join every example with its image, label and metrics.
///
/// Column order is relied on by the row mapper in `reader.rs`. Rows sharing a
/// `modified` value are ordered by `example_id` so output is deterministic.
pub const EXAMPLES_QUERY: &str = r"
SELECT
    i.example_id,
    i.hash,
    json_extract(i.metadata, '$.filename') AS filename,
    l.label,
    l.modified AS date,
    m.accuracy
FROM example_images i
JOIN example_labels l ON i.example_id = l.example_id
JOIN example_metrics m ON i.example_id = m.example_id
JOIN examples e ON i.example_id = e.example_id
ORDER BY l.modified, i.example_id
";

/// Check that every expected table and column exists.
///
/// # Errors
///
/// Returns `SchemaMismatch` naming the first missing table or column, or the
/// underlying database error if the schema cannot be inspected at all.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;

    for (table, columns) in EXPECTED_TABLES {
        let present: Vec<String> = stmt
            .query_map([*table], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;

        if present.is_empty() {
            return Err(Error::SchemaMismatch(format!("missing table `{table}`")));
        }

        if let Some(column) = columns
            .iter()
            .find(|c| !present.iter().any(|p| p.eq_ignore_ascii_case(c)))
        {
            return Err(Error::SchemaMismatch(format!(
                "missing column `{table}.{column}`"
            )));
        }
    }

    Ok(())
}
