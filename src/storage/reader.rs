//! Read-only access to a Lobe project database.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{ExampleRecord, ExampleTable};
use crate::storage::schema::{verify_schema, EXAMPLES_QUERY};

/// Reads example metadata from a Lobe `db.sqlite`.
///
/// The connection is opened read-only; nothing in this type writes.
#[derive(Debug)]
pub struct MetadataReader {
    conn: Connection,
}

impl MetadataReader {
    /// Open the project database at `path` read-only and verify its schema.
    ///
    /// # Errors
    ///
    /// Returns `DataSourceUnavailable` if the file is missing, cannot be opened
    /// or is not a SQLite database, and `SchemaMismatch` if expected tables or
    /// columns are absent.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::DataSourceUnavailable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|e| unavailable(path, &e))?;
        // Lobe may hold a write lock while running
        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| unavailable(path, &e))?;

        Self::from_connection(conn, path)
    }

    /// Wrap an existing connection, verifying the schema.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open), minus the existence check.
    pub fn from_connection(conn: Connection, path: &Path) -> Result<Self> {
        verify_schema(&conn).map_err(|e| match e {
            Error::Database(db) if is_not_a_database(&db) => unavailable(path, &db),
            other => other,
        })?;
        debug!(path = %path.display(), "Project database opened");
        Ok(Self { conn })
    }

    /// Read every example, ordered by label modification time ascending.
    ///
    /// Every column is rendered as text whatever its storage class, so a
    /// stray value never fails the read. NULLs come through as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn read_examples(&self) -> Result<ExampleTable> {
        let mut stmt = self.conn.prepare(EXAMPLES_QUERY)?;
        let records = stmt
            .query_map([], map_example)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(count = records.len(), "Examples read");
        Ok(ExampleTable::new(records))
    }
}

fn map_example(row: &Row<'_>) -> rusqlite::Result<ExampleRecord> {
    Ok(ExampleRecord {
        example_id: text(row.get_ref(0)?).unwrap_or_default(),
        content_hash: text(row.get_ref(1)?).unwrap_or_default(),
        filename: text(row.get_ref(2)?),
        label: text(row.get_ref(3)?),
        modified_at: text(row.get_ref(4)?),
        accuracy: text(row.get_ref(5)?),
        perceptual_hash: None,
    })
}

/// Render any SQLite value as text, keeping NULL as `None`.
fn text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}

fn is_not_a_database(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::NotADatabase | rusqlite::ErrorCode::DatabaseCorrupt)
    )
}

fn unavailable(path: &Path, err: &rusqlite::Error) -> Error {
    Error::DataSourceUnavailable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
