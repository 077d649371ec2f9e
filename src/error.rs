//! Error types for lobe-export.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=data source, 3=not found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lobe-export operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Data source (exit 2)
    DataSourceUnavailable,
    SchemaMismatch,
    DatabaseError,

    // Not Found (exit 3)
    ProjectNotFound,
    SourceBlobMissing,

    // Validation (exit 4)
    InvalidOutputTarget,
    InvalidArgument,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    CsvError,
    JsonError,

    // Interrupt (exit 130)
    Interrupted,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DataSourceUnavailable => "DATA_SOURCE_UNAVAILABLE",
            Self::SchemaMismatch => "SCHEMA_MISMATCH",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::SourceBlobMissing => "SOURCE_BLOB_MISSING",
            Self::InvalidOutputTarget => "INVALID_OUTPUT_TARGET",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::CsvError => "CSV_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::Interrupted => "INTERRUPTED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code.
    ///
    /// Interrupts use the conventional `128 + SIGINT`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DataSourceUnavailable | Self::SchemaMismatch | Self::DatabaseError => 2,
            Self::ProjectNotFound | Self::SourceBlobMissing => 3,
            Self::InvalidOutputTarget | Self::InvalidArgument => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::CsvError | Self::JsonError => 8,
            Self::Interrupted => 130,
        }
    }

    /// Whether re-running with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidOutputTarget
                | Self::InvalidArgument
                | Self::SourceBlobMissing
                | Self::Interrupted
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while exporting a Lobe project.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Data source unavailable at {}: {reason}", path.display())]
    DataSourceUnavailable { path: PathBuf, reason: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Project not found: {id}")]
    ProjectNotFound {
        id: String,
        /// Project ids found in the projects directory, for hint display.
        available: Vec<String>,
    },

    #[error("Source blob missing for example {example_id}: {}", path.display())]
    SourceBlobMissing { example_id: String, path: PathBuf },

    #[error("Output is not a directory: {}", path.display())]
    InvalidOutputTarget { path: PathBuf },

    #[error("Interrupted")]
    Interrupted,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::DataSourceUnavailable { .. } => ErrorCode::DataSourceUnavailable,
            Self::SchemaMismatch(_) => ErrorCode::SchemaMismatch,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ProjectNotFound { .. } => ErrorCode::ProjectNotFound,
            Self::SourceBlobMissing { .. } => ErrorCode::SourceBlobMissing,
            Self::InvalidOutputTarget { .. } => ErrorCode::InvalidOutputTarget,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Csv(_) => ErrorCode::CsvError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Interrupted => ErrorCode::Interrupted,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::DataSourceUnavailable { .. } => Some(
                "Check that the project has been opened in Lobe at least once, \
                 or pass --projects-dir to point at the right location."
                    .to_string(),
            ),

            Self::SchemaMismatch(_) => Some(
                "The project database does not look like a Lobe project. \
                 It may come from an unsupported Lobe version."
                    .to_string(),
            ),

            Self::ProjectNotFound { available, .. } => {
                if available.is_empty() {
                    Some("No projects found. Use `lobe-export projects` to check the projects directory.".to_string())
                } else {
                    let mut hint = String::from("Known projects:\n");
                    for id in available.iter().take(5) {
                        hint.push_str(&format!("    {id}\n"));
                    }
                    if available.len() > 5 {
                        hint.push_str(&format!("    ... and {} more\n", available.len() - 5));
                    }
                    hint.push_str("  List all: lobe-export projects");
                    Some(hint)
                }
            }

            Self::SourceBlobMissing { .. } => Some(
                "Re-run with --skip-missing to export the remaining records.".to_string(),
            ),

            Self::InvalidOutputTarget { path } => Some(format!(
                "Create the directory first: mkdir -p {}",
                path.display()
            )),

            Self::Interrupted
            | Self::Database(_)
            | Self::Io(_)
            | Self::Csv(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
