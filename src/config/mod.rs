//! Configuration management.
//!
//! This module resolves where Lobe keeps its projects and how a single
//! project's files are laid out on disk.
//!
//! # Layout
//!
//! Lobe stores each project in its own directory:
//! - **Database**: `<projects_dir>/<project>/db.sqlite`
//! - **Blobs**: `<projects_dir>/<project>/data/blobs/<content_hash>`
//!
//! The projects directory defaults to `<data dir>/Lobe/projects`, which is
//! `~/Library/Application Support/Lobe/projects` on macOS.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Environment variable overriding the projects directory.
pub const PROJECTS_DIR_ENV: &str = "LOBE_PROJECTS_DIR";

/// Database file name inside a project directory.
pub const DB_FILE_NAME: &str = "db.sqlite";

/// Get the platform default Lobe projects directory.
#[must_use]
pub fn default_projects_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.data_dir().join("Lobe").join("projects"))
}

/// Resolve the projects directory.
///
/// Priority:
/// 1. If `explicit_path` is provided, use it directly
/// 2. `LOBE_PROJECTS_DIR` environment variable
/// 3. Platform default (see [`default_projects_dir`])
#[must_use]
pub fn resolve_projects_dir(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(dir) = std::env::var(PROJECTS_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Some(PathBuf::from(dir));
        }
    }

    default_projects_dir()
}

/// Default fingerprint worker count: the host's available parallelism.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// On-disk locations for one Lobe project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Project identifier (the project's directory name).
    pub id: String,
    /// Project directory.
    pub root: PathBuf,
    /// `db.sqlite` inside the project directory.
    pub db_path: PathBuf,
    /// Content-addressed blob directory.
    pub blob_dir: PathBuf,
}

impl ProjectPaths {
    #[must_use]
    pub fn new(projects_dir: &Path, id: &str) -> Self {
        let root = projects_dir.join(id);
        Self {
            id: id.to_string(),
            db_path: root.join(DB_FILE_NAME),
            blob_dir: root.join("data").join("blobs"),
            root,
        }
    }

    /// Resolve a project and check that its directory exists.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for ids that are not a single path component,
    /// and `ProjectNotFound` (with the known project ids) if the directory is
    /// missing.
    pub fn locate(projects_dir: &Path, id: &str) -> Result<Self> {
        let valid = !id.is_empty()
            && id != "."
            && id != ".."
            && !id.contains(['/', '\\']);
        if !valid {
            return Err(Error::InvalidArgument(format!("invalid project id: {id:?}")));
        }

        let paths = Self::new(projects_dir, id);
        if !paths.root.is_dir() {
            let available = list_projects(projects_dir)
                .unwrap_or_default()
                .into_iter()
                .map(|p| p.id)
                .collect();
            return Err(Error::ProjectNotFound {
                id: id.to_string(),
                available,
            });
        }
        Ok(paths)
    }
}

/// A project directory found under the projects directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEntry {
    pub id: String,
    pub path: PathBuf,
    /// Whether `db.sqlite` exists.
    pub has_database: bool,
    /// Number of files in `data/blobs`, 0 if the directory is absent.
    pub blob_count: usize,
}

/// List project directories, sorted by id.
///
/// Returns an empty list if the projects directory does not exist.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be read.
pub fn list_projects(projects_dir: &Path) -> Result<Vec<ProjectEntry>> {
    if !projects_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut projects = Vec::new();
    for entry in fs::read_dir(projects_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let id = entry.file_name().to_string_lossy().into_owned();
        if id.starts_with('.') {
            continue;
        }

        let paths = ProjectPaths::new(projects_dir, &id);
        let blob_count = fs::read_dir(&paths.blob_dir)
            .map(|entries| {
                entries
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
                    .count()
            })
            .unwrap_or(0);

        projects.push(ProjectEntry {
            has_database: paths.db_path.is_file(),
            path: paths.root,
            id,
            blob_count,
        });
    }

    projects.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(projects)
}
