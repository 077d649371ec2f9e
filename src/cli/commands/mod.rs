//! Command implementations.

use std::path::{Path, PathBuf};

use crate::config::{resolve_projects_dir, PROJECTS_DIR_ENV};
use crate::error::{Error, Result};

pub mod completions;
pub mod export;
pub mod labels;
pub mod projects;
pub mod version;

/// Resolve the projects directory or fail with a configuration error.
fn projects_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    resolve_projects_dir(explicit).ok_or_else(|| {
        Error::Config(format!(
            "cannot determine the Lobe projects directory; pass --projects-dir or set {PROJECTS_DIR_ENV}"
        ))
    })
}
