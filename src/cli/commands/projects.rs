//! Projects command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::projects_dir;
use crate::config::{list_projects, ProjectEntry};
use crate::error::Result;

#[derive(Serialize)]
struct ProjectsOutput<'a> {
    projects_dir: &'a Path,
    projects: &'a [ProjectEntry],
}

/// List the projects found under the projects directory.
///
/// # Errors
///
/// Returns an error if the projects directory cannot be resolved or read.
pub fn execute(projects_dir_arg: Option<&Path>, json: bool) -> Result<()> {
    let dir = projects_dir(projects_dir_arg)?;
    let projects = list_projects(&dir)?;

    if json {
        let output = ProjectsOutput {
            projects_dir: &dir,
            projects: &projects,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects in {}", dir.display());
        return Ok(());
    }

    println!("{} {}", "Projects in".cyan().bold(), dir.display());
    for project in &projects {
        let detail = format!("{} blobs", project.blob_count);
        if project.has_database {
            println!("  {}  {}", project.id.bold(), detail.dimmed());
        } else {
            println!(
                "  {}  {}  {}",
                project.id.bold(),
                detail.dimmed(),
                "no database".yellow()
            );
        }
    }
    Ok(())
}
