//! Labels command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use super::projects_dir;
use crate::config::ProjectPaths;
use crate::error::Result;
use crate::model::LabelCount;
use crate::storage::MetadataReader;

#[derive(Serialize)]
struct LabelsOutput<'a> {
    project: &'a str,
    total: usize,
    labels: &'a [LabelCount],
}

/// Print example counts per label for a project.
///
/// # Errors
///
/// Returns an error if the project cannot be found or read.
pub fn execute(project: &str, projects_dir_arg: Option<&Path>, json: bool) -> Result<()> {
    let paths = ProjectPaths::locate(&projects_dir(projects_dir_arg)?, project)?;
    let table = MetadataReader::open(&paths.db_path)?.read_examples()?;
    let labels = table.label_counts();

    if json {
        let output = LabelsOutput {
            project,
            total: table.len(),
            labels: &labels,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    if labels.is_empty() {
        println!("No examples in {}.", project.bold());
        return Ok(());
    }

    let width = labels
        .iter()
        .filter_map(|l| l.label.as_deref().map(str::len))
        .max()
        .unwrap_or(0)
        .max("(unlabeled)".len());

    println!("{} {}", "Labels in".cyan().bold(), project.bold());
    for entry in &labels {
        match &entry.label {
            Some(label) => println!("  {label:<width$}  {}", entry.count),
            None => println!("  {}  {}", format!("{:<width$}", "(unlabeled)").dimmed(), entry.count),
        }
    }
    println!("  {}  {}", format!("{:<width$}", "total").dimmed(), table.len());
    Ok(())
}
