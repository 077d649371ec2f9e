//! Export command implementation.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::projects_dir;
use crate::cli::ExportArgs;
use crate::config::ProjectPaths;
use crate::error::Result;
use crate::export::{
    run_export, validate_output_target, ExportMode, ExportOptions, ExportSummary,
    MissingBlobPolicy,
};

#[derive(Serialize)]
struct ExportOutput<'a> {
    #[serde(flatten)]
    summary: &'a ExportSummary,
    exported_at: String,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the output target is invalid, the project cannot be
/// read, or the run fails or is interrupted.
pub fn execute(
    args: &ExportArgs,
    projects_dir_arg: Option<&Path>,
    cancel: &CancellationToken,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mode = if args.in_place {
        ExportMode::InPlace {
            dir: std::env::current_dir()?,
        }
    } else {
        ExportMode::Copy {
            output_dir: args.output.clone().unwrap_or_else(|| PathBuf::from(".")),
        }
    };
    validate_output_target(&mode)?;

    let project = ProjectPaths::locate(&projects_dir(projects_dir_arg)?, &args.project)?;

    let options = ExportOptions {
        project,
        mode,
        fingerprint: args.phash,
        workers: args.workers.map(usize::from),
        missing_blobs: if args.skip_missing {
            MissingBlobPolicy::Skip
        } else {
            MissingBlobPolicy::Abort
        },
        cache_dir: args.cache_dir.clone(),
        show_progress: !json && !quiet && std::io::stderr().is_terminal(),
    };

    let summary = run_export(&options, cancel)?;

    if json {
        let output = ExportOutput {
            summary: &summary,
            exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if !quiet {
        print_summary(&summary);
    }

    Ok(())
}

fn key(name: &str) -> ColoredString {
    format!("{name:<9}").cyan()
}

fn print_summary(summary: &ExportSummary) {
    println!(
        "{} {} ({} records)",
        "Exported".green().bold(),
        summary.project.bold(),
        summary.records
    );

    if let Some(copy) = &summary.copy {
        let skipped = if copy.skipped > 0 {
            format!("{} skipped", copy.skipped).yellow().to_string()
        } else {
            "0 skipped".dimmed().to_string()
        };
        println!(
            "  {}{} files into {} labels, {skipped}",
            key("copied"),
            copy.copied,
            copy.labels
        );
    }

    if summary.fingerprinted {
        let unreadable = if summary.unreadable > 0 {
            format!("{} unreadable", summary.unreadable).yellow().to_string()
        } else {
            "0 unreadable".dimmed().to_string()
        };
        println!(
            "  {}{} of {} on {} workers, {unreadable}",
            key("phash"),
            summary.fingerprints,
            summary.records,
            summary.workers
        );
    }

    println!("  {}{}", key("manifest"), summary.manifest.display());
    println!(
        "  {}{}",
        key("elapsed"),
        format!("{} ms", summary.elapsed_ms).dimmed()
    );
}
