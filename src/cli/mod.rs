//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// Export Lobe image projects as plain datasets
#[derive(Parser, Debug)]
#[command(name = "lobe-export", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Lobe projects directory (default: <data dir>/Lobe/projects)
    #[arg(long, global = true, env = "LOBE_PROJECTS_DIR")]
    pub projects_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a project's images and manifest
    Export(ExportArgs),

    /// Show example counts per label
    Labels {
        /// Project id (directory name under the projects directory)
        #[arg(short, long)]
        project: String,
    },

    /// List projects in the projects directory
    Projects,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Project id (directory name under the projects directory)
    #[arg(short, long)]
    pub project: String,

    /// Existing directory to copy images and write the manifest into
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Copy nothing; write the manifest into the current directory
    #[arg(long)]
    pub in_place: bool,

    /// Compute a perceptual hash column
    #[arg(long)]
    pub phash: bool,

    /// Fingerprint worker threads (default: available parallelism)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Skip records whose image file is missing instead of aborting
    #[arg(long)]
    pub skip_missing: bool,

    /// Directory for cached intermediate data (reserved)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}
