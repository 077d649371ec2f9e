//! Dataset export.
//!
//! Turns a Lobe project into a plain dataset: a label-partitioned image tree
//! plus a CSV manifest.
//!
//! # Submodules
//!
//! - [`copy`] - blob copies into `<label>/<hash>.jpg`
//! - [`file`] - atomic writes and timestamp-preserving copies
//! - [`manifest`] - CSV manifest writer
//! - [`pipeline`] - the end-to-end run
//! - [`types`] - modes, policies and summaries

pub mod copy;
pub mod file;
pub mod manifest;
pub mod pipeline;
pub mod types;

pub use copy::{label_dir_name, Exporter};
pub use manifest::write_manifest;
pub use pipeline::{run_export, validate_output_target, ExportOptions};
pub use types::{CopyStats, ExportMode, ExportSummary, MissingBlobPolicy};
