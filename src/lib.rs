//! Export labeled Lobe image projects as plain datasets.
//!
//! This crate provides the core functionality for the `lobe-export` CLI.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Projects directory and per-project paths
//! - [`storage`] - Read-only access to a project's `db.sqlite`
//! - [`model`] - Example records and the ordered example table
//! - [`fingerprint`] - Parallel perceptual hashing
//! - [`export`] - Label-folder copies, CSV manifest, and the export run
//! - [`interrupt`] - Ctrl+C to cancellation token
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod interrupt;
pub mod model;
pub mod storage;

pub use error::{Error, Result};
