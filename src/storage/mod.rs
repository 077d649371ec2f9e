//! Read-only access to a Lobe project database.
//!
//! # Submodules
//!
//! - [`reader`] - opens `db.sqlite` and reads examples in export order
//! - [`schema`] - expected tables and the examples query

pub mod reader;
pub mod schema;

pub use reader::MetadataReader;
