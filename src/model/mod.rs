//! Data models for Lobe exports.

pub mod example;

pub use example::{is_blob_name, ExampleRecord, ExampleTable, LabelCount};
