//! Perceptual-hash fingerprints for project images.
//!
//! - [`phash`] - hash one blob file, absent on unreadable input
//! - [`pool`] - order-preserving parallel hashing with cancellation

pub mod phash;
pub mod pool;

pub use phash::{fingerprint_file, hasher};
pub use pool::{FingerprintPool, BATCH_SIZE};
