//! Version command implementation.

use crate::error::Result;
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq, Eq)]
struct VersionInfo {
    version: &'static str,
    build: &'static str,
    /// Bundled SQLite used to read project databases.
    sqlite: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            build: if cfg!(debug_assertions) {
                "dev"
            } else {
                "release"
            },
            sqlite: rusqlite::version(),
        }
    }
}

/// Print version information.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let info = VersionInfo::current();

    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!(
            "lobe-export {} ({}, sqlite {})",
            info.version, info.build, info.sqlite
        );
    }
    Ok(())
}
