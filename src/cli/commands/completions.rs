//! Shell completions command implementation.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::error::Result;

const BIN_NAME: &str = "lobe-export";

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be flushed.
pub fn execute(shell: Shell) -> Result<()> {
    let mut stdout = io::stdout().lock();
    write_completions(shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

/// Render the completion script for `shell` into `buf`.
pub fn write_completions(shell: Shell, buf: &mut dyn Write) {
    generate(shell, &mut Cli::command(), BIN_NAME, buf);
}
