//! Interrupt handling.
//!
//! A small tokio runtime listens for Ctrl+C (and SIGTERM on unix). The first
//! signal cancels the shared [`CancellationToken`]; the export stages notice
//! it between items and unwind with `Interrupted`. A second signal exits
//! immediately with code 130.

use tokio::runtime::{Builder, Runtime};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ErrorCode, Result};

/// Keeps the signal listener alive. Dropping it stops listening.
pub struct InterruptGuard {
    _runtime: Runtime,
    token: CancellationToken,
}

impl InterruptGuard {
    /// Token cancelled by the first interrupt.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Start the signal listener.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn install() -> Result<InterruptGuard> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("signal")
        .enable_all()
        .build()?;

    let token = CancellationToken::new();
    let cancel = token.clone();
    runtime.spawn(async move {
        match shutdown_signal().await {
            Ok(source) => {
                warn!("Received {source}, stopping after the current item");
                cancel.cancel();
            }
            Err(e) => {
                debug!(error = %e, "Signal listener unavailable");
                return;
            }
        }

        if shutdown_signal().await.is_ok() {
            eprintln!("Interrupted again, exiting");
            std::process::exit(i32::from(ErrorCode::Interrupted.exit_code()));
        }
    });

    Ok(InterruptGuard {
        _runtime: runtime,
        token,
    })
}

async fn shutdown_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result.map(|()| "Ctrl+C"),
            _ = terminate.recv() => Ok("terminate signal"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map(|()| "Ctrl+C")
    }
}
