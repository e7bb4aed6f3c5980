// src/interrupt.rs

//! External interrupt handling.
//!
//! A background listener waits for a termination signal for the whole
//! process lifetime. On receipt it removes the scratch directory
//! best-effort and cancels the batch token; the orchestration loop observes
//! the token, terminates the in-flight pack, and returns normally. The
//! listener itself never exits the process.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Spawn the interrupt listener and return the token the batch loop
/// watches. Registered before the batch starts.
pub fn spawn_interrupt_listener(write_directory: PathBuf) -> CancellationToken {
    let token = CancellationToken::new();
    let batch_token = token.clone();

    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            warn!(error = %e, "failed to listen for shutdown signals");
            return;
        }
        warn!("execution aborted - interrupt received");
        cleanup_scratch(&write_directory);
        batch_token.cancel();
    });

    token
}

/// Completes when the process receives SIGINT/SIGTERM (unix) or Ctrl-C.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Best-effort removal of the scratch subdirectory packs write into.
/// Failures are logged and ignored; pack output outside `tmp/` stays.
pub fn cleanup_scratch(write_directory: &Path) {
    let scratch = write_directory.join("tmp");
    match std::fs::remove_dir_all(&scratch) {
        Ok(()) => debug!(dir = %scratch.display(), "scratch directory removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(dir = %scratch.display(), error = %e, "scratch cleanup failed"),
    }
}
