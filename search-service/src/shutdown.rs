//! Process shutdown signals.
//!
//! Both binaries stop on SIGINT (ctrl-c) and, on unix, on SIGTERM as sent by
//! container runtimes.

use std::io;

#[cfg(unix)]
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{info, warn};

/// Listener for the signals that ask the process to stop.
pub struct ShutdownSignal {
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignal {
    /// Register the SIGTERM handler. Must be called inside a tokio runtime.
    ///
    /// Registration happens here rather than on first poll, so a SIGTERM
    /// delivered after `install` returns is never missed.
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            #[cfg(unix)]
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the first shutdown signal.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!(signal = "SIGINT", "Received shutdown signal");
                }
                _ = self.terminate.recv() => {
                    info!(signal = "SIGTERM", "Received shutdown signal");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!(signal = "ctrl-c", "Received shutdown signal");
        }
    }
}

/// Resolves when the process receives SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    match ShutdownSignal::install() {
        Ok(mut signal) => signal.recv().await,
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler, stopping on ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
            info!(signal = "SIGINT", "Received shutdown signal");
        }
    }
}
