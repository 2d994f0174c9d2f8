//! Translating OS signals into a cooperative stop.
//!
//! The first SIGINT/SIGTERM raises the [`StopFlag`]; the loop finishes its
//! current cycle and returns. A second signal resolves the returned
//! receiver so the caller can abandon the in-flight scan or sleep.

use awaylock_core::StopFlag;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Install signal handling for `stop`.
///
/// The returned receiver completes on the second signal.
pub fn install(stop: StopFlag) -> oneshot::Receiver<()> {
    let (force_tx, force_rx) = oneshot::channel();

    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                info!("Received {name}, stopping after the current cycle (repeat to exit now)");
                stop.stop();
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                return;
            }
        }

        if let Ok(name) = wait_for_signal().await {
            warn!("Received {name} again, exiting immediately");
            let _ = force_tx.send(());
        }
    });

    force_rx
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn wait_for_signal() -> std::io::Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.map(|()| "SIGINT"),
            _ = terminate.recv() => Ok("SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.map(|()| "Ctrl-C")
    }
}
