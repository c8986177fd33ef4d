//! Interrupt handling
//!
//! First interrupt: cancel the shared token so both loops stop after their
//! current unit of work and the final summary renders. A second interrupt
//! before the first is honored: exit immediately, no summary, no guarantee
//! the in-flight log line was written.

use tokio_util::sync::CancellationToken;

/// Spawn the background task that listens for interrupts and drives the
/// two-stage shutdown.
pub fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigint = match signal(SignalKind::interrupt()) {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!("failed to register SIGINT handler: {e}");
                    return;
                }
            };
            let _ = sigint.recv().await;
            tracing::info!("interrupt received, finishing current cycle");
            token.cancel();
            let _ = sigint.recv().await;
            tracing::info!("second interrupt, terminating now");
            std::process::exit(130);
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("interrupt received, finishing current cycle");
            token.cancel();
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("second interrupt, terminating now");
            std::process::exit(130);
        }
    });
}
