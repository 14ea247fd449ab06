// Signal handling module
//
// - SIGTERM: graceful shutdown
// - SIGINT:  graceful shutdown (Ctrl+C)

use crate::logger;

/// Resolve once a shutdown signal arrives
#[cfg(unix)]
pub async fn wait_for_shutdown() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                () = ctrl_c() => logger::log_warning("SIGINT received, shutting down"),
                _ = sigterm.recv() => logger::log_warning("SIGTERM received, shutting down"),
            }
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            ctrl_c().await;
            logger::log_warning("SIGINT received, shutting down");
        }
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown() {
    ctrl_c().await;
    logger::log_warning("Ctrl+C received, shutting down");
}

/// Ctrl+C, or never if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        std::future::pending::<()>().await;
    }
}
