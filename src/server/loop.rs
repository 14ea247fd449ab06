// Server loop module
// Accepts connections until shutdown, then drains the ones still in flight

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How often the drain phase re-checks the connection counter
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections on `listener` until `shutdown` resolves.
///
/// After shutdown the listener is closed, open connections are told to finish their
/// current response, and the loop waits up to `performance.shutdown_timeout` seconds
/// for them before returning.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut shutdown = std::pin::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(
                        stream,
                        peer_addr,
                        &state,
                        &active_connections,
                        shutdown_rx.clone(),
                    ),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => break,
        }
    }

    drop(listener);
    // Receivers only need the change notification; a send error means none are left
    let _ = shutdown_tx.send(true);

    let timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    logger::log_shutdown(active_connections.load(Ordering::SeqCst));
    if tokio::time::timeout(timeout, drain(&active_connections))
        .await
        .is_err()
    {
        logger::log_warning(&format!(
            "{} connection(s) still open after {}s, exiting anyway",
            active_connections.load(Ordering::SeqCst),
            timeout.as_secs()
        ));
    }
}

async fn drain(active_connections: &AtomicUsize) {
    while active_connections.load(Ordering::SeqCst) > 0 {
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
