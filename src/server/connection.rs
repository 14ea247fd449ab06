// Connection handling module
// Admits a TCP connection and serves HTTP/1.1 on it in its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Decrements the active connection counter when the connection task ends,
/// however it ends
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforcing `max_connections`.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
/// * `shutdown` - Flips to `true` when the server starts shutting down
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    shutdown: watch::Receiver<bool>,
) {
    // Increment first, then check, so two racing accepts cannot both slip under the limit
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let guard = ConnectionGuard(Arc::clone(conn_counter));

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    tokio::spawn(serve_connection(
        stream,
        peer_addr,
        Arc::clone(state),
        guard,
        shutdown,
    ));
}

/// Serve HTTP/1.1 on one connection until the client closes it or shutdown drains it
async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    _guard: ConnectionGuard,
    mut shutdown: watch::Receiver<bool>,
) {
    let io = TokioIo::new(stream);
    let performance = &state.config.performance;

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(performance.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(Duration::from_secs(performance.header_read_timeout));

    let service_state = Arc::clone(&state);
    let service = service_fn(move |req| {
        handler::handle_request(req, Arc::clone(&service_state), Some(peer_addr))
    });
    let mut conn = std::pin::pin!(builder.serve_connection(io, service));

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = shutdown.changed() => {
            // Finish the in-flight response, then close instead of keeping alive
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    if let Err(err) = result {
        logger::log_connection_error(&err);
    }
}
