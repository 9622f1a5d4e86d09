use std::future::IntoFuture;
use std::io;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Serve `router` until `shutdown` is cancelled, then give in-flight
/// requests up to `grace` to finish.
///
/// Cancelling `shutdown` also cancels every request token derived from it,
/// so pending forecasts stop waiting on upstream calls.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }

    let signal = shutdown.clone();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = shutdown.cancelled() => {
            info!(?grace, "shutdown requested, draining connections");
        }
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => {
            info!("server exited cleanly");
            result
        }
        Err(_) => {
            warn!(?grace, "shutdown timeout elapsed with requests still in flight");
            Ok(())
        }
    }
}
