use std::time::Duration;

use forecaster_weather::ForecastService;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: ForecastService,
    /// Cancelled when the server begins shutting down
    pub shutdown: CancellationToken,
    /// Deadline for a single `/weather` request
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(service: ForecastService, shutdown: CancellationToken, request_timeout: Duration) -> Self {
        Self {
            service,
            shutdown,
            request_timeout,
        }
    }

    /// Token for one request: a child of the shutdown token that also fires
    /// once `request_timeout` elapses. Dropping the guard cancels it, which
    /// covers the handler future being dropped on client disconnect.
    pub fn request_token(&self) -> (CancellationToken, DropGuard) {
        let token = self.shutdown.child_token();
        let guard = token.clone().drop_guard();

        let deadline = token.clone();
        let timeout = self.request_timeout;
        tokio::spawn(async move {
            tokio::select! {
                _ = deadline.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    tracing::debug!(?timeout, "request deadline reached");
                    deadline.cancel();
                }
            }
        });

        (token, guard)
    }
}
