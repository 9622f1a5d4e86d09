use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use forecaster_core::Config;
use forecaster_http::{create_router, serve, AppState};
use forecaster_weather::{ForecastCache, ForecastService, NominatimClient, NwsClient};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    forecaster_core::init()?;

    let arg = std::env::args().nth(1);
    let path = Config::resolve_path(arg.as_deref());
    let (config, _) = Config::load_validated(&path)?;

    let geocoder = NominatimClient::with_base_url(&config.geocoder.url, config.geocoder.timeout())
        .context("Failed to build geocoder client")?;
    let weather = NwsClient::with_base_url(&config.weather.url, config.weather.timeout())
        .context("Failed to build weather client")?;
    let cache = Arc::new(ForecastCache::new());
    let service = ForecastService::new(Arc::new(geocoder), Arc::new(weather), cache);

    let shutdown = CancellationToken::new();
    let state = AppState::new(service, shutdown.clone(), config.api.request_timeout());
    let router = create_router(state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.api.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, config = %path.display(), "started forecaster service");

    tokio::spawn(cancel_on_signal(shutdown.clone()));

    serve(listener, router, shutdown, config.api.shutdown_timeout())
        .await
        .context("Server error")?;

    tracing::info!("done");
    Ok(())
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("received shutdown signal");
    shutdown.cancel();
}
