mod api;
mod config;
mod engine;
mod error;
mod geo;
mod location;
mod models;
mod observability;
mod state;
mod store;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::engine::cooldown::CooldownTracker;
use crate::engine::delivery::{DeliveryProvider, LogOnlyDelivery, PushGateway};
use crate::location::PlaceResolver;
use crate::location::providers::{GazetteerGeocoder, NominatimGeocoder, ReverseGeocoder};
use crate::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), error::AppError> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false)
        .compact()
        .init();

    let resolver = PlaceResolver::new(vec![
        Arc::new(NominatimGeocoder::new(config.geocoder_url.clone())) as Arc<dyn ReverseGeocoder>,
        Arc::new(GazetteerGeocoder),
    ]);

    let (app_state, notify_rx) = state::AppState::new(
        resolver,
        Arc::new(MemoryStore::new()),
        CooldownTracker::new(config.cooldown_secs),
        config.default_radius_km,
        config.notify_queue_size,
    );
    let shared_state = Arc::new(app_state);

    let delivery: Arc<dyn DeliveryProvider> = match &config.push_gateway_url {
        Some(url) => Arc::new(PushGateway::new(url.clone())),
        None => {
            tracing::warn!("PUSH_GATEWAY_URL not set; notify deliveries are logged only");
            Arc::new(LogOnlyDelivery)
        }
    };

    tokio::spawn(engine::delivery::run_notify_engine(
        shared_state.clone(),
        notify_rx,
        delivery,
    ));

    let app = api::rest::router(shared_state.clone());

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| error::AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port = config.http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| error::AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
