use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::notify::NotifyRequest;
use crate::state::AppState;
use crate::store::cooldown_key;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("push gateway error: {0}")]
    Gateway(String),
}

#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    async fn deliver(&self, worker_id: Uuid, message: &str) -> Result<(), DeliveryError>;
}

/// Forwards notify pings to an external push gateway over HTTP.
pub struct PushGateway {
    client: reqwest::Client,
    url: String,
}

impl PushGateway {
    pub fn new(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, url }
    }
}

#[async_trait]
impl DeliveryProvider for PushGateway {
    async fn deliver(&self, worker_id: Uuid, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({
                "worker_id": worker_id,
                "message": message,
            }))
            .send()
            .await
            .map_err(|err| DeliveryError::Gateway(err.to_string()))?;

        if !response.status().is_success() {
            return Err(DeliveryError::Gateway(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Dev-mode provider used when no push gateway is configured.
pub struct LogOnlyDelivery;

#[async_trait]
impl DeliveryProvider for LogOnlyDelivery {
    async fn deliver(&self, worker_id: Uuid, message: &str) -> Result<(), DeliveryError> {
        info!(worker_id = %worker_id, message, "notify delivered (log only)");
        Ok(())
    }
}

pub async fn run_notify_engine(
    state: Arc<AppState>,
    mut notify_rx: mpsc::Receiver<NotifyRequest>,
    provider: Arc<dyn DeliveryProvider>,
) {
    info!("notify engine started");

    while let Some(request) = notify_rx.recv().await {
        state.metrics.notifies_in_queue.dec();

        let start = Instant::now();
        let outcome = match deliver_request(&state, provider.as_ref(), &request).await {
            Ok(()) => "success",
            Err(err) => {
                warn!(worker_id = %request.worker_id, error = %err, "notify delivery failed");
                "error"
            }
        };

        let elapsed = start.elapsed().as_secs_f64();
        state
            .metrics
            .notify_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed);
        state
            .metrics
            .notifies_total
            .with_label_values(&[outcome])
            .inc();
    }

    warn!("notify engine stopped: queue channel closed");
}

async fn deliver_request(
    state: &AppState,
    provider: &dyn DeliveryProvider,
    request: &NotifyRequest,
) -> Result<(), DeliveryError> {
    match provider.deliver(request.worker_id, &request.message).await {
        Ok(()) => {
            let delivered_at = state.cooldowns.settle_delivered(request.worker_id);

            if let Err(err) = state
                .store
                .set(&cooldown_key(request.worker_id), &delivered_at.to_rfc3339())
                .await
            {
                warn!(worker_id = %request.worker_id, error = %err, "failed to persist cooldown");
            }

            info!(
                worker_id = %request.worker_id,
                delivered_at = %delivered_at,
                "worker notified"
            );
            Ok(())
        }
        Err(err) => {
            state.cooldowns.settle_failed(request.worker_id);
            Err(err)
        }
    }
}
