use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::queue::enqueue_notify;
use crate::error::AppError;
use crate::models::notify::{NotifyRequest, WorkerNotifyStatus};
use crate::state::AppState;
use crate::store::cooldown_key;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/workers/:id/notify",
        get(notify_status).post(send_notify),
    )
}

#[derive(Deserialize)]
pub struct SendNotifyRequest {
    pub message: String,
}

async fn send_notify(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendNotifyRequest>,
) -> Result<(StatusCode, Json<WorkerNotifyStatus>), AppError> {
    if payload.message.trim().is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".to_string()));
    }

    if !state.workers.contains_key(&id) {
        return Err(AppError::NotFound(format!("worker {} not found", id)));
    }

    hydrate_cooldown(&state, id).await;
    state.cooldowns.begin(id)?;

    let request = NotifyRequest {
        worker_id: id,
        message: payload.message,
        requested_at: Utc::now(),
    };

    if let Err(err) = enqueue_notify(&state, request).await {
        // Nothing was handed to the engine, so release the in-flight slot.
        state.cooldowns.settle_failed(id);
        return Err(err);
    }

    Ok((StatusCode::ACCEPTED, Json(state.cooldowns.status(id))))
}

async fn notify_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkerNotifyStatus>, AppError> {
    if !state.workers.contains_key(&id) {
        return Err(AppError::NotFound(format!("worker {} not found", id)));
    }

    hydrate_cooldown(&state, id).await;
    Ok(Json(state.cooldowns.status(id)))
}

/// Replay a persisted delivery timestamp the first time a worker shows up in
/// this session. Live session state always wins.
async fn hydrate_cooldown(state: &AppState, worker_id: Uuid) {
    if state.cooldowns.contains(worker_id) {
        return;
    }

    if let Ok(Some(raw)) = state.store.get(&cooldown_key(worker_id)).await {
        if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
            state.cooldowns.seed(worker_id, at.with_timezone(&Utc));
        }
    }
}
