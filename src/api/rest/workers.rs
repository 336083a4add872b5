use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{filter_by_radius, WithDistance};
use crate::models::worker::{GeoPoint, Trade, Worker, WorkerStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/workers", post(create_worker).get(list_workers))
        .route("/workers/nearby", get(nearby_workers))
        .route("/workers/:id/status", patch(update_worker_status))
        .route("/workers/:id/location", patch(update_worker_location))
}

#[derive(Deserialize)]
pub struct CreateWorkerRequest {
    pub name: String,
    pub trade: Trade,
    pub location: GeoPoint,
    pub rating: f64,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: WorkerStatus,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

#[derive(Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

async fn create_worker(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<Json<Worker>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    if !payload.location.in_bounds() {
        return Err(AppError::BadRequest(
            "location out of bounds".to_string(),
        ));
    }

    let worker = Worker {
        id: Uuid::new_v4(),
        name: payload.name,
        trade: payload.trade,
        location: payload.location,
        rating: payload.rating.clamp(0.0, 5.0),
        status: WorkerStatus::Available,
        updated_at: Utc::now(),
    };

    state.workers.insert(worker.id, worker.clone());
    Ok(Json(worker))
}

async fn list_workers(State(state): State<Arc<AppState>>) -> Json<Vec<Worker>> {
    let workers = state
        .workers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(workers)
}

async fn nearby_workers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<WithDistance<Worker>>>, AppError> {
    let origin = GeoPoint {
        lat: query.lat,
        lng: query.lng,
    };

    if !origin.in_bounds() {
        return Err(AppError::BadRequest("origin out of bounds".to_string()));
    }

    let radius_km = query.radius_km.unwrap_or(state.default_radius_km);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(AppError::BadRequest("radius_km must be > 0".to_string()));
    }

    let workers: Vec<Worker> = state
        .workers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    let mut hits = filter_by_radius(workers, &origin, radius_km);
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    Ok(Json(hits))
}

async fn update_worker_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Worker>, AppError> {
    let mut worker = state
        .workers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("worker {} not found", id)))?;

    worker.status = payload.status;
    worker.updated_at = Utc::now();

    Ok(Json(worker.clone()))
}

async fn update_worker_location(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<Worker>, AppError> {
    if !payload.location.in_bounds() {
        return Err(AppError::BadRequest("location out of bounds".to_string()));
    }

    let mut worker = state
        .workers
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("worker {} not found", id)))?;

    worker.location = payload.location;
    worker.updated_at = Utc::now();

    Ok(Json(worker.clone()))
}
