use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::warn;

use crate::error::AppError;
use crate::location::default_location;
use crate::models::location::UserLocation;
use crate::models::worker::GeoPoint;
use crate::state::AppState;
use crate::store::LAST_LOCATION_KEY;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/location", get(current_location).put(update_location))
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub lat: f64,
    pub lng: f64,
}

async fn update_location(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<UserLocation>, AppError> {
    let point = GeoPoint {
        lat: payload.lat,
        lng: payload.lng,
    };

    if !point.in_bounds() {
        return Err(AppError::BadRequest("location out of bounds".to_string()));
    }

    let resolved = state.resolver.resolve(&point).await;
    state
        .metrics
        .geocode_resolutions_total
        .with_label_values(&[resolved.source.unwrap_or("unresolved")])
        .inc();

    // Last write wins: a newer resolution replaces the slot wholesale.
    *state.location.write().await = Some(resolved.location.clone());

    match serde_json::to_string(&resolved.location) {
        Ok(json) => {
            if let Err(err) = state.store.set(LAST_LOCATION_KEY, &json).await {
                warn!(error = %err, "failed to persist last location");
            }
        }
        Err(err) => warn!(error = %err, "failed to serialize location"),
    }

    Ok(Json(resolved.location))
}

async fn current_location(State(state): State<Arc<AppState>>) -> Json<UserLocation> {
    if let Some(location) = state.location.read().await.clone() {
        return Json(location);
    }

    if let Ok(Some(raw)) = state.store.get(LAST_LOCATION_KEY).await {
        if let Ok(location) = serde_json::from_str::<UserLocation>(&raw) {
            return Json(location);
        }
    }

    Json(default_location())
}
