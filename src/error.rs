use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::engine::cooldown::CooldownError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("notify already in flight for worker {0}")]
    NotifyInFlight(Uuid),

    #[error("worker {worker_id} in cooldown: retry in {remaining_secs}s")]
    CooldownActive { worker_id: Uuid, remaining_secs: i64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<CooldownError> for AppError {
    fn from(err: CooldownError) -> Self {
        match err {
            CooldownError::InFlight(worker_id) => AppError::NotifyInFlight(worker_id),
            CooldownError::CoolingDown {
                worker_id,
                remaining_secs,
            } => AppError::CooldownActive {
                worker_id,
                remaining_secs,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotifyInFlight(_) => StatusCode::CONFLICT,
            AppError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
