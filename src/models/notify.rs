use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyState {
    Ready,
    Notifying,
    Notified,
    Cooldown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerNotifyStatus {
    pub worker_id: Uuid,
    pub status: NotifyState,
    pub cooldown_seconds_remaining: i64,
}

#[derive(Debug, Clone)]
pub struct NotifyRequest {
    pub worker_id: Uuid,
    pub message: String,
    pub requested_at: DateTime<Utc>,
}
