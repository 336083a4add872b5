use crate::error::AppError;
use crate::models::notify::NotifyRequest;
use crate::state::AppState;

pub async fn enqueue_notify(state: &AppState, request: NotifyRequest) -> Result<(), AppError> {
    state
        .notify_tx
        .send(request)
        .await
        .map_err(|err| AppError::Internal(format!("notify queue send failed: {err}")))?;

    state.metrics.notifies_in_queue.inc();
    Ok(())
}
