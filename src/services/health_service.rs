use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed storage backend and report the overall status.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Some(store) = state.game_store().await else {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded(None);
    };

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded(Some(store.describe()));
    }

    if state.is_degraded() {
        HealthResponse::degraded(Some(store.describe()))
    } else {
        HealthResponse::ok(store.describe())
    }
}
