use tracing::warn;

use crate::{
    dto::{
        format_system_time,
        health::{HealthResponse, StatusResponse},
    },
    state::SharedState,
};

/// Report degraded mode while the last snapshot flush failed.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if state.is_degraded() {
        warn!("snapshots are not reaching the disk (degraded mode)");
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

/// Summarize table sizes for the root banner.
pub async fn server_status(state: &SharedState) -> StatusResponse {
    let players = state.ratings().read().await.len();
    let saves = state.progress().read().await.len();

    StatusResponse {
        status: "Cherryty Rating Server is running!".into(),
        players,
        saves,
        version: env!("CARGO_PKG_VERSION").into(),
        started_at: format_system_time(state.started_at()),
    }
}
