use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::health::{HealthResponse, StatusResponse},
    services::health_service,
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server banner with table sizes", body = StatusResponse))
)]
/// Return a human-readable banner with the number of players and saves.
pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(health_service::server_status(&state).await)
}

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
/// Return the current health status, reporting degraded mode when snapshots fail to persist.
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    let status = health_service::health_status(&state).await;
    Json(status)
}

/// Configure the health routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/", get(status))
        .route("/healthcheck", get(healthcheck))
}
