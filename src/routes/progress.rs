use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::progress::{LoadProgressQuery, SaveProgressRequest, SaveProgressResponse},
    error::AppError,
    services::progress_service,
    state::{SharedState, progress::GameState},
};

/// Save-game endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/save-progress", post(save_progress))
        .route("/api/load-progress", get(load_progress))
}

#[utoipa::path(
    post,
    path = "/api/save-progress",
    tag = "progress",
    request_body = SaveProgressRequest,
    responses(
        (status = 200, description = "Save accepted, or rejected as stale with the server state", body = SaveProgressResponse),
        (status = 400, description = "Body is not a JSON object, or playerId or gameState is missing")
    )
)]
/// Store a save-game unless the server holds one with a newer client timestamp.
pub async fn save_progress(
    State(state): State<SharedState>,
    payload: Result<Json<SaveProgressRequest>, JsonRejection>,
) -> Result<Json<SaveProgressResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let response = progress_service::save_progress(&state, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/load-progress",
    tag = "progress",
    params(LoadProgressQuery),
    responses(
        (status = 200, description = "Stored save-game, or null when none exists", body = GameState),
        (status = 400, description = "playerId missing")
    )
)]
/// Return the stored save-game of a player, or `null`.
pub async fn load_progress(
    State(state): State<SharedState>,
    Query(query): Query<LoadProgressQuery>,
) -> Result<Json<Option<GameState>>, AppError> {
    let game_state = progress_service::load_progress(&state, query.player_id).await?;
    Ok(Json(game_state))
}
