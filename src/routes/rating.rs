use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{delete, get, post},
};
use validator::Validate;

use crate::{
    dto::rating::{CleanupQuery, CleanupResponse, RatingEntry, UpdateRatingRequest},
    error::AppError,
    services::rating_service,
    state::SharedState,
};

/// Leaderboard endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/rating", get(get_rating))
        .route("/api/update-rating", post(update_rating))
        .route("/api/cleanup", delete(cleanup))
}

#[utoipa::path(
    get,
    path = "/api/rating",
    tag = "rating",
    responses((status = 200, description = "Top players, best first", body = [RatingEntry]))
)]
/// Return the top players ranked by level, then experience.
pub async fn get_rating(State(state): State<SharedState>) -> Json<Vec<RatingEntry>> {
    Json(rating_service::leaderboard(&state).await)
}

#[utoipa::path(
    post,
    path = "/api/update-rating",
    tag = "rating",
    request_body = UpdateRatingRequest,
    responses(
        (status = 200, description = "Rating stored; refreshed leaderboard", body = [RatingEntry]),
        (status = 400, description = "Body is not a JSON object, or playerId or nickname is missing")
    )
)]
/// Insert or replace a player's statistics and return the refreshed leaderboard.
pub async fn update_rating(
    State(state): State<SharedState>,
    payload: Result<Json<UpdateRatingRequest>, JsonRejection>,
) -> Result<Json<Vec<RatingEntry>>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let board = rating_service::update_rating(&state, payload).await?;
    Ok(Json(board))
}

#[utoipa::path(
    delete,
    path = "/api/cleanup",
    tag = "rating",
    params(CleanupQuery),
    responses((status = 200, description = "Stale players removed", body = CleanupResponse))
)]
/// Remove players whose rating was not updated within the purge window.
pub async fn cleanup(
    State(state): State<SharedState>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupResponse>, AppError> {
    let summary = rating_service::cleanup(&state, query.max_age_days).await?;
    Ok(Json(summary))
}
