use axum::Router;

use crate::state::SharedState;

/// Swagger UI and OpenAPI document.
pub mod docs;
/// Status banner and health check.
pub mod health;
/// Save-game endpoints.
pub mod progress;
/// Leaderboard endpoints.
pub mod rating;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rating::router())
        .merge(progress::router())
        .merge(docs::router());

    api_router.with_state(state)
}
