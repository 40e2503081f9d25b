use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Cherryty Back.
#[openapi(
    paths(
        crate::routes::health::status,
        crate::routes::health::healthcheck,
        crate::routes::rating::get_rating,
        crate::routes::rating::update_rating,
        crate::routes::rating::cleanup,
        crate::routes::progress::save_progress,
        crate::routes::progress::load_progress,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::StatusResponse,
            crate::dto::rating::UpdateRatingRequest,
            crate::dto::rating::RatingEntry,
            crate::dto::rating::CleanupResponse,
            crate::dto::progress::SaveProgressRequest,
            crate::dto::progress::SaveProgressResponse,
            crate::state::progress::GameState,
        )
    ),
    tags(
        (name = "health", description = "Health and status endpoints"),
        (name = "rating", description = "Leaderboard endpoints"),
        (name = "progress", description = "Save-game endpoints"),
    )
)]
/// Entry point for the generated OpenAPI document.
pub struct ApiDoc;
