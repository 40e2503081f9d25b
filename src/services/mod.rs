/// OpenAPI documentation generation.
pub mod documentation;
/// Periodic persistence of the in-memory tables.
pub mod flush_scheduler;
/// Health check and status banner.
pub mod health_service;
/// Self-ping keeping the hosting instance awake.
#[cfg(feature = "keep-alive")]
pub mod keep_alive;
/// Save-game persistence with conflict detection.
pub mod progress_service;
/// Leaderboard queries, updates and cleanup.
pub mod rating_service;
