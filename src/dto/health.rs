use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Create a health response indicating snapshots are not reaching the disk.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}

/// Banner served on `/` with table sizes and build version.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Human readable banner.
    pub status: String,
    /// Number of players on the leaderboard table.
    pub players: usize,
    /// Number of stored save-games.
    pub saves: usize,
    /// Crate version of the running build.
    pub version: String,
    /// RFC 3339 start time of this process.
    pub started_at: String,
}
