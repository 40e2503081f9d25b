//! DTO definitions for the leaderboard endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::validation::validate_not_blank,
    state::{
        coerce::{non_negative, whole_at_least},
        rating::{PurgeSummary, RatingRecord},
    },
};

/// Player statistics pushed by the game client.
///
/// `userId` and `playerNickname` are accepted for clients predating the
/// current field names. Numeric fields accept numbers or numeric strings.
#[serde_as]
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingRequest {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "userId")]
    #[validate(custom(function = "validate_not_blank"))]
    /// Unique player identifier.
    pub player_id: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default, alias = "playerNickname")]
    #[validate(custom(function = "validate_not_blank"))]
    /// Display name shown on the leaderboard.
    pub nickname: String,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    /// Player level; rounded, negative values become zero.
    pub level: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    /// Experience points; rounded, negative values become zero.
    pub experience: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    /// Lifetime earnings; negative values become zero.
    pub total_earned: Option<f64>,
}

impl UpdateRatingRequest {
    /// Build the stored record, stamping it with the server time `now_ms`.
    pub fn into_record(self, now_ms: i64) -> RatingRecord {
        RatingRecord {
            player_id: self.player_id,
            nickname: self.nickname,
            level: whole_at_least(self.level, 0.0) as u32,
            experience: whole_at_least(self.experience, 0.0) as u64,
            total_earned: non_negative(self.total_earned),
            last_updated: now_ms,
        }
    }
}

/// Leaderboard row returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    /// Unique player identifier.
    pub player_id: String,
    /// Display name.
    pub nickname: String,
    /// Player level, the primary ranking key.
    pub level: u32,
    /// Experience points, the tie-breaker at equal level.
    pub experience: u64,
    /// Lifetime earnings.
    pub total_earned: f64,
    /// Server time (unix milliseconds) of the last update.
    pub last_updated: i64,
}

impl From<RatingRecord> for RatingEntry {
    fn from(record: RatingRecord) -> Self {
        Self {
            player_id: record.player_id,
            nickname: record.nickname,
            level: record.level,
            experience: record.experience,
            total_earned: record.total_earned,
            last_updated: record.last_updated,
        }
    }
}

/// Optional override of the purge window.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CleanupQuery {
    /// Drop players not updated for this many days (server default when omitted).
    pub max_age_days: Option<u64>,
}

/// Result of the age-based purge.
#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResponse {
    /// Players removed by the purge.
    pub removed: usize,
    /// Players left in the table.
    pub remaining: usize,
}

impl From<PurgeSummary> for CleanupResponse {
    fn from(summary: PurgeSummary) -> Self {
        Self {
            removed: summary.removed,
            remaining: summary.remaining,
        }
    }
}
