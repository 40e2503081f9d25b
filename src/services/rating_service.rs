//! Leaderboard operations on the shared rating table.

use std::time::Duration;

use tracing::{debug, info};

use crate::{
    dto::rating::{CleanupResponse, RatingEntry, UpdateRatingRequest},
    error::ServiceError,
    state::{SharedState, now_millis},
};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Return the ranked leaderboard.
pub async fn leaderboard(state: &SharedState) -> Vec<RatingEntry> {
    let limit = state.config().leaderboard_size();
    let top = state.ratings().read().await.top_n(limit);
    debug!(count = top.len(), "serving leaderboard");
    top.into_iter().map(RatingEntry::from).collect()
}

/// Upsert a player's statistics and return the refreshed leaderboard.
pub async fn update_rating(
    state: &SharedState,
    request: UpdateRatingRequest,
) -> Result<Vec<RatingEntry>, ServiceError> {
    let record = request.into_record(now_millis());
    let player_id = record.player_id.clone();
    let limit = state.config().leaderboard_size();

    let (total, top) = state
        .ratings()
        .mutate(|table| {
            table.upsert(record)?;
            Ok::<_, ServiceError>((table.len(), table.top_n(limit)))
        })
        .await?;

    info!(player_id = %player_id, players = total, "rating updated");
    Ok(top.into_iter().map(RatingEntry::from).collect())
}

/// Purge players not updated within `max_age_days` (configured default when `None`).
pub async fn cleanup(
    state: &SharedState,
    max_age_days: Option<u64>,
) -> Result<CleanupResponse, ServiceError> {
    let max_age = match max_age_days {
        Some(days) => days
            .checked_mul(SECS_PER_DAY)
            .map(Duration::from_secs)
            .ok_or_else(|| ServiceError::InvalidInput("maxAgeDays is too large".into()))?,
        None => state.config().cleanup_max_age(),
    };

    let now = now_millis();
    let summary = state
        .ratings()
        .mutate(|table| Ok::<_, ServiceError>(table.purge_older_than(max_age, now)))
        .await?;

    info!(
        removed = summary.removed,
        remaining = summary.remaining,
        max_age_secs = max_age.as_secs(),
        "purged stale ratings"
    );
    Ok(summary.into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig, dao::snapshot_store::file::FileSnapshotStore, state::AppState,
    };

    fn state() -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(FileSnapshotStore::new("unused")),
        )
    }

    fn request(player_id: &str, nickname: &str, level: u32, experience: u64) -> UpdateRatingRequest {
        serde_json::from_value(json!({
            "playerId": player_id,
            "nickname": nickname,
            "level": level,
            "experience": experience,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn update_returns_ranked_board_and_marks_dirty() {
        let state = state();
        update_rating(&state, request("u1", "Ann", 5, 100)).await.unwrap();
        let board = update_rating(&state, request("u2", "Bob", 5, 200))
            .await
            .unwrap();

        let names = board.iter().map(|e| e.nickname.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Bob", "Ann"]);
        assert!(state.ratings().is_dirty());
        assert!(board.iter().all(|e| e.last_updated > 0));
    }

    #[tokio::test]
    async fn rejected_update_leaves_table_clean() {
        let state = state();
        let err = update_rating(&state, request("u1", " ", 1, 1)).await;

        assert!(matches!(err, Err(ServiceError::InvalidInput(_))));
        assert!(!state.ratings().is_dirty());
        assert!(leaderboard(&state).await.is_empty());
    }

    #[tokio::test]
    async fn cleanup_keeps_fresh_players() {
        let state = state();
        update_rating(&state, request("u1", "Ann", 2, 0)).await.unwrap();

        let summary = cleanup(&state, None).await.unwrap();
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.remaining, 1);

        let summary = cleanup(&state, Some(0)).await.unwrap();
        assert_eq!(summary.remaining + summary.removed, 1);
    }

    #[tokio::test]
    async fn cleanup_rejects_overflowing_window() {
        let state = state();
        assert!(cleanup(&state, Some(u64::MAX)).await.is_err());
    }
}
