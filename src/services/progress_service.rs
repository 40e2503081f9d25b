//! Save-game operations on the shared progress table.

use tracing::{debug, info};

use crate::{
    dto::progress::{SaveProgressRequest, SaveProgressResponse},
    error::ServiceError,
    state::{
        SharedState, now_millis,
        progress::{GameState, SaveOutcome},
    },
};

/// Store a player's save-game unless the server already holds a newer one.
pub async fn save_progress(
    state: &SharedState,
    request: SaveProgressRequest,
) -> Result<SaveProgressResponse, ServiceError> {
    let SaveProgressRequest {
        player_id,
        game_state,
    } = request;

    let payload = game_state
        .ok_or_else(|| ServiceError::InvalidInput("gameState is required".into()))?;
    let game_state = GameState::parse(payload)?;
    let client_timestamp = game_state.client_timestamp;
    let now = now_millis();

    let outcome = state
        .progress()
        .mutate(|table| table.upsert(&player_id, game_state, now))
        .await?;

    match &outcome {
        SaveOutcome::Accepted { .. } => {
            info!(player_id = %player_id, client_timestamp, "progress saved");
        }
        SaveOutcome::Conflict { server_state } => {
            info!(
                player_id = %player_id,
                client_timestamp,
                server_timestamp = server_state.client_timestamp,
                "stale progress rejected"
            );
        }
    }

    Ok(outcome.into())
}

/// Return the stored save-game for `player_id`, `None` when there is none.
pub async fn load_progress(
    state: &SharedState,
    player_id: Option<String>,
) -> Result<Option<GameState>, ServiceError> {
    let player_id = player_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServiceError::InvalidInput("playerId is required".into()))?;

    let game_state = state.progress().read().await.get(&player_id).cloned();
    debug!(player_id = %player_id, found = game_state.is_some(), "progress lookup");
    Ok(game_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{Value, json};

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

    fn request(body: Value) -> SaveProgressRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn stale_save_returns_server_state() {
        let state = state();
        let first = save_progress(
            &state,
            request(json!({"playerId": "u1", "gameState": {"money": 10, "clientTimestamp": 100}})),
        )
        .await
        .unwrap();
        assert!(first.accepted);

        let second = save_progress(
            &state,
            request(json!({"playerId": "u1", "gameState": {"money": 99, "clientTimestamp": 50}})),
        )
        .await
        .unwrap();

        assert!(!second.accepted);
        assert_eq!(second.conflict, Some(true));
        let server_state = second.server_state.unwrap();
        assert_eq!(server_state.client_timestamp, 100);
        assert_eq!(server_state.money, 10.0);
    }

    #[tokio::test]
    async fn load_returns_latest_accepted_state() {
        let state = state();
        save_progress(
            &state,
            request(json!({"playerId": "u1", "gameState": {"level": 3, "clientTimestamp": 1}})),
        )
        .await
        .unwrap();

        let loaded = load_progress(&state, Some("u1".into())).await.unwrap();
        assert_eq!(loaded.map(|s| s.level), Some(3));
        assert!(load_progress(&state, Some("u2".into())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_fields_are_invalid_input() {
        let state = state();

        assert!(save_progress(&state, request(json!({"playerId": "u1"}))).await.is_err());
        assert!(
            save_progress(&state, request(json!({"playerId": "u1", "gameState": 5})))
                .await
                .is_err()
        );
        assert!(load_progress(&state, None).await.is_err());
        assert!(load_progress(&state, Some("  ".into())).await.is_err());
        assert!(!state.progress().is_dirty());
    }
}
