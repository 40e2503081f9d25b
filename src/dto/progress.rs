//! DTO definitions for the save-game endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnError, serde_as};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::validation::validate_not_blank,
    state::progress::{GameState, SaveOutcome},
};

/// Save-game upload. `gameState` is kept untyped here and parsed by
/// [`GameState::parse`] so every field can be coerced individually.
#[serde_as]
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressRequest {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    /// Player owning the save-game.
    pub player_id: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    /// Raw game state; required, checked by the service.
    pub game_state: Option<Value>,
}

/// Outcome of a save: either accepted, or rejected as stale with the
/// server's copy so the client can reconcile.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressResponse {
    /// Whether the save replaced the stored state.
    pub accepted: bool,
    /// Set when the save was rejected as stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
    /// Server time (unix milliseconds) of an accepted save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<i64>,
    /// State currently stored on the server, present on conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_state: Option<GameState>,
}

impl From<SaveOutcome> for SaveProgressResponse {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Accepted { saved_at } => Self {
                accepted: true,
                conflict: None,
                saved_at: Some(saved_at),
                server_state: None,
            },
            SaveOutcome::Conflict { server_state } => Self {
                accepted: false,
                conflict: Some(true),
                saved_at: None,
                server_state: Some(server_state),
            },
        }
    }
}

/// Query of the load endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoadProgressQuery {
    /// Player whose save-game is requested.
    pub player_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn accepted_outcome_serializes_without_conflict_fields() {
        let body = serde_json::to_value(SaveProgressResponse::from(SaveOutcome::Accepted {
            saved_at: 7,
        }))
        .unwrap();

        assert_eq!(body, json!({"accepted": true, "savedAt": 7}));
    }

    #[test]
    fn conflict_outcome_carries_server_state() {
        let body = serde_json::to_value(SaveProgressResponse::from(SaveOutcome::Conflict {
            server_state: GameState::default(),
        }))
        .unwrap();

        assert_eq!(body["accepted"], false);
        assert_eq!(body["conflict"], true);
        assert_eq!(body["serverState"]["unlockedBeds"], 6);
        assert!(body.get("savedAt").is_none());
    }

    #[test]
    fn missing_player_id_fails_validation() {
        let request: SaveProgressRequest =
            serde_json::from_value(json!({"gameState": {}})).unwrap();
        assert!(request.validate().is_err());
    }
}
