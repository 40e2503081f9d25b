//! Per-player save-game table with last-writer-wins conflict detection.
//!
//! Ordering between saves uses the client-supplied `clientTimestamp`; the
//! server-assigned `savedAt` is informational only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::coerce::{clamp_round, non_negative, whole_at_least};

/// Inclusive bounds for the number of unlocked garden beds.
pub const BEDS_RANGE: (u8, u8) = (6, 64);
/// Inclusive bounds for the tools upgrade level.
pub const TOOLS_LEVEL_RANGE: (u8, u8) = (1, 16);
/// Lowest player level.
pub const MIN_LEVEL: u32 = 1;

/// Sanitized save-game state of a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current balance, never negative.
    pub money: f64,
    /// Unlocked garden beds, within [`BEDS_RANGE`].
    pub unlocked_beds: u8,
    /// Tools upgrade level, within [`TOOLS_LEVEL_RANGE`].
    pub tools_level: u8,
    /// Tool identifier to unlocked flag.
    #[schema(value_type = Object)]
    pub tools_unlocked: IndexMap<String, bool>,
    /// Plant currently selected in the client.
    pub selected_plant: String,
    /// Garden cells in client order; cell contents are opaque to the server.
    #[schema(value_type = Vec<Object>)]
    pub farm_map: Vec<Value>,
    /// Lifetime earnings, never negative.
    pub total_earned: f64,
    /// Player level, at least [`MIN_LEVEL`].
    pub level: u32,
    /// Experience points, never negative.
    pub experience: f64,
    /// Logical clock supplied by the client, used to order saves.
    pub client_timestamp: i64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            money: 0.0,
            unlocked_beds: BEDS_RANGE.0,
            tools_level: TOOLS_LEVEL_RANGE.0,
            tools_unlocked: IndexMap::new(),
            selected_plant: String::new(),
            farm_map: Vec::new(),
            total_earned: 0.0,
            level: MIN_LEVEL,
            experience: 0.0,
            client_timestamp: 0,
        }
    }
}

/// Lenient view of a client payload. Every field tolerates absence, `null`,
/// numeric strings and wrong types; [`GameState::sanitize`] turns it into a
/// valid state.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameStateInput {
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) money: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) unlocked_beds: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) tools_level: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub(crate) tools_unlocked: Option<IndexMap<String, Value>>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub(crate) selected_plant: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub(crate) farm_map: Option<Vec<Value>>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) total_earned: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) level: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) experience: Option<f64>,
    #[serde_as(deserialize_as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    #[serde(default)]
    pub(crate) client_timestamp: Option<f64>,
}

impl GameState {
    /// Parse an untyped payload. Only a non-object payload is rejected; every
    /// field inside the object is coerced instead.
    pub fn parse(payload: Value) -> Result<Self, ProgressError> {
        if !payload.is_object() {
            return Err(ProgressError::MalformedGameState(
                "gameState must be a JSON object".into(),
            ));
        }
        let input = serde_json::from_value::<GameStateInput>(payload)
            .map_err(|err| ProgressError::MalformedGameState(err.to_string()))?;
        Ok(Self::sanitize(input))
    }

    /// Apply the clamp and default rules to a lenient payload.
    pub(crate) fn sanitize(input: GameStateInput) -> Self {
        let tools_unlocked = input
            .tools_unlocked
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(tool, flag)| flag.as_bool().map(|flag| (tool, flag)))
            .collect();

        Self {
            money: non_negative(input.money),
            unlocked_beds: clamp_round(input.unlocked_beds, BEDS_RANGE.0, BEDS_RANGE.1),
            tools_level: clamp_round(
                input.tools_level,
                TOOLS_LEVEL_RANGE.0,
                TOOLS_LEVEL_RANGE.1,
            ),
            tools_unlocked,
            selected_plant: input.selected_plant.unwrap_or_default(),
            farm_map: input.farm_map.unwrap_or_default(),
            total_earned: non_negative(input.total_earned),
            level: whole_at_least(input.level, f64::from(MIN_LEVEL)) as u32,
            experience: non_negative(input.experience),
            client_timestamp: non_negative(input.client_timestamp).trunc() as i64,
        }
    }
}

/// Rejection reasons for a progress save.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    /// The player id is empty or blank.
    #[error("playerId must not be empty")]
    MissingPlayerId,
    /// The game state is not a JSON object or cannot be read as one.
    #[error("malformed gameState: {0}")]
    MalformedGameState(String),
}

/// Stored save-game of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Owner of the save-game.
    pub player_id: String,
    /// Last accepted state.
    pub game_state: GameState,
    /// Server time (unix milliseconds) of the accepted save.
    pub saved_at: i64,
}

/// Outcome of [`ProgressTable::upsert`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// Incoming state replaced the stored one.
    Accepted {
        /// Server time (unix milliseconds) of the save.
        saved_at: i64,
    },
    /// Stored state is newer; nothing was changed.
    Conflict {
        /// State currently stored for the player.
        server_state: GameState,
    },
}

/// In-memory save-game table keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct ProgressTable {
    snapshots: IndexMap<String, ProgressSnapshot>,
}

impl ProgressTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from a persisted snapshot; later duplicates win.
    pub fn from_snapshots(snapshots: Vec<ProgressSnapshot>) -> Self {
        let snapshots = snapshots
            .into_iter()
            .filter(|snapshot| !snapshot.player_id.trim().is_empty())
            .map(|snapshot| (snapshot.player_id.clone(), snapshot))
            .collect();
        Self { snapshots }
    }

    /// Store `game_state` unless the stored state carries a newer client timestamp.
    pub fn upsert(
        &mut self,
        player_id: &str,
        game_state: GameState,
        now_ms: i64,
    ) -> Result<SaveOutcome, ProgressError> {
        if player_id.trim().is_empty() {
            return Err(ProgressError::MissingPlayerId);
        }

        if let Some(existing) = self.snapshots.get(player_id) {
            if existing.game_state.client_timestamp > game_state.client_timestamp {
                return Ok(SaveOutcome::Conflict {
                    server_state: existing.game_state.clone(),
                });
            }
        }

        self.snapshots.insert(
            player_id.to_owned(),
            ProgressSnapshot {
                player_id: player_id.to_owned(),
                game_state,
                saved_at: now_ms,
            },
        );
        Ok(SaveOutcome::Accepted { saved_at: now_ms })
    }

    /// Stored state for `player_id`; absence is not an error.
    pub fn get(&self, player_id: &str) -> Option<&GameState> {
        self.snapshots
            .get(player_id)
            .map(|snapshot| &snapshot.game_state)
    }

    /// Point-in-time copy of the whole table.
    pub fn snapshot(&self) -> Vec<ProgressSnapshot> {
        self.snapshots.values().cloned().collect()
    }

    /// Number of players with a stored save-game.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether no save-game is stored.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn state_at(client_timestamp: i64, money: f64) -> GameState {
        GameState {
            money,
            client_timestamp,
            ..GameState::default()
        }
    }

    #[test]
    fn older_client_timestamp_is_rejected() {
        let mut table = ProgressTable::new();
        let first = state_at(100, 10.0);
        table.upsert("u1", first.clone(), 1_000).unwrap();

        let outcome = table.upsert("u1", state_at(50, 99.0), 2_000).unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::Conflict {
                server_state: first.clone()
            }
        );
        assert_eq!(table.get("u1"), Some(&first));
        assert_eq!(table.snapshot()[0].saved_at, 1_000);
    }

    #[test]
    fn equal_or_newer_timestamp_replaces_state() {
        let mut table = ProgressTable::new();
        table.upsert("u1", state_at(100, 10.0), 1_000).unwrap();

        let same = state_at(100, 20.0);
        assert_eq!(
            table.upsert("u1", same.clone(), 2_000).unwrap(),
            SaveOutcome::Accepted { saved_at: 2_000 }
        );
        assert_eq!(table.get("u1"), Some(&same));

        let newer = state_at(150, 5.0);
        table.upsert("u1", newer.clone(), 3_000).unwrap();
        assert_eq!(table.get("u1"), Some(&newer));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn players_do_not_conflict_with_each_other() {
        let mut table = ProgressTable::new();
        table.upsert("u1", state_at(500, 1.0), 1).unwrap();

        let outcome = table.upsert("u2", state_at(1, 1.0), 2).unwrap();
        assert_eq!(outcome, SaveOutcome::Accepted { saved_at: 2 });
    }

    #[test]
    fn get_unknown_player_is_none() {
        let table = ProgressTable::new();
        assert!(table.get("ghost").is_none());
    }

    #[test]
    fn blank_player_id_is_rejected() {
        let mut table = ProgressTable::new();
        assert_eq!(
            table.upsert(" ", GameState::default(), 1),
            Err(ProgressError::MissingPlayerId)
        );
        assert!(table.is_empty());
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(
            GameState::parse(json!([1, 2, 3])),
            Err(ProgressError::MalformedGameState(_))
        ));
        assert!(matches!(
            GameState::parse(Value::Null),
            Err(ProgressError::MalformedGameState(_))
        ));
    }

    #[test]
    fn parse_clamps_out_of_range_values() {
        let state = GameState::parse(json!({
            "money": -40,
            "unlockedBeds": 120,
            "toolsLevel": 0,
            "level": -3,
            "experience": "12.5",
            "totalEarned": "lots",
            "clientTimestamp": 1700000000123.9,
        }))
        .unwrap();

        assert_eq!(state.money, 0.0);
        assert_eq!(state.unlocked_beds, 64);
        assert_eq!(state.tools_level, 1);
        assert_eq!(state.level, 1);
        assert_eq!(state.experience, 12.5);
        assert_eq!(state.total_earned, 0.0);
        assert_eq!(state.client_timestamp, 1_700_000_000_123);
    }

    #[test]
    fn parse_fills_defaults_for_missing_or_mistyped_fields() {
        let state = GameState::parse(json!({
            "unlockedBeds": null,
            "toolsUnlocked": "everything",
            "selectedPlant": 7,
            "farmMap": {"not": "a list"},
        }))
        .unwrap();

        assert_eq!(state, GameState::default());
    }

    #[test]
    fn parse_keeps_valid_payload() {
        let state = GameState::parse(json!({
            "money": 350.5,
            "unlockedBeds": 12.4,
            "toolsLevel": "3",
            "toolsUnlocked": {"hoe": true, "can": false, "broken": "yes"},
            "selectedPlant": "cherry",
            "farmMap": [{"plant": "cherry", "stage": 2}, null],
            "totalEarned": 1200,
            "level": 4,
            "experience": 80,
            "clientTimestamp": 42,
        }))
        .unwrap();

        assert_eq!(state.money, 350.5);
        assert_eq!(state.unlocked_beds, 12);
        assert_eq!(state.tools_level, 3);
        assert_eq!(state.tools_unlocked.len(), 2);
        assert_eq!(state.tools_unlocked.get("hoe"), Some(&true));
        assert_eq!(state.tools_unlocked.get("can"), Some(&false));
        assert_eq!(state.selected_plant, "cherry");
        assert_eq!(state.farm_map.len(), 2);
        assert_eq!(state.level, 4);
        assert_eq!(state.client_timestamp, 42);
    }

    #[test]
    fn from_snapshots_deduplicates_and_drops_blank_ids() {
        let saved = |player_id: &str, client_timestamp: i64, saved_at: i64| ProgressSnapshot {
            player_id: player_id.into(),
            game_state: state_at(client_timestamp, 0.0),
            saved_at,
        };

        let table = ProgressTable::from_snapshots(vec![
            saved("u1", 10, 1),
            saved("  ", 99, 2),
            saved("u2", 5, 3),
            saved("u1", 20, 4),
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("u1").map(|s| s.client_timestamp), Some(20));
        assert!(table.get("  ").is_none());
        let ids = table
            .snapshot()
            .into_iter()
            .map(|s| s.player_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let mut table = ProgressTable::new();
        table.upsert("b", GameState::default(), 1).unwrap();
        table.upsert("a", GameState::default(), 2).unwrap();

        let ids = table
            .snapshot()
            .into_iter()
            .map(|s| s.player_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
