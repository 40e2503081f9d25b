//! Leaderboard table: one record per player, ranked by level then experience.

use std::{cmp::Ordering, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Soft cap on the number of records kept in the table.
pub const DEFAULT_RATING_CAPACITY: usize = 200;
/// Number of records returned by the public leaderboard.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 100;

/// Leaderboard entry for a single player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    /// Unique player identifier.
    #[serde(alias = "userId")]
    pub player_id: String,
    /// Display name shown on the leaderboard.
    #[serde(alias = "playerNickname")]
    pub nickname: String,
    /// Player level; zero hides the record from the leaderboard.
    #[serde(default)]
    pub level: u32,
    /// Experience points, compared when levels are equal.
    #[serde(default)]
    pub experience: u64,
    /// Lifetime earnings, informational only.
    #[serde(default)]
    pub total_earned: f64,
    /// Server time (unix milliseconds) of the last upsert.
    #[serde(default)]
    pub last_updated: i64,
}

impl RatingRecord {
    /// Whether the record is eligible for the public leaderboard.
    pub fn is_ranked(&self) -> bool {
        !self.nickname.trim().is_empty() && self.level > 0
    }
}

/// Rejection reasons for a rating upsert.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    /// The player id is empty or blank.
    #[error("playerId must not be empty")]
    MissingPlayerId,
    /// The nickname is empty or blank.
    #[error("nickname must not be empty")]
    MissingNickname,
}

/// Result of an age-based purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeSummary {
    /// Records dropped by the purge.
    pub removed: usize,
    /// Records left in the table.
    pub remaining: usize,
}

/// Total ranking order: level descending, then experience descending.
pub fn ranking_order(a: &RatingRecord, b: &RatingRecord) -> Ordering {
    b.level
        .cmp(&a.level)
        .then_with(|| b.experience.cmp(&a.experience))
}

/// In-memory leaderboard owned by the application state.
#[derive(Debug, Clone)]
pub struct RatingTable {
    records: Vec<RatingRecord>,
    capacity: usize,
}

impl RatingTable {
    /// Create an empty table evicting beyond `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild a table from a persisted snapshot.
    ///
    /// Records without a player id are dropped and duplicated ids keep their
    /// last occurrence, so the one-record-per-player rule holds for tables
    /// written by older builds too.
    pub fn from_records(records: Vec<RatingRecord>, capacity: usize) -> Self {
        let mut table = Self::new(capacity);
        for record in records {
            if record.player_id.trim().is_empty() {
                continue;
            }
            table.replace_or_push(record);
        }
        table.enforce_capacity();
        table
    }

    /// Insert or fully replace the record for `record.player_id`.
    pub fn upsert(&mut self, record: RatingRecord) -> Result<(), RatingError> {
        if record.player_id.trim().is_empty() {
            return Err(RatingError::MissingPlayerId);
        }
        if record.nickname.trim().is_empty() {
            return Err(RatingError::MissingNickname);
        }

        self.replace_or_push(record);
        self.enforce_capacity();
        Ok(())
    }

    /// Ranked, eligible records truncated to `n`. The stored order is left untouched.
    pub fn top_n(&self, n: usize) -> Vec<RatingRecord> {
        let mut ranked = self
            .records
            .iter()
            .filter(|record| record.is_ranked())
            .cloned()
            .collect::<Vec<_>>();
        // Stable: equal ranks keep table order so the board does not flicker.
        ranked.sort_by(ranking_order);
        ranked.truncate(n);
        ranked
    }

    /// Drop every record last updated before `now_ms - max_age`.
    pub fn purge_older_than(&mut self, max_age: Duration, now_ms: i64) -> PurgeSummary {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_ms.saturating_sub(max_age_ms);
        let before = self.records.len();
        self.records.retain(|record| record.last_updated >= cutoff);

        PurgeSummary {
            removed: before - self.records.len(),
            remaining: self.records.len(),
        }
    }

    /// Record stored for `player_id`, if any.
    pub fn get(&self, player_id: &str) -> Option<&RatingRecord> {
        self.records
            .iter()
            .find(|record| record.player_id == player_id)
    }

    /// Point-in-time copy of the whole table.
    pub fn snapshot(&self) -> Vec<RatingRecord> {
        self.records.clone()
    }

    /// Number of stored records, ranked or not.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn replace_or_push(&mut self, record: RatingRecord) {
        match self
            .records
            .iter_mut()
            .find(|existing| existing.player_id == record.player_id)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    fn enforce_capacity(&mut self) {
        if self.records.len() <= self.capacity {
            return;
        }
        self.records.sort_by(ranking_order);
        self.records.truncate(self.capacity);
    }
}

impl Default for RatingTable {
    fn default() -> Self {
        Self::new(DEFAULT_RATING_CAPACITY)
    }
}
