//! Append-only achievement ledger, unrelated to the Merkle core.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRecord {
    pub player: String,
    pub achievement_id: String,
    pub recorded_at: DateTime<Utc>,
}

/// In-memory list of (player, achievement) events. Records are only ever
/// appended; they live for the process lifetime like the campaign registry.
#[derive(Default)]
pub struct AchievementLedger {
    records: RwLock<Vec<AchievementRecord>>,
}

impl AchievementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, player: &str, achievement_id: &str) -> AchievementRecord {
        let record = AchievementRecord {
            player: player.to_string(),
            achievement_id: achievement_id.to_string(),
            recorded_at: Utc::now(),
        };
        let mut records = self.records.write().unwrap();
        records.push(record.clone());
        record
    }

    pub fn for_player(&self, player: &str) -> Vec<AchievementRecord> {
        let records = self.records.read().unwrap();
        records.iter().filter(|r| r.player == player).cloned().collect()
    }
}
