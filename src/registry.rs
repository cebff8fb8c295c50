//! In-memory campaign registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::leaf::ADDRESS_BYTES;
use crate::merkle::{Hash, MerkleTree};

/// A named eligibility set with its committed tree.
///
/// Immutable once stored. Re-submitting a campaign id builds a brand-new
/// `Campaign` and swaps the `Arc` in the registry; nothing mutates in place,
/// so a reader holding the old snapshot keeps a consistent
/// tree/root/member-list triple.
pub struct Campaign {
    pub id: String,
    pub tree: MerkleTree,
    pub root: Hash,
    /// Canonical address bytes mapped to the entitlement hashed into that
    /// member's leaf. Lookups are case-insensitive because every caller
    /// parses through the leaf encoder first.
    pub members: HashMap<[u8; ADDRESS_BYTES], u128>,
    pub created_at: DateTime<Utc>,
}

/// Shared store mapping campaign ids to their current snapshot.
#[derive(Default)]
pub struct TreeRegistry {
    campaigns: RwLock<HashMap<String, Arc<Campaign>>>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a campaign, replacing any previous snapshot under the same id.
    pub fn put(&self, campaign: Campaign) -> Arc<Campaign> {
        let snapshot = Arc::new(campaign);
        let mut campaigns = self.campaigns.write().unwrap();
        campaigns.insert(snapshot.id.clone(), snapshot.clone());
        snapshot
    }

    /// Current snapshot for `id`, if any.
    pub fn get(&self, id: &str) -> Option<Arc<Campaign>> {
        let campaigns = self.campaigns.read().unwrap();
        campaigns.get(id).cloned()
    }

    /// All stored campaigns, oldest first.
    pub fn list(&self) -> Vec<Arc<Campaign>> {
        let campaigns = self.campaigns.read().unwrap();
        let mut all: Vec<Arc<Campaign>> = campaigns.values().cloned().collect();
        all.sort_by_key(|c| c.created_at);
        all
    }
}
