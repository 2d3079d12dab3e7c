use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How often a companion was co-purchased with its anchor, and when last.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionStat {
    pub count: u32,
    pub last_purchased: DateTime<Utc>,
}

/// Persisted co-occurrence map: anchor name → companion name → stat.
///
/// Names are case-sensitive as entered. The whole map round-trips through
/// a single JSON blob in the local state store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoOccurrenceState {
    pub anchors: HashMap<String, HashMap<String, CompanionStat>>,
}

impl CoOccurrenceState {
    pub fn from_blob(blob: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(blob)
    }

    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Counts one co-purchase of `companion` alongside `anchor`.
    pub fn record(&mut self, anchor: &str, companion: &str, now: DateTime<Utc>) {
        let stat = self
            .anchors
            .entry(anchor.to_string())
            .or_default()
            .entry(companion.to_string())
            .or_insert(CompanionStat { count: 0, last_purchased: now });
        stat.count += 1;
        stat.last_purchased = now;
    }

    pub fn companions(&self, anchor: &str) -> Option<&HashMap<String, CompanionStat>> {
        self.anchors.get(anchor)
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
