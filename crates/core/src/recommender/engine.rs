use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::Clock;

use super::state::{CompanionStat, CoOccurrenceState};
use super::static_companions;
use super::store::StateStore;
use super::{DECAY_FACTOR, MAX_AGE_DAYS, MAX_SUGGESTIONS, STATIC_BASE_SCORE, USAGE_THRESHOLD};

/// Co-occurrence recommender for a single user session.
///
/// Explicitly constructed with its store and clock; tests instantiate
/// isolated copies instead of sharing a module-level singleton.
pub struct Recommender {
    state: CoOccurrenceState,
    store: Box<dyn StateStore>,
    clock: Box<dyn Clock>,
}

impl Recommender {
    /// Loads persisted state from the store, cold-starting with an empty
    /// map when the store is unreadable or holds a corrupt blob.
    pub fn new(store: Box<dyn StateStore>, clock: Box<dyn Clock>) -> Self {
        let state = match store.load() {
            Ok(Some(blob)) => CoOccurrenceState::from_blob(&blob).unwrap_or_else(|error| {
                warn!(
                    event_name = "recommender.state.corrupt",
                    error = %error,
                    "persisted recommendation state is not valid JSON, starting empty"
                );
                CoOccurrenceState::default()
            }),
            Ok(None) => CoOccurrenceState::default(),
            Err(error) => {
                warn!(
                    event_name = "recommender.state.load_failed",
                    error = %error,
                    "could not read recommendation state, starting empty"
                );
                CoOccurrenceState::default()
            }
        };

        Self { state, store, clock }
    }

    /// Records pairwise co-occurrence for the given purchase list.
    ///
    /// Each item is paired with the items that follow it, so every
    /// unordered pair is counted once per call. Empty and single-element
    /// lists record nothing but still trigger cleanup and persistence.
    pub fn add_purchase_data(&mut self, items: &[String]) {
        let now = self.clock.now();

        for (index, item) in items.iter().enumerate() {
            for companion in &items[index + 1..] {
                if companion == item {
                    continue;
                }
                self.state.record(item, companion, now);
            }
        }

        self.cleanup_old_data();
    }

    /// Returns up to [`MAX_SUGGESTIONS`] companions for `item`.
    ///
    /// Starter-table entries participate unconditionally at
    /// [`STATIC_BASE_SCORE`]; learned entries must clear
    /// [`USAGE_THRESHOLD`] after decay. The merged set is deduplicated by
    /// name (highest score wins), never contains the anchor, and is
    /// ordered by score descending.
    pub fn get_recommendations(&self, item: &str) -> Vec<String> {
        let now = self.clock.now();

        let mut candidates: Vec<(String, f64)> = static_companions(item)
            .iter()
            .map(|companion| ((*companion).to_string(), STATIC_BASE_SCORE))
            .collect();

        if let Some(companions) = self.state.companions(item) {
            let mut learned: Vec<(String, f64)> = companions
                .iter()
                .map(|(name, stat)| (name.clone(), decayed_score(stat, now)))
                .filter(|(_, score)| *score >= USAGE_THRESHOLD)
                .collect();
            // HashMap iteration order is arbitrary; fix it before merging.
            learned.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            candidates.extend(learned);
        }

        let mut merged: Vec<(String, f64)> = Vec::new();
        for (name, score) in candidates {
            if name == item {
                continue;
            }
            match merged.iter_mut().find(|(existing, _)| *existing == name) {
                Some(existing) => existing.1 = existing.1.max(score),
                None => merged.push((name, score)),
            }
        }

        // Stable sort keeps starter-table order among equal scores.
        merged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        merged.truncate(MAX_SUGGESTIONS);
        merged.into_iter().map(|(name, _)| name).collect()
    }

    /// Drops learned pairs that aged past [`MAX_AGE_DAYS`] or whose score
    /// decayed below [`USAGE_THRESHOLD`], then persists.
    ///
    /// Pairs recorded today are exempt from the score test: decay has not
    /// acted on them yet, and purging them here would erase a pair before
    /// a same-day repurchase could lift it over the threshold. One-off
    /// pairings instead fall out on the first cleanup after they age.
    pub fn cleanup_old_data(&mut self) {
        let now = self.clock.now();

        self.state.anchors.retain(|_, companions| {
            companions.retain(|_, stat| {
                let age_days = age_in_days(stat, now);
                if age_days > MAX_AGE_DAYS {
                    return false;
                }
                age_days == 0 || decayed_score(stat, now) >= USAGE_THRESHOLD
            });
            !companions.is_empty()
        });

        self.persist();
    }

    fn persist(&self) {
        let blob = match self.state.to_blob() {
            Ok(blob) => blob,
            Err(error) => {
                warn!(
                    event_name = "recommender.state.encode_failed",
                    error = %error,
                    "could not encode recommendation state, dropping write"
                );
                return;
            }
        };

        if let Err(error) = self.store.save(&blob) {
            warn!(
                event_name = "recommender.state.save_failed",
                error = %error,
                "could not persist recommendation state, dropping write"
            );
        }
    }
}

fn age_in_days(stat: &CompanionStat, now: DateTime<Utc>) -> i64 {
    (now - stat.last_purchased).num_days().max(0)
}

/// Recency-weighted score: `count × DECAY_FACTOR^days_since_last_purchase`.
fn decayed_score(stat: &CompanionStat, now: DateTime<Utc>) -> f64 {
    f64::from(stat.count) * DECAY_FACTOR.powi(age_in_days(stat, now) as i32)
}
