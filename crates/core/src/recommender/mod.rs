//! Pairwise Co-occurrence Recommender
//!
//! Learns which items tend to be bought together and answers "what goes
//! with item X" queries. A fixed Hebrew starter table seeds suggestions
//! before any history exists; learned pairs are scored with per-day
//! exponential decay so recent, repeated co-purchases outrank old or
//! one-off pairings. State lives in a pluggable local blob store.

mod engine;
mod state;
mod static_table;
mod store;

pub use engine::Recommender;
pub use state::{CompanionStat, CoOccurrenceState};
pub use store::{JsonFileStore, MemoryStore, StateStore, StateStoreError};

pub(crate) use static_table::static_companions;

/// Maximum suggestions returned per query.
pub const MAX_SUGGESTIONS: usize = 3;

/// Minimum decayed score for a learned pair to surface or survive cleanup.
pub const USAGE_THRESHOLD: f64 = 2.0;

/// Per-day multiplicative attenuation of a co-occurrence count.
pub const DECAY_FACTOR: f64 = 0.8;

/// Learned pairs older than this are dropped regardless of score.
pub const MAX_AGE_DAYS: i64 = 30;

/// Score assigned to starter-table entries.
pub const STATIC_BASE_SCORE: f64 = 1.0;
