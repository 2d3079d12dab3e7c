use async_trait::async_trait;
use thiserror::Error;

use salit_core::{
    ItemRecord, PatternType, ProductAnalytics, ShoppingPattern, ShoppingPrediction,
};

pub mod analytics;
pub mod item_history;
pub mod memory;
pub mod pattern;
pub mod prediction;

pub use analytics::SqlProductAnalyticsRepository;
pub use item_history::SqlItemHistoryRepository;
pub use memory::{
    InMemoryItemHistoryRepository, InMemoryPatternRepository, InMemoryPredictionRepository,
    InMemoryProductAnalyticsRepository,
};
pub use pattern::SqlPatternRepository;
pub use prediction::SqlPredictionRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read/append access to a user's raw item history.
#[async_trait]
pub trait ItemHistoryRepository: Send + Sync {
    /// Full history for one user, oldest first. Rows failing boundary
    /// validation are dropped with a warning rather than failing the read.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ItemRecord>, RepositoryError>;

    async fn insert(&self, user_id: &str, record: &ItemRecord) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductAnalyticsRepository: Send + Sync {
    async fn upsert(&self, row: &ProductAnalytics) -> Result<(), RepositoryError>;

    async fn list_for_user(&self, user_id: &str)
        -> Result<Vec<ProductAnalytics>, RepositoryError>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn insert(&self, row: &ShoppingPrediction) -> Result<(), RepositoryError>;

    async fn latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ShoppingPrediction>, RepositoryError>;
}

#[async_trait]
pub trait PatternRepository: Send + Sync {
    async fn upsert(&self, row: &ShoppingPattern) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        user_id: &str,
        pattern_type: PatternType,
    ) -> Result<Option<ShoppingPattern>, RepositoryError>;
}
