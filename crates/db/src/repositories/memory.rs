use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use salit_core::{
    ItemRecord, PatternType, ProductAnalytics, ShoppingPattern, ShoppingPrediction,
};

use super::{
    ItemHistoryRepository, PatternRepository, PredictionRepository, ProductAnalyticsRepository,
    RepositoryError,
};

#[derive(Default)]
pub struct InMemoryItemHistoryRepository {
    items: RwLock<HashMap<String, Vec<ItemRecord>>>,
}

impl InMemoryItemHistoryRepository {
    pub async fn seed(&self, user_id: &str, records: Vec<ItemRecord>) {
        let mut items = self.items.write().await;
        items.entry(user_id.to_string()).or_default().extend(records);
    }
}

#[async_trait::async_trait]
impl ItemHistoryRepository for InMemoryItemHistoryRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ItemRecord>, RepositoryError> {
        let items = self.items.read().await;
        let mut records = items.get(user_id).cloned().unwrap_or_default();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn insert(&self, user_id: &str, record: &ItemRecord) -> Result<(), RepositoryError> {
        record.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let mut items = self.items.write().await;
        items.entry(user_id.to_string()).or_default().push(record.clone());
        Ok(())
    }
}

/// In-memory analytics rows with per-product failure injection so runner
/// partial-failure semantics stay testable.
#[derive(Default)]
pub struct InMemoryProductAnalyticsRepository {
    rows: RwLock<HashMap<(String, String), ProductAnalytics>>,
    failing_products: RwLock<HashSet<String>>,
}

impl InMemoryProductAnalyticsRepository {
    pub async fn fail_product(&self, product_name: &str) {
        self.failing_products.write().await.insert(product_name.to_string());
    }
}

#[async_trait::async_trait]
impl ProductAnalyticsRepository for InMemoryProductAnalyticsRepository {
    async fn upsert(&self, row: &ProductAnalytics) -> Result<(), RepositoryError> {
        if self.failing_products.read().await.contains(&row.product_name) {
            return Err(RepositoryError::Decode(format!(
                "injected failure for product `{}`",
                row.product_name
            )));
        }

        let mut rows = self.rows.write().await;
        rows.insert((row.user_id.clone(), row.product_name.clone()), row.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ProductAnalytics>, RepositoryError> {
        let rows = self.rows.read().await;
        let mut found: Vec<ProductAnalytics> = rows
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryPredictionRepository {
    rows: RwLock<Vec<ShoppingPrediction>>,
    failing: AtomicBool,
}

impl InMemoryPredictionRepository {
    pub fn fail_inserts(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn insert(&self, row: &ShoppingPrediction) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Decode("injected prediction failure".to_string()));
        }

        let mut rows = self.rows.write().await;
        rows.push(row.clone());
        Ok(())
    }

    async fn latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ShoppingPrediction>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .max_by_key(|row| row.created_at)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryPatternRepository {
    rows: RwLock<HashMap<(String, PatternType), ShoppingPattern>>,
}

#[async_trait::async_trait]
impl PatternRepository for InMemoryPatternRepository {
    async fn upsert(&self, row: &ShoppingPattern) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().await;
        rows.insert((row.user_id.clone(), row.pattern_type), row.clone());
        Ok(())
    }

    async fn find(
        &self,
        user_id: &str,
        pattern_type: PatternType,
    ) -> Result<Option<ShoppingPattern>, RepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&(user_id.to_string(), pattern_type)).cloned())
    }
}
