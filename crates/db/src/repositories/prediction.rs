use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use salit_core::{PredictedItem, ShoppingPrediction};

use super::{PredictionRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPredictionRepository {
    pool: DbPool,
}

impl SqlPredictionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PredictionRepository for SqlPredictionRepository {
    async fn insert(&self, row: &ShoppingPrediction) -> Result<(), RepositoryError> {
        let items = serde_json::to_string(&row.predicted_items)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO shopping_predictions
                 (id, user_id, predicted_items, prediction_period, confidence_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(row.id.to_string())
        .bind(&row.user_id)
        .bind(items)
        .bind(&row.prediction_period)
        .bind(row.confidence_score)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn latest_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<ShoppingPrediction>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, predicted_items, prediction_period, confidence_score, created_at
             FROM shopping_predictions
             WHERE user_id = ?1
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let id_text: String = row.get("id");
            let id = Uuid::parse_str(&id_text)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;
            let items_blob: String = row.get("predicted_items");
            let predicted_items: Vec<PredictedItem> = serde_json::from_str(&items_blob)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;

            Ok(ShoppingPrediction {
                id,
                user_id: row.get("user_id"),
                predicted_items,
                prediction_period: row.get("prediction_period"),
                confidence_score: row.get("confidence_score"),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
            })
        })
        .transpose()
    }
}
