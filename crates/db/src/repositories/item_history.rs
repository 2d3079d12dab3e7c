use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use salit_core::ItemRecord;

use super::{ItemHistoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlItemHistoryRepository {
    pool: DbPool,
}

impl SqlItemHistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ItemHistoryRepository for SqlItemHistoryRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ItemRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT name, category, quantity, created_at, completed_at
             FROM shopping_items
             WHERE user_id = ?1
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let quantity: i64 = row.get("quantity");
            let record = ItemRecord {
                name: row.get("name"),
                category: row.get("category"),
                quantity: u32::try_from(quantity).unwrap_or(0),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
                completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
            };

            // History rows predate validation; drop malformed ones instead
            // of failing the whole read.
            match record.validate() {
                Ok(()) => records.push(record),
                Err(error) => {
                    warn!(
                        event_name = "item_history.row_invalid",
                        user_id,
                        error = %error,
                        "skipping malformed history row"
                    );
                }
            }
        }

        Ok(records)
    }

    async fn insert(&self, user_id: &str, record: &ItemRecord) -> Result<(), RepositoryError> {
        record.validate().map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO shopping_items (id, user_id, name, category, quantity, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(&record.name)
        .bind(&record.category)
        .bind(i64::from(record.quantity))
        .bind(record.created_at)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
