use chrono::{DateTime, Utc};
use sqlx::Row;

use salit_core::{ProductAnalytics, SeasonalPattern};

use super::{ProductAnalyticsRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductAnalyticsRepository {
    pool: DbPool,
}

impl SqlProductAnalyticsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ProductAnalyticsRepository for SqlProductAnalyticsRepository {
    async fn upsert(&self, row: &ProductAnalytics) -> Result<(), RepositoryError> {
        let seasonal = serde_json::to_string(&row.seasonal_pattern)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO user_product_analytics
                 (user_id, product_name, category, total_purchases, average_quantity,
                  last_purchased_at, purchase_frequency_days, seasonal_pattern, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT (user_id, product_name) DO UPDATE SET
                 category = excluded.category,
                 total_purchases = excluded.total_purchases,
                 average_quantity = excluded.average_quantity,
                 last_purchased_at = excluded.last_purchased_at,
                 purchase_frequency_days = excluded.purchase_frequency_days,
                 seasonal_pattern = excluded.seasonal_pattern,
                 updated_at = excluded.updated_at",
        )
        .bind(&row.user_id)
        .bind(&row.product_name)
        .bind(&row.category)
        .bind(i64::from(row.total_purchases))
        .bind(row.average_quantity)
        .bind(row.last_purchased_at)
        .bind(row.purchase_frequency_days)
        .bind(seasonal)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ProductAnalytics>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT user_id, product_name, category, total_purchases, average_quantity,
                    last_purchased_at, purchase_frequency_days, seasonal_pattern
             FROM user_product_analytics
             WHERE user_id = ?1
             ORDER BY product_name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let seasonal_blob: String = row.get("seasonal_pattern");
                let seasonal_pattern: SeasonalPattern = serde_json::from_str(&seasonal_blob)
                    .map_err(|error| RepositoryError::Decode(error.to_string()))?;
                let total_purchases: i64 = row.get("total_purchases");

                Ok(ProductAnalytics {
                    user_id: row.get("user_id"),
                    product_name: row.get("product_name"),
                    category: row.get("category"),
                    total_purchases: u32::try_from(total_purchases).unwrap_or(0),
                    average_quantity: row.get("average_quantity"),
                    last_purchased_at: row.get::<Option<DateTime<Utc>>, _>("last_purchased_at"),
                    purchase_frequency_days: row.get("purchase_frequency_days"),
                    seasonal_pattern,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use salit_core::{MonthCount, ProductAnalytics, SeasonalPattern};

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::{ProductAnalyticsRepository, SqlProductAnalyticsRepository};

    fn row(product_name: &str, total_purchases: u32) -> ProductAnalytics {
        ProductAnalytics {
            user_id: "user-1".to_string(),
            product_name: product_name.to_string(),
            category: "מזון".to_string(),
            total_purchases,
            average_quantity: 1.5,
            last_purchased_at: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
            purchase_frequency_days: Some(7.5),
            seasonal_pattern: SeasonalPattern {
                peak_months: vec![MonthCount { month: 2, purchases: 4 }],
                total_months_active: 2,
            },
        }
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        let repo = SqlProductAnalyticsRepository::new(pool);

        repo.upsert(&row("חלב", 3)).await.expect("insert");
        repo.upsert(&row("חלב", 4)).await.expect("replace");

        let rows = repo.list_for_user("user-1").await.expect("list");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_purchases, 4);
        assert_eq!(rows[0].purchase_frequency_days, Some(7.5));
        assert_eq!(rows[0].seasonal_pattern.peak_months.len(), 1);
    }

    #[tokio::test]
    async fn null_optionals_round_trip() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        let repo = SqlProductAnalyticsRepository::new(pool);

        let mut sparse = row("לחם", 1);
        sparse.last_purchased_at = None;
        sparse.purchase_frequency_days = None;
        repo.upsert(&sparse).await.expect("insert");

        let rows = repo.list_for_user("user-1").await.expect("list");

        assert_eq!(rows[0].last_purchased_at, None);
        assert_eq!(rows[0].purchase_frequency_days, None);
    }
}
