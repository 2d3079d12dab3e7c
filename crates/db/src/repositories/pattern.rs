use chrono::Utc;
use sqlx::Row;

use salit_core::{PatternData, PatternType, ShoppingPattern};

use super::{PatternRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPatternRepository {
    pool: DbPool,
}

impl SqlPatternRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PatternRepository for SqlPatternRepository {
    async fn upsert(&self, row: &ShoppingPattern) -> Result<(), RepositoryError> {
        let data = serde_json::to_string(&row.pattern_data)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let insights = serde_json::to_string(&row.insights)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO user_shopping_patterns
                 (user_id, pattern_type, pattern_data, insights, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, pattern_type) DO UPDATE SET
                 pattern_data = excluded.pattern_data,
                 insights = excluded.insights,
                 updated_at = excluded.updated_at",
        )
        .bind(&row.user_id)
        .bind(row.pattern_type.as_str())
        .bind(data)
        .bind(insights)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(
        &self,
        user_id: &str,
        pattern_type: PatternType,
    ) -> Result<Option<ShoppingPattern>, RepositoryError> {
        let row = sqlx::query(
            "SELECT user_id, pattern_type, pattern_data, insights
             FROM user_shopping_patterns
             WHERE user_id = ?1 AND pattern_type = ?2",
        )
        .bind(user_id)
        .bind(pattern_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            let data_blob: String = row.get("pattern_data");
            let pattern_data: PatternData = serde_json::from_str(&data_blob)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;
            let insights_blob: String = row.get("insights");
            let insights: Vec<String> = serde_json::from_str(&insights_blob)
                .map_err(|error| RepositoryError::Decode(error.to_string()))?;

            Ok(ShoppingPattern {
                user_id: row.get("user_id"),
                pattern_type,
                pattern_data,
                insights,
            })
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use salit_core::{
        CategoryPatternData, PatternData, PatternType, ShoppingPattern, WeeklyPatternData,
    };

    use crate::connect_with_settings;
    use crate::migrations::run_pending;
    use crate::repositories::{PatternRepository, SqlPatternRepository};

    fn weekly(high: u32) -> ShoppingPattern {
        ShoppingPattern {
            user_id: "user-1".to_string(),
            pattern_type: PatternType::Weekly,
            pattern_data: PatternData::Weekly(WeeklyPatternData {
                high_frequency_items: high,
                medium_frequency_items: 1,
                low_frequency_items: 0,
                total_products: high + 1,
            }),
            insights: vec!["אתה קונה הרבה פריטים בתדירות גבוהה - כדאי לשקול קניות בכמויות גדולות יותר".to_string()],
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        let repo = SqlPatternRepository::new(pool);

        repo.upsert(&weekly(2)).await.expect("insert");
        repo.upsert(&weekly(5)).await.expect("replace");

        let found = repo
            .find("user-1", PatternType::Weekly)
            .await
            .expect("query")
            .expect("row exists");

        let PatternData::Weekly(data) = found.pattern_data else {
            panic!("expected weekly data");
        };
        assert_eq!(data.high_frequency_items, 5);
        assert_eq!(found.insights.len(), 1);
    }

    #[tokio::test]
    async fn pattern_types_are_kept_apart() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        let repo = SqlPatternRepository::new(pool);

        repo.upsert(&weekly(2)).await.expect("weekly");
        repo.upsert(&ShoppingPattern {
            user_id: "user-1".to_string(),
            pattern_type: PatternType::Category,
            pattern_data: PatternData::Category(CategoryPatternData {
                categories: vec![("מזון".to_string(), 4)],
                total_categories: 1,
            }),
            insights: Vec::new(),
        })
        .await
        .expect("category");

        let category = repo
            .find("user-1", PatternType::Category)
            .await
            .expect("query")
            .expect("row exists");

        assert!(matches!(category.pattern_data, PatternData::Category(_)));
        assert!(repo.find("user-2", PatternType::Weekly).await.expect("query").is_none());
    }
}
