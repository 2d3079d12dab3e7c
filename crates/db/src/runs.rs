use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use salit_core::{
    aggregate_products, generate_patterns, generate_predictions, overall_confidence, Clock,
    ShoppingPrediction,
};

use crate::repositories::{
    ItemHistoryRepository, PatternRepository, PredictionRepository, ProductAnalyticsRepository,
    RepositoryError,
};

/// Aggregate counts for one completed analytics run.
///
/// Counts reflect successful writes only; individually failed upserts are
/// logged and skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed_products: u32,
    pub predictions_generated: u32,
}

#[derive(Debug, Error)]
pub enum AnalyticsRunError {
    #[error("a user identity is required for an analytics run")]
    MissingUser,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Batch analytics over one user's full item history.
///
/// Each run recomputes every derived row from scratch: read the history,
/// aggregate per product, upsert analytics rows one by one, insert a
/// prediction row, upsert the two pattern rows. Writes are sequential and
/// non-transactional; a run either finishes or returns the first read
/// error. There is no cancellation hook.
pub struct AnalyticsRunner {
    items: Arc<dyn ItemHistoryRepository>,
    analytics: Arc<dyn ProductAnalyticsRepository>,
    predictions: Arc<dyn PredictionRepository>,
    patterns: Arc<dyn PatternRepository>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsRunner {
    pub fn new(
        items: Arc<dyn ItemHistoryRepository>,
        analytics: Arc<dyn ProductAnalyticsRepository>,
        predictions: Arc<dyn PredictionRepository>,
        patterns: Arc<dyn PatternRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { items, analytics, predictions, patterns, clock }
    }

    pub async fn run(&self, user_id: &str) -> Result<RunSummary, AnalyticsRunError> {
        if user_id.trim().is_empty() {
            return Err(AnalyticsRunError::MissingUser);
        }

        info!(event_name = "analytics.run.start", user_id, "starting analytics run");

        let history = self.items.list_for_user(user_id).await?;
        if history.is_empty() {
            info!(event_name = "analytics.run.empty", user_id, "no items found for analysis");
            return Ok(RunSummary::default());
        }

        let rows = aggregate_products(user_id, &history);
        info!(
            event_name = "analytics.run.aggregated",
            user_id,
            item_count = history.len(),
            product_count = rows.len(),
            "aggregated item history"
        );

        let mut processed_products = 0u32;
        for row in &rows {
            match self.analytics.upsert(row).await {
                Ok(()) => processed_products += 1,
                Err(upsert_error) => {
                    error!(
                        event_name = "analytics.run.product_upsert_failed",
                        user_id,
                        product_name = %row.product_name,
                        error = %upsert_error,
                        "skipping product after failed analytics upsert"
                    );
                }
            }
        }

        let now = self.clock.now();
        let predicted = generate_predictions(&rows, now);
        let mut predictions_generated = 0u32;
        if !predicted.is_empty() {
            let prediction = ShoppingPrediction {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                confidence_score: overall_confidence(&predicted),
                predicted_items: predicted,
                prediction_period: "weekly".to_string(),
                created_at: now,
            };

            match self.predictions.insert(&prediction).await {
                Ok(()) => predictions_generated = prediction.predicted_items.len() as u32,
                Err(insert_error) => {
                    error!(
                        event_name = "analytics.run.prediction_insert_failed",
                        user_id,
                        error = %insert_error,
                        "prediction row was not stored"
                    );
                }
            }
        }

        for pattern in generate_patterns(user_id, &rows) {
            if let Err(upsert_error) = self.patterns.upsert(&pattern).await {
                error!(
                    event_name = "analytics.run.pattern_upsert_failed",
                    user_id,
                    pattern_type = pattern.pattern_type.as_str(),
                    error = %upsert_error,
                    "skipping pattern after failed upsert"
                );
            }
        }

        info!(
            event_name = "analytics.run.completed",
            user_id,
            processed_products,
            predictions_generated,
            "analytics run completed"
        );

        Ok(RunSummary { processed_products, predictions_generated })
    }
}
