use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single "time to rebuy" suggestion inside a prediction row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictedItem {
    pub product_name: String,
    pub category: String,
    /// Clamped to [0.3, 0.95], rounded to 2 decimals.
    pub confidence: f64,
    pub predicted_quantity: u32,
    pub reason: String,
}

/// One analytics run's ranked restocking forecast.
///
/// Append-only; consumers read the most recent row for a user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingPrediction {
    pub id: Uuid,
    pub user_id: String,
    pub predicted_items: Vec<PredictedItem>,
    pub prediction_period: String,
    /// Mean confidence of the emitted items, 0 when none.
    pub confidence_score: f64,
    pub created_at: DateTime<Utc>,
}
