use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Purchase count for one calendar month (zero-based, January = 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: u32,
    pub purchases: u32,
}

/// Monthly distribution of a product's purchases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalPattern {
    /// Top three months by purchase count.
    pub peak_months: Vec<MonthCount>,
    /// Number of distinct months with at least one purchase.
    pub total_months_active: u32,
}

/// Per-user, per-product purchase statistics.
///
/// Recomputed from the full item history on every analytics run and
/// upserted keyed by `(user_id, product_name)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductAnalytics {
    pub user_id: String,
    /// Lowercased product name, the aggregation key.
    pub product_name: String,
    pub category: String,
    pub total_purchases: u32,
    /// Mean quantity per purchase, rounded to 2 decimals.
    pub average_quantity: f64,
    pub last_purchased_at: Option<DateTime<Utc>>,
    /// Mean gap between consecutive purchases in days, rounded to 1
    /// decimal. None with fewer than two purchases.
    pub purchase_frequency_days: Option<f64>,
    pub seasonal_pattern: SeasonalPattern,
}
