use chrono::{DateTime, Utc};

use crate::domain::analytics::ProductAnalytics;
use crate::domain::prediction::PredictedItem;

use super::{
    round2, FREQUENCY_RATIO_THRESHOLD, MAX_PREDICTIONS, MAX_PREDICTION_CONFIDENCE,
    MIN_PREDICTION_CONFIDENCE, SECONDS_PER_DAY,
};

/// Derives "time to rebuy" suggestions from per-product analytics rows.
///
/// A product qualifies once at least 80% of its typical repurchase interval
/// has elapsed since the last purchase. Results are ranked by confidence
/// and capped at [`MAX_PREDICTIONS`].
pub fn generate_predictions(
    analytics: &[ProductAnalytics],
    now: DateTime<Utc>,
) -> Vec<PredictedItem> {
    let mut predictions: Vec<PredictedItem> = analytics
        .iter()
        .filter_map(|product| predict_product(product, now))
        .collect();

    predictions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    predictions.truncate(MAX_PREDICTIONS);
    predictions
}

fn predict_product(product: &ProductAnalytics, now: DateTime<Utc>) -> Option<PredictedItem> {
    let last_purchased_at = product.last_purchased_at?;
    let frequency_days = product.purchase_frequency_days?;
    if frequency_days <= 0.0 {
        return None;
    }

    let days_since_last = (now - last_purchased_at).num_seconds() as f64 / SECONDS_PER_DAY;
    let frequency_ratio = days_since_last / frequency_days;

    if frequency_ratio < FREQUENCY_RATIO_THRESHOLD {
        return None;
    }

    let confidence = round2(
        (frequency_ratio - 0.2).clamp(MIN_PREDICTION_CONFIDENCE, MAX_PREDICTION_CONFIDENCE),
    );

    Some(PredictedItem {
        product_name: product.product_name.clone(),
        category: product.category.clone(),
        confidence,
        predicted_quantity: product.average_quantity.ceil() as u32,
        reason: format!(
            "Usually purchased every {} days. Last purchased {} days ago.",
            frequency_days.round() as i64,
            days_since_last.round() as i64
        ),
    })
}

/// Mean confidence across the emitted predictions, 0 when there are none.
pub fn overall_confidence(predictions: &[PredictedItem]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }

    let sum: f64 = predictions.iter().map(|prediction| prediction.confidence).sum();
    round2(sum / predictions.len() as f64)
}
