use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::domain::analytics::{MonthCount, ProductAnalytics, SeasonalPattern};
use crate::domain::item::ItemRecord;

use super::{round1, round2, MAX_PEAK_MONTHS, SECONDS_PER_DAY};

/// Aggregates a user's full item history into one analytics row per
/// distinct product.
///
/// Products are keyed by lowercased name; the category is taken from the
/// first record observed for the product. Rows come back sorted by product
/// name so repeated runs over the same history are byte-identical.
pub fn aggregate_products(user_id: &str, items: &[ItemRecord]) -> Vec<ProductAnalytics> {
    let mut grouped: HashMap<String, ProductGroup> = HashMap::new();

    for item in items {
        let key = item.name.to_lowercase();
        let group = grouped
            .entry(key)
            .or_insert_with(|| ProductGroup { category: item.category.clone(), purchases: Vec::new() });
        group.purchases.push((item.quantity, item.created_at));
    }

    let mut rows: Vec<ProductAnalytics> = grouped
        .into_iter()
        .map(|(product_name, group)| analyze_product(user_id, product_name, group))
        .collect();

    rows.sort_by(|a, b| a.product_name.cmp(&b.product_name));
    rows
}

struct ProductGroup {
    category: String,
    purchases: Vec<(u32, DateTime<Utc>)>,
}

fn analyze_product(user_id: &str, product_name: String, group: ProductGroup) -> ProductAnalytics {
    let total_purchases = group.purchases.len() as u32;
    let quantity_sum: u64 = group.purchases.iter().map(|(quantity, _)| u64::from(*quantity)).sum();
    let average_quantity = round2(quantity_sum as f64 / f64::from(total_purchases));

    let last_purchased_at = group.purchases.iter().map(|(_, date)| *date).max();
    let purchase_frequency_days = mean_purchase_gap_days(&group.purchases);
    let seasonal_pattern = seasonal_pattern(&group.purchases);

    ProductAnalytics {
        user_id: user_id.to_string(),
        product_name,
        category: group.category,
        total_purchases,
        average_quantity,
        last_purchased_at,
        purchase_frequency_days,
        seasonal_pattern,
    }
}

/// Mean gap between consecutive purchases in days, rounded to 1 decimal.
///
/// None with fewer than two purchases, and none when every purchase landed
/// on the same instant (a zero interval carries no frequency signal).
fn mean_purchase_gap_days(purchases: &[(u32, DateTime<Utc>)]) -> Option<f64> {
    if purchases.len() < 2 {
        return None;
    }

    let mut dates: Vec<DateTime<Utc>> = purchases.iter().map(|(_, date)| *date).collect();
    dates.sort();

    let gap_sum: f64 = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / SECONDS_PER_DAY)
        .sum();
    let mean = gap_sum / (dates.len() - 1) as f64;

    (mean > 0.0).then(|| round1(mean))
}

fn seasonal_pattern(purchases: &[(u32, DateTime<Utc>)]) -> SeasonalPattern {
    let mut monthly: HashMap<u32, u32> = HashMap::new();
    for (_, date) in purchases {
        *monthly.entry(date.month0()).or_insert(0) += 1;
    }

    let total_months_active = monthly.len() as u32;

    let mut ranked: Vec<MonthCount> =
        monthly.into_iter().map(|(month, purchases)| MonthCount { month, purchases }).collect();
    ranked.sort_by(|a, b| b.purchases.cmp(&a.purchases).then_with(|| a.month.cmp(&b.month)));
    ranked.truncate(MAX_PEAK_MONTHS);

    SeasonalPattern { peak_months: ranked, total_months_active }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::domain::item::ItemRecord;

    use super::aggregate_products;

    fn item(name: &str, quantity: u32, day_offset: i64) -> ItemRecord {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        ItemRecord {
            name: name.to_string(),
            category: "מזון".to_string(),
            quantity,
            created_at: base + Duration::days(day_offset),
            completed_at: None,
        }
    }

    #[test]
    fn aggregates_counts_quantities_and_frequency() {
        let items =
            vec![item("חלב", 1, 0), item("חלב", 3, 10), item("חלב", 2, 20)];

        let rows = aggregate_products("user-1", &items);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.product_name, "חלב");
        assert_eq!(row.total_purchases, 3);
        assert_eq!(row.average_quantity, 2.0);
        assert_eq!(row.purchase_frequency_days, Some(10.0));
        assert_eq!(row.last_purchased_at, Some(items[2].created_at));
    }

    #[test]
    fn groups_by_lowercased_name() {
        let items = vec![item("Milk", 1, 0), item("milk", 1, 5), item("MILK", 1, 9)];

        let rows = aggregate_products("user-1", &items);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_name, "milk");
        assert_eq!(rows[0].total_purchases, 3);
    }

    #[test]
    fn single_purchase_has_no_frequency() {
        let rows = aggregate_products("user-1", &[item("לחם", 2, 0)]);

        assert_eq!(rows[0].total_purchases, 1);
        assert_eq!(rows[0].purchase_frequency_days, None);
    }

    #[test]
    fn simultaneous_purchases_have_no_frequency() {
        let rows = aggregate_products("user-1", &[item("לחם", 1, 0), item("לחם", 1, 0)]);

        assert_eq!(rows[0].total_purchases, 2);
        assert_eq!(rows[0].purchase_frequency_days, None);
    }

    #[test]
    fn seasonal_pattern_ranks_peak_months() {
        // Three January purchases, two February, one May.
        let items = vec![
            item("גבינה", 1, 0),
            item("גבינה", 1, 5),
            item("גבינה", 1, 10),
            item("גבינה", 1, 35),
            item("גבינה", 1, 40),
            item("גבינה", 1, 125),
        ];

        let rows = aggregate_products("user-1", &items);
        let seasonal = &rows[0].seasonal_pattern;

        assert_eq!(seasonal.total_months_active, 3);
        assert_eq!(seasonal.peak_months.len(), 3);
        assert_eq!(seasonal.peak_months[0].month, 0);
        assert_eq!(seasonal.peak_months[0].purchases, 3);
        assert_eq!(seasonal.peak_months[1].month, 1);
        assert_eq!(seasonal.peak_months[1].purchases, 2);
    }

    #[test]
    fn rows_are_sorted_by_product_name() {
        let items = vec![item("תפוחים", 1, 0), item("בננות", 1, 0), item("גזר", 1, 0)];

        let rows = aggregate_products("user-1", &items);
        let names: Vec<&str> = rows.iter().map(|row| row.product_name.as_str()).collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn empty_history_produces_no_rows() {
        assert!(aggregate_products("user-1", &[]).is_empty());
    }
}
