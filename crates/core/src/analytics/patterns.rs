use std::collections::HashMap;

use crate::domain::analytics::ProductAnalytics;
use crate::domain::pattern::{
    CategoryPatternData, PatternData, PatternType, ShoppingPattern, WeeklyPatternData,
};

use super::MAX_PATTERN_CATEGORIES;

/// Builds the two qualitative pattern rows (weekly frequency buckets and
/// category ranking) for one analytics run.
pub fn generate_patterns(user_id: &str, analytics: &[ProductAnalytics]) -> Vec<ShoppingPattern> {
    vec![weekly_pattern(user_id, analytics), category_pattern(user_id, analytics)]
}

fn weekly_pattern(user_id: &str, analytics: &[ProductAnalytics]) -> ShoppingPattern {
    let frequencies =
        analytics.iter().filter_map(|product| product.purchase_frequency_days);

    let mut data = WeeklyPatternData {
        total_products: analytics.len() as u32,
        ..WeeklyPatternData::default()
    };
    for frequency in frequencies {
        if frequency <= 14.0 {
            data.high_frequency_items += 1;
        } else if frequency <= 30.0 {
            data.medium_frequency_items += 1;
        } else {
            data.low_frequency_items += 1;
        }
    }

    let mut insights = Vec::new();
    if data.high_frequency_items > data.medium_frequency_items + data.low_frequency_items {
        insights.push(
            "אתה קונה הרבה פריטים בתדירות גבוהה - כדאי לשקול קניות בכמויות גדולות יותר"
                .to_string(),
        );
    }
    if data.low_frequency_items > data.high_frequency_items {
        insights.push(
            "רוב הקניות שלך הן פריטים שקונים לעיתים רחוקות - מצוין לתכנון מראש".to_string(),
        );
    }

    ShoppingPattern {
        user_id: user_id.to_string(),
        pattern_type: PatternType::Weekly,
        pattern_data: PatternData::Weekly(data),
        insights,
    }
}

fn category_pattern(user_id: &str, analytics: &[ProductAnalytics]) -> ShoppingPattern {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for product in analytics {
        *counts.entry(product.category.as_str()).or_insert(0) += 1;
    }

    let total_categories = counts.len() as u32;
    let mut ranked: Vec<(String, u32)> =
        counts.into_iter().map(|(category, count)| (category.to_string(), count)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(MAX_PATTERN_CATEGORIES);

    let mut insights = Vec::new();
    if let Some((top_category, top_count)) = ranked.first() {
        insights.push(format!(
            "הקטגוריה הכי פופולרית שלך היא {top_category} עם {top_count} פריטים שונים"
        ));
    }
    if ranked.len() >= 3 {
        let top_three =
            ranked.iter().take(3).map(|(category, _)| category.as_str()).collect::<Vec<_>>();
        insights.push(format!("אתה קונה בעיקר מ-3 קטגוריות: {}", top_three.join(", ")));
    }

    ShoppingPattern {
        user_id: user_id.to_string(),
        pattern_type: PatternType::Category,
        pattern_data: PatternData::Category(CategoryPatternData {
            categories: ranked,
            total_categories,
        }),
        insights,
    }
}
