use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Weekly,
    Category,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Weekly => "weekly",
            PatternType::Category => "category",
        }
    }
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weekly" => Ok(PatternType::Weekly),
            "category" => Ok(PatternType::Category),
            other => Err(format!("unknown pattern type `{other}`")),
        }
    }
}

/// Frequency buckets over a user's products.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPatternData {
    /// Products repurchased every 14 days or less.
    pub high_frequency_items: u32,
    /// Products repurchased every 14 to 30 days.
    pub medium_frequency_items: u32,
    /// Products repurchased less often than every 30 days.
    pub low_frequency_items: u32,
    pub total_products: u32,
}

/// Category ranking by distinct-product count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatternData {
    /// Top five categories as (category, distinct products).
    pub categories: Vec<(String, u32)>,
    pub total_categories: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternData {
    Weekly(WeeklyPatternData),
    Category(CategoryPatternData),
}

/// A qualitative shopping pattern row, upserted keyed by
/// `(user_id, pattern_type)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShoppingPattern {
    pub user_id: String,
    pub pattern_type: PatternType,
    pub pattern_data: PatternData,
    /// Human-readable Hebrew sentences summarizing the data.
    pub insights: Vec<String>,
}
