pub mod analytics;
pub mod clock;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommender;

pub use analytics::{
    aggregate_products, generate_patterns, generate_predictions, overall_confidence,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::analytics::{MonthCount, ProductAnalytics, SeasonalPattern};
pub use domain::item::ItemRecord;
pub use domain::pattern::{
    CategoryPatternData, PatternData, PatternType, ShoppingPattern, WeeklyPatternData,
};
pub use domain::prediction::{PredictedItem, ShoppingPrediction};
pub use errors::DomainError;
pub use recommender::{JsonFileStore, MemoryStore, Recommender, StateStore, StateStoreError};
