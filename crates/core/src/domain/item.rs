use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// One historical shopping-list item for a user.
///
/// This is the validated shape the aggregation operates on. Rows arriving
/// from storage are loosely typed; `validate` is applied at the ingestion
/// boundary so everything downstream can assume a well-formed record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub category: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ItemRecord {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidItemRecord {
                reason: "item name must not be blank".to_owned(),
            });
        }
        if self.quantity == 0 {
            return Err(DomainError::InvalidItemRecord {
                reason: format!("item `{}` has zero quantity", self.name),
            });
        }
        Ok(())
    }
}
