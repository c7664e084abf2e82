use chrono::{DateTime, Utc};
use serde::Serialize;

/// Record of one finished eating session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSession {
    pub duration_seconds: u64,
    pub total_bites: u32,
    pub average_chews_per_bite: u32,
    pub timestamp: DateTime<Utc>,
}

impl MealSession {
    pub fn total_chews(&self) -> u64 {
        u64::from(self.total_bites) * u64::from(self.average_chews_per_bite)
    }
}
