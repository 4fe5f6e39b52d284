use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One of a seeker's daily top-ranked candidates. Created once per seeker
/// per day; only the interaction timestamp changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standout {
    #[serde(rename = "seekerId")]
    pub seeker_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub day: NaiveDate,
    pub rank: u8,
    pub score: u8,
    pub reason: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "interactedAt", default)]
    pub interacted_at: Option<DateTime<Utc>>,
}
