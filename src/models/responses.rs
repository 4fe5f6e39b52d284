use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::relationship::{Match, MatchState};
use crate::models::standout::Standout;

/// One candidate surfaced to a seeker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateView {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: Option<u8>,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    pub interests: Vec<String>,
}

/// Response for candidate discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindCandidatesResponse {
    pub candidates: Vec<CandidateView>,
    #[serde(rename = "totalPool")]
    pub total_pool: usize,
}

/// Wire view of a relationship record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    pub id: String,
    pub users: [String; 2],
    pub state: MatchState,
    #[serde(rename = "allowsMessaging")]
    pub allows_messaging: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Match> for MatchView {
    fn from(m: &Match) -> Self {
        let (a, b) = m.participants();
        Self {
            id: m.id().to_string(),
            users: [a.to_string(), b.to_string()],
            state: m.state(),
            allows_messaging: m.allows_messaging(),
            created_at: m.created_at(),
        }
    }
}

/// Response for swipe processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub outcome: String,
    #[serde(rename = "match", default)]
    pub matched: Option<MatchView>,
}

/// Response for swipe undo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoSwipeResponse {
    /// Target freed by the undo, absent when there was nothing to undo
    #[serde(rename = "undoneTargetId", default)]
    pub undone_target_id: Option<String>,
}

/// One scored dimension of a compatibility view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionView {
    pub name: String,
    pub weight: f64,
    pub value: f64,
}

/// Response for the relationship quality view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResponse {
    pub score: u8,
    pub highlights: Vec<String>,
    pub dimensions: Vec<DimensionView>,
}

/// Wire view of a daily standout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandoutView {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub rank: u8,
    pub score: u8,
    pub reason: String,
}

impl From<&Standout> for StandoutView {
    fn from(s: &Standout) -> Self {
        Self {
            candidate_id: s.candidate_id.clone(),
            rank: s.rank,
            score: s.score,
            reason: s.reason.clone(),
        }
    }
}

/// Response for the daily standout feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandoutsResponse {
    pub standouts: Vec<StandoutView>,
    #[serde(rename = "fromCache")]
    pub from_cache: bool,
}

/// Response for a report submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(rename = "totalReports")]
    pub total_reports: u32,
    pub banned: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
