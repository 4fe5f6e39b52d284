use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to discover candidates for a seeker
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindCandidatesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    #[serde(alias = "excludeUserIds", rename = "excludeUserIds")]
    pub exclude_user_ids: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

/// Request to record a swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "targetUserId", rename = "targetUserId")]
    pub target_user_id: String,
    /// "like" or "pass"
    pub direction: String,
}

/// Request to undo the actor's most recent swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UndoSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Request for the compatibility view of an existing relationship
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QualityRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "otherUserId", rename = "otherUserId")]
    pub other_user_id: String,
}

/// Request to move a relationship through its lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "otherUserId", rename = "otherUserId")]
    pub other_user_id: String,
    /// "friends", "unmatch", "graceful_exit" or "block"
    pub action: String,
}

/// Request to report another user
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "reporterId", rename = "reporterId")]
    pub reporter_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "reportedId", rename = "reportedId")]
    pub reported_id: String,
    #[serde(default)]
    pub reason: String,
}

/// Request to stamp a standout as interacted-with
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StandoutInteractionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "seekerId", rename = "seekerId")]
    pub seeker_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "candidateId", rename = "candidateId")]
    pub candidate_id: String,
}
