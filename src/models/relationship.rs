use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "swipe_direction", rename_all = "lowercase")]
pub enum SwipeDirection {
    Like,
    Pass,
}

/// A recorded LIKE or PASS from one user toward another. Immutable once
/// created; the actor/target pair is unique per swipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swipe {
    pub id: String,
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "targetId")]
    pub target_id: String,
    pub direction: SwipeDirection,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Swipe {
    pub fn new(actor_id: &str, target_id: &str, direction: SwipeDirection) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            direction,
            created_at: Utc::now(),
        }
    }
}

/// Entry in a user's undo log, pointing at their most recent swipes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoEntry {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    #[serde(rename = "swipeId")]
    pub swipe_id: String,
    #[serde(rename = "recordedAt")]
    pub recorded_at: DateTime<Utc>,
}

/// A user report, counted toward the auto-ban threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(rename = "reporterId")]
    pub reporter_id: String,
    #[serde(rename = "reportedId")]
    pub reported_id: String,
    pub reason: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn new(reporter_id: &str, reported_id: &str, reason: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reporter_id: reporter_id.to_string(),
            reported_id: reported_id.to_string(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "match_state", rename_all = "snake_case")]
pub enum MatchState {
    Active,
    Friends,
    Unmatched,
    GracefulExit,
    Blocked,
}

impl MatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MatchState::Unmatched | MatchState::GracefulExit | MatchState::Blocked
        )
    }

    /// New messages are only allowed while the relationship is live.
    pub fn allows_messaging(&self) -> bool {
        matches!(self, MatchState::Active | MatchState::Friends)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "end_reason", rename_all = "snake_case")]
pub enum EndReason {
    Unmatched,
    GracefulExit,
    Blocked,
}

#[derive(Debug, Error)]
#[error("a match requires two distinct participants")]
pub struct SelfPairError;

/// A mutual-interest relationship record.
///
/// The id is derived from the two participant ids sorted lexicographically,
/// so `Match::new(a, b)` and `Match::new(b, a)` produce the same record.
/// State and end metadata are private; they change only through the
/// lifecycle transition operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    id: String,
    #[serde(rename = "userA")]
    user_a: String,
    #[serde(rename = "userB")]
    user_b: String,
    state: MatchState,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "endedAt", default)]
    ended_at: Option<DateTime<Utc>>,
    #[serde(rename = "endedBy", default)]
    ended_by: Option<String>,
    #[serde(rename = "endReason", default)]
    end_reason: Option<EndReason>,
}

impl Match {
    /// Deterministic id for an unordered user pair.
    pub fn canonical_id(a: &str, b: &str) -> String {
        if a <= b {
            format!("{}:{}", a, b)
        } else {
            format!("{}:{}", b, a)
        }
    }

    pub fn new(a: &str, b: &str, now: DateTime<Utc>) -> Result<Self, SelfPairError> {
        if a == b {
            return Err(SelfPairError);
        }
        let (user_a, user_b) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self {
            id: Self::canonical_id(a, b),
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            state: MatchState::Active,
            created_at: now,
            ended_at: None,
            ended_by: None,
            end_reason: None,
        })
    }

    /// Rehydrate a persisted row. Storage implementations only.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        user_a: String,
        user_b: String,
        state: MatchState,
        created_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        ended_by: Option<String>,
        end_reason: Option<EndReason>,
    ) -> Self {
        Self {
            id,
            user_a,
            user_b,
            state,
            created_at,
            ended_at,
            ended_by,
            end_reason,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn participants(&self) -> (&str, &str) {
        (&self.user_a, &self.user_b)
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn ended_by(&self) -> Option<&str> {
        self.ended_by.as_deref()
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.user_a == user_id || self.user_b == user_id
    }

    /// The other participant, if `user_id` is one of the pair.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.user_a == user_id {
            Some(&self.user_b)
        } else if self.user_b == user_id {
            Some(&self.user_a)
        } else {
            None
        }
    }

    pub fn allows_messaging(&self) -> bool {
        self.state.allows_messaging()
    }

    pub(crate) fn set_state(&mut self, state: MatchState) {
        self.state = state;
    }

    pub(crate) fn set_end_metadata(&mut self, at: DateTime<Utc>, by: &str, reason: EndReason) {
        self.ended_at = Some(at);
        self.ended_by = Some(by.to_string());
        self.end_reason = Some(reason);
    }
}
