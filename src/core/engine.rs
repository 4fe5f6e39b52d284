use std::sync::Arc;

use chrono::{NaiveTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::guard::UserLocks;
use crate::core::lifecycle::{LifecycleError, LifecycleEvent};
use crate::core::quality::{QualityReport, QualityScorer};
use crate::models::{
    AccountStatus, Match, MatchState, Report, Swipe, SwipeDirection,
};
use crate::services::store::{MatchingStore, StoreError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("no relationship found: {0}")]
    MatchNotFound(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("data inconsistency: {0}")]
    Inconsistent(String),
}

/// Which quota declined a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeLimit {
    DailyLikes,
    SessionSwipes,
}

/// Outcome of processing a swipe. Quota declines are ordinary outcomes, not
/// errors.
#[derive(Debug, Clone)]
pub enum SwipeOutcome {
    Matched(Match),
    Liked,
    Passed,
    LimitReached(SwipeLimit),
}

/// Result of a report submission
#[derive(Debug, Clone, Copy)]
pub struct ReportOutcome {
    pub total_reports: u32,
    pub banned: bool,
}

/// Quotas and thresholds governing the engine
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    pub daily_like_limit: u32,
    pub session_swipe_cap: u32,
    pub auto_ban_report_threshold: u32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            daily_like_limit: 100,
            session_swipe_cap: 500,
            auto_ban_report_threshold: 5,
        }
    }
}

struct RecordedSwipe {
    created: bool,
    swipe_id: Option<String>,
    matched: Option<Match>,
}

/// Records swipes, detects mutual interest and owns the resulting
/// relationship records.
///
/// Per-user sequences are serialized through the stripe guard; match creation
/// is idempotent under concurrent reciprocal-like triggers via the
/// insert-if-absent storage primitive.
pub struct MatchingEngine<S> {
    store: Arc<S>,
    locks: Arc<UserLocks>,
    quality: QualityScorer,
    params: EngineParams,
}

impl<S: MatchingStore> MatchingEngine<S> {
    pub fn new(
        store: Arc<S>,
        locks: Arc<UserLocks>,
        quality: QualityScorer,
        params: EngineParams,
    ) -> Self {
        Self {
            store,
            locks,
            quality,
            params,
        }
    }

    fn check_pair(actor: &str, target: &str) -> Result<(), EngineError> {
        if actor.is_empty() || target.is_empty() {
            return Err(EngineError::InvalidRequest(
                "actor and target are required".to_string(),
            ));
        }
        if actor == target {
            return Err(EngineError::InvalidRequest(
                "cannot swipe on yourself".to_string(),
            ));
        }
        Ok(())
    }

    async fn require_user(&self, user_id: &str) -> Result<crate::models::UserProfile, EngineError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(user_id.to_string()))
    }

    /// Record a swipe and detect mutual interest.
    ///
    /// A duplicate (actor, target) swipe is a no-op. On a reciprocal like the
    /// canonical match is created through an upsert: whichever of the two
    /// concurrent triggers wins, both observe the same persisted row.
    pub async fn record_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        direction: SwipeDirection,
    ) -> Result<Option<Match>, EngineError> {
        Self::check_pair(actor_id, target_id)?;
        let _stripe = self.locks.lock(actor_id).await;
        let recorded = self.record_swipe_locked(actor_id, target_id, direction).await?;
        Ok(recorded.matched)
    }

    /// Inner recording step. Callers must hold the actor's stripe.
    async fn record_swipe_locked(
        &self,
        actor_id: &str,
        target_id: &str,
        direction: SwipeDirection,
    ) -> Result<RecordedSwipe, EngineError> {
        if self.store.swipe_exists(actor_id, target_id).await? {
            return Ok(RecordedSwipe {
                created: false,
                swipe_id: None,
                matched: None,
            });
        }

        let swipe = Swipe::new(actor_id, target_id, direction);
        let swipe_id = swipe.id.clone();
        self.store.insert_swipe(&swipe).await?;

        if direction == SwipeDirection::Pass {
            return Ok(RecordedSwipe {
                created: true,
                swipe_id: Some(swipe_id),
                matched: None,
            });
        }

        let matched = if self.store.like_timestamp(target_id, actor_id).await?.is_some() {
            let candidate = Match::new(actor_id, target_id, Utc::now())
                .map_err(|e| EngineError::InvalidRequest(e.to_string()))?;
            let winner = self.store.insert_match_if_absent(&candidate).await?;
            info!(match_id = %winner.id(), "mutual like, relationship formed");
            Some(winner)
        } else {
            None
        };

        Ok(RecordedSwipe {
            created: true,
            swipe_id: Some(swipe_id),
            matched,
        })
    }

    /// Process a swipe with quota enforcement and undo logging.
    pub async fn process_swipe(
        &self,
        actor_id: &str,
        target_id: &str,
        liked: bool,
    ) -> Result<SwipeOutcome, EngineError> {
        Self::check_pair(actor_id, target_id)?;
        self.require_user(actor_id).await?;
        self.require_user(target_id).await?;

        let mut stripe = self.locks.lock(actor_id).await;

        if stripe.session_swipes(actor_id) >= self.params.session_swipe_cap {
            return Ok(SwipeOutcome::LimitReached(SwipeLimit::SessionSwipes));
        }

        if liked {
            let day_start = Utc::now()
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc();
            let likes_today = self.store.likes_since(actor_id, day_start).await?;
            if likes_today >= self.params.daily_like_limit {
                info!(actor = %actor_id, "daily like quota reached");
                return Ok(SwipeOutcome::LimitReached(SwipeLimit::DailyLikes));
            }
        }

        let direction = if liked {
            SwipeDirection::Like
        } else {
            SwipeDirection::Pass
        };
        let recorded = self.record_swipe_locked(actor_id, target_id, direction).await?;

        if recorded.created {
            stripe.record_swipe(actor_id);
            if let Some(swipe_id) = &recorded.swipe_id {
                self.store.push_undo(actor_id, swipe_id).await?;
            }
        }

        Ok(match recorded.matched {
            Some(m) => SwipeOutcome::Matched(m),
            None if liked => SwipeOutcome::Liked,
            None => SwipeOutcome::Passed,
        })
    }

    /// Undo the actor's most recent swipe.
    ///
    /// Returns the freed target id, or `None` when there is nothing to undo.
    /// A swipe that already formed a match cannot be undone.
    pub async fn undo_last_swipe(&self, actor_id: &str) -> Result<Option<String>, EngineError> {
        if actor_id.is_empty() {
            return Err(EngineError::InvalidRequest("actor is required".to_string()));
        }
        let _stripe = self.locks.lock(actor_id).await;

        let Some(entry) = self.store.pop_undo(actor_id).await? else {
            return Ok(None);
        };
        let Some(swipe) = self.store.get_swipe(&entry.swipe_id).await? else {
            warn!(swipe_id = %entry.swipe_id, "undo entry points at a missing swipe");
            return Ok(None);
        };

        let match_id = Match::canonical_id(&swipe.actor_id, &swipe.target_id);
        if self.store.match_exists(&match_id).await? {
            return Ok(None);
        }

        self.store.delete_swipe(&swipe.id).await?;
        info!(actor = %actor_id, target = %swipe.target_id, "swipe undone");
        Ok(Some(swipe.target_id))
    }

    /// Compatibility view of an existing relationship from one participant's
    /// perspective.
    pub async fn relationship_quality(
        &self,
        viewer_id: &str,
        other_id: &str,
    ) -> Result<QualityReport, EngineError> {
        Self::check_pair(viewer_id, other_id)?;
        let viewer = self.require_user(viewer_id).await?;
        let other = self.require_user(other_id).await?;

        let match_id = Match::canonical_id(viewer_id, other_id);
        if self.store.get_match(&match_id).await?.is_none() {
            return Err(EngineError::MatchNotFound(match_id));
        }

        let like_ab = self.store.like_timestamp(viewer_id, other_id).await?;
        let like_ba = self.store.like_timestamp(other_id, viewer_id).await?;
        let gap_hours = match (like_ab, like_ba) {
            (Some(a), Some(b)) => Some((b - a).num_minutes().abs() as f64 / 60.0),
            _ => {
                // A relationship record with no reciprocal likes means the
                // data is broken; refuse rather than degrade.
                return Err(EngineError::Inconsistent(format!(
                    "match {} exists without reciprocal like rows",
                    match_id
                )));
            }
        };

        Ok(self
            .quality
            .score(&viewer, &other, gap_hours, Utc::now().date_naive()))
    }

    /// Apply a lifecycle event to the relationship between two users.
    pub async fn apply_transition(
        &self,
        actor_id: &str,
        other_id: &str,
        event: LifecycleEvent,
    ) -> Result<Match, EngineError> {
        Self::check_pair(actor_id, other_id)?;
        let match_id = Match::canonical_id(actor_id, other_id);
        let mut m = self
            .store
            .get_match(&match_id)
            .await?
            .ok_or_else(|| EngineError::MatchNotFound(match_id.clone()))?;

        m.apply(event, actor_id, Utc::now())?;
        self.store.update_match(&m).await?;
        info!(match_id = %m.id(), state = ?m.state(), "relationship transition applied");
        Ok(m)
    }

    /// Submit a report, force-block any relationship between the pair and
    /// apply the auto-ban threshold.
    ///
    /// The threshold check runs under the reported user's stripe so two
    /// reports arriving concurrently at the threshold ban exactly once.
    pub async fn report_user(
        &self,
        reporter_id: &str,
        reported_id: &str,
        reason: &str,
    ) -> Result<ReportOutcome, EngineError> {
        Self::check_pair(reporter_id, reported_id)?;
        self.require_user(reporter_id).await?;

        let _stripe = self.locks.lock(reported_id).await;
        // Status must be read under the stripe: two reports racing at the
        // threshold would otherwise both observe an unbanned account.
        let reported = self.require_user(reported_id).await?;

        self.store
            .insert_report(&Report::new(reporter_id, reported_id, reason))
            .await?;

        // Block side effect on the relationship, if one exists
        let match_id = Match::canonical_id(reporter_id, reported_id);
        if let Some(mut m) = self.store.get_match(&match_id).await? {
            if m.state() != MatchState::Blocked {
                m.apply(LifecycleEvent::Block, reporter_id, Utc::now())?;
                self.store.update_match(&m).await?;
            }
        }

        let total_reports = self.store.report_count(reported_id).await?;
        let mut banned = false;
        if total_reports >= self.params.auto_ban_report_threshold
            && reported.status != AccountStatus::Banned
        {
            self.store
                .set_account_status(reported_id, AccountStatus::Banned)
                .await?;
            warn!(user = %reported_id, reports = total_reports, "auto-ban threshold reached");
            banned = true;
        }

        Ok(ReportOutcome {
            total_reports,
            banned,
        })
    }
}
