use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::models::{AccountStatus, Match, Report, Standout, Swipe, UndoEntry, UserProfile};

/// Errors surfaced by storage collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User lookup collaborator
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    async fn find_active(&self, limit: usize) -> StoreResult<Vec<UserProfile>>;

    /// Coarse storage-level pre-filter (gender, age, approximate distance)
    /// bounding the pool handed to the full pipeline. Candidates without
    /// coordinates are retained; the pipeline decides what to do with them.
    async fn candidate_prefilter(
        &self,
        seeker: &UserProfile,
        limit: usize,
    ) -> StoreResult<Vec<UserProfile>>;

    async fn set_account_status(&self, user_id: &str, status: AccountStatus) -> StoreResult<()>;
}

/// Swipe lookup and recording collaborator
#[async_trait]
pub trait SwipeStore: Send + Sync {
    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool>;

    /// When the actor LIKEd the target, the timestamp of that like.
    async fn like_timestamp(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> StoreResult<Option<DateTime<Utc>>>;

    async fn insert_swipe(&self, swipe: &Swipe) -> StoreResult<()>;

    async fn get_swipe(&self, swipe_id: &str) -> StoreResult<Option<Swipe>>;

    async fn delete_swipe(&self, swipe_id: &str) -> StoreResult<bool>;

    /// Everyone the actor has already swiped on, for exclusion.
    async fn swiped_ids(&self, actor_id: &str) -> StoreResult<HashSet<String>>;

    async fn likes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32>;

    async fn passes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32>;

    async fn push_undo(&self, actor_id: &str, swipe_id: &str) -> StoreResult<()>;

    /// Pop the actor's most recent undo entry, if any.
    async fn pop_undo(&self, actor_id: &str) -> StoreResult<Option<UndoEntry>>;
}

/// Block/report collaborator
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Users blocked in either direction relative to `user_id`.
    async fn blocked_ids(&self, user_id: &str) -> StoreResult<HashSet<String>>;

    async fn is_blocked(&self, a: &str, b: &str) -> StoreResult<bool>;

    async fn insert_report(&self, report: &Report) -> StoreResult<()>;

    async fn report_count(&self, reported_id: &str) -> StoreResult<u32>;
}

/// Relationship storage collaborator
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn get_match(&self, match_id: &str) -> StoreResult<Option<Match>>;

    async fn match_exists(&self, match_id: &str) -> StoreResult<bool>;

    /// Insert-or-return-existing on the canonical id. The winning row is
    /// returned either way, so concurrent duplicate triggers converge on one
    /// persisted match.
    async fn insert_match_if_absent(&self, m: &Match) -> StoreResult<Match>;

    async fn update_match(&self, m: &Match) -> StoreResult<()>;

    async fn delete_match(&self, match_id: &str) -> StoreResult<bool>;

    async fn matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>>;

    async fn active_matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>>;
}

/// Daily standout memo collaborator
#[async_trait]
pub trait StandoutStore: Send + Sync {
    async fn standouts_for_day(
        &self,
        seeker_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<Vec<Standout>>>;

    /// Persist the day's batch unless one already exists; the winning batch
    /// is returned either way.
    async fn insert_standouts_if_absent(
        &self,
        seeker_id: &str,
        day: NaiveDate,
        entries: &[Standout],
    ) -> StoreResult<Vec<Standout>>;

    /// Candidate ids featured for this seeker on or after `since`.
    async fn featured_since(
        &self,
        seeker_id: &str,
        since: NaiveDate,
    ) -> StoreResult<HashSet<String>>;

    async fn mark_interacted(
        &self,
        seeker_id: &str,
        candidate_id: &str,
        day: NaiveDate,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;
}

/// Everything the matching engine needs from storage.
pub trait MatchingStore: UserStore + SwipeStore + BlockStore + MatchStore {}
impl<T: UserStore + SwipeStore + BlockStore + MatchStore> MatchingStore for T {}

/// Everything the standout ranker needs from storage.
pub trait RankingStore: UserStore + SwipeStore + BlockStore + StandoutStore {}
impl<T: UserStore + SwipeStore + BlockStore + StandoutStore> RankingStore for T {}
