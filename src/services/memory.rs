use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::core::distance::{calculate_bounding_box, is_within_bounding_box};
use crate::models::{
    AccountStatus, Match, MatchState, Report, Standout, Swipe, SwipeDirection, UndoEntry,
    UserProfile,
};
use crate::services::store::{
    BlockStore, MatchStore, StandoutStore, StoreResult, SwipeStore, UserStore,
};

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserProfile>,
    swipes: HashMap<(String, String), Swipe>,
    undo: HashMap<String, Vec<UndoEntry>>,
    matches: HashMap<String, Match>,
    reports: Vec<Report>,
    standouts: HashMap<(String, NaiveDate), Vec<Standout>>,
}

/// In-memory implementation of every storage contract.
///
/// Backs integration tests and benches; the single RwLock makes the
/// insert-if-absent primitives atomic the same way the database constraints
/// do.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, profile: UserProfile) {
        let mut inner = self.inner.write().await;
        inner.users.insert(profile.user_id.clone(), profile);
    }

    pub async fn swipe_count(&self) -> usize {
        self.inner.read().await.swipes.len()
    }

    pub async fn match_count(&self) -> usize {
        self.inner.read().await.matches.len()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.inner.read().await.users.get(user_id).cloned())
    }

    async fn find_active(&self, limit: usize) -> StoreResult<Vec<UserProfile>> {
        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .filter(|u| u.is_active())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn candidate_prefilter(
        &self,
        seeker: &UserProfile,
        limit: usize,
    ) -> StoreResult<Vec<UserProfile>> {
        let today = Utc::now().date_naive();
        let bbox = seeker
            .coordinates
            .map(|c| calculate_bounding_box(c, seeker.max_distance_km as f64));

        Ok(self
            .inner
            .read()
            .await
            .users
            .values()
            .filter(|u| u.user_id != seeker.user_id)
            .filter(|u| u.is_active())
            .filter(|u| {
                u.gender
                    .map(|g| seeker.interested_in.contains(&g))
                    .unwrap_or(false)
            })
            .filter(|u| {
                u.age_on(today)
                    .map(|age| age >= seeker.min_age && age <= seeker.max_age)
                    .unwrap_or(false)
            })
            .filter(|u| match (&bbox, u.coordinates) {
                (Some(b), Some(c)) => is_within_bounding_box(c, b),
                _ => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn set_account_status(&self, user_id: &str, status: AccountStatus) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(user_id) {
            user.status = status;
        }
        Ok(())
    }
}

#[async_trait]
impl SwipeStore for InMemoryStore {
    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .contains_key(&(actor_id.to_string(), target_id.to_string())))
    }

    async fn like_timestamp(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .get(&(actor_id.to_string(), target_id.to_string()))
            .filter(|s| s.direction == SwipeDirection::Like)
            .map(|s| s.created_at))
    }

    async fn insert_swipe(&self, swipe: &Swipe) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .swipes
            .entry((swipe.actor_id.clone(), swipe.target_id.clone()))
            .or_insert_with(|| swipe.clone());
        Ok(())
    }

    async fn get_swipe(&self, swipe_id: &str) -> StoreResult<Option<Swipe>> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .values()
            .find(|s| s.id == swipe_id)
            .cloned())
    }

    async fn delete_swipe(&self, swipe_id: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let key = inner
            .swipes
            .iter()
            .find(|(_, s)| s.id == swipe_id)
            .map(|(k, _)| k.clone());
        match key {
            Some(k) => {
                inner.swipes.remove(&k);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn swiped_ids(&self, actor_id: &str) -> StoreResult<HashSet<String>> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .keys()
            .filter(|(actor, _)| actor == actor_id)
            .map(|(_, target)| target.clone())
            .collect())
    }

    async fn likes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .values()
            .filter(|s| {
                s.actor_id == actor_id
                    && s.direction == SwipeDirection::Like
                    && s.created_at >= since
            })
            .count() as u32)
    }

    async fn passes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32> {
        Ok(self
            .inner
            .read()
            .await
            .swipes
            .values()
            .filter(|s| {
                s.actor_id == actor_id
                    && s.direction == SwipeDirection::Pass
                    && s.created_at >= since
            })
            .count() as u32)
    }

    async fn push_undo(&self, actor_id: &str, swipe_id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .undo
            .entry(actor_id.to_string())
            .or_default()
            .push(UndoEntry {
                actor_id: actor_id.to_string(),
                swipe_id: swipe_id.to_string(),
                recorded_at: Utc::now(),
            });
        Ok(())
    }

    async fn pop_undo(&self, actor_id: &str) -> StoreResult<Option<UndoEntry>> {
        let mut inner = self.inner.write().await;
        Ok(inner.undo.get_mut(actor_id).and_then(|log| log.pop()))
    }
}

#[async_trait]
impl BlockStore for InMemoryStore {
    async fn blocked_ids(&self, user_id: &str) -> StoreResult<HashSet<String>> {
        let inner = self.inner.read().await;
        let mut blocked: HashSet<String> = inner
            .matches
            .values()
            .filter(|m| m.state() == MatchState::Blocked)
            .filter_map(|m| m.counterpart(user_id).map(str::to_string))
            .collect();
        for report in &inner.reports {
            if report.reporter_id == user_id {
                blocked.insert(report.reported_id.clone());
            } else if report.reported_id == user_id {
                blocked.insert(report.reporter_id.clone());
            }
        }
        Ok(blocked)
    }

    async fn is_blocked(&self, a: &str, b: &str) -> StoreResult<bool> {
        let match_id = Match::canonical_id(a, b);
        let inner = self.inner.read().await;
        let match_blocked = inner
            .matches
            .get(&match_id)
            .map(|m| m.state() == MatchState::Blocked)
            .unwrap_or(false);
        let reported = inner.reports.iter().any(|r| {
            (r.reporter_id == a && r.reported_id == b)
                || (r.reporter_id == b && r.reported_id == a)
        });
        Ok(match_blocked || reported)
    }

    async fn insert_report(&self, report: &Report) -> StoreResult<()> {
        self.inner.write().await.reports.push(report.clone());
        Ok(())
    }

    async fn report_count(&self, reported_id: &str) -> StoreResult<u32> {
        Ok(self
            .inner
            .read()
            .await
            .reports
            .iter()
            .filter(|r| r.reported_id == reported_id)
            .count() as u32)
    }
}

#[async_trait]
impl MatchStore for InMemoryStore {
    async fn get_match(&self, match_id: &str) -> StoreResult<Option<Match>> {
        Ok(self.inner.read().await.matches.get(match_id).cloned())
    }

    async fn match_exists(&self, match_id: &str) -> StoreResult<bool> {
        Ok(self.inner.read().await.matches.contains_key(match_id))
    }

    async fn insert_match_if_absent(&self, m: &Match) -> StoreResult<Match> {
        let mut inner = self.inner.write().await;
        let winner = inner
            .matches
            .entry(m.id().to_string())
            .or_insert_with(|| m.clone());
        Ok(winner.clone())
    }

    async fn update_match(&self, m: &Match) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.matches.insert(m.id().to_string(), m.clone());
        Ok(())
    }

    async fn delete_match(&self, match_id: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.matches.remove(match_id).is_some())
    }

    async fn matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>> {
        Ok(self
            .inner
            .read()
            .await
            .matches
            .values()
            .filter(|m| m.contains(user_id))
            .cloned()
            .collect())
    }

    async fn active_matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>> {
        Ok(self
            .inner
            .read()
            .await
            .matches
            .values()
            .filter(|m| m.contains(user_id) && m.allows_messaging())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StandoutStore for InMemoryStore {
    async fn standouts_for_day(
        &self,
        seeker_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<Vec<Standout>>> {
        Ok(self
            .inner
            .read()
            .await
            .standouts
            .get(&(seeker_id.to_string(), day))
            .cloned())
    }

    async fn insert_standouts_if_absent(
        &self,
        seeker_id: &str,
        day: NaiveDate,
        entries: &[Standout],
    ) -> StoreResult<Vec<Standout>> {
        let mut inner = self.inner.write().await;
        let winner = inner
            .standouts
            .entry((seeker_id.to_string(), day))
            .or_insert_with(|| entries.to_vec());
        Ok(winner.clone())
    }

    async fn featured_since(
        &self,
        seeker_id: &str,
        since: NaiveDate,
    ) -> StoreResult<HashSet<String>> {
        Ok(self
            .inner
            .read()
            .await
            .standouts
            .iter()
            .filter(|((seeker, day), _)| seeker == seeker_id && *day >= since)
            .flat_map(|(_, entries)| entries.iter().map(|s| s.candidate_id.clone()))
            .collect())
    }

    async fn mark_interacted(
        &self,
        seeker_id: &str,
        candidate_id: &str,
        day: NaiveDate,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        if let Some(entries) = inner.standouts.get_mut(&(seeker_id.to_string(), day)) {
            for entry in entries.iter_mut() {
                if entry.candidate_id == candidate_id && entry.interacted_at.is_none() {
                    entry.interacted_at = Some(at);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
