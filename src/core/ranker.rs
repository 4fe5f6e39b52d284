use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::core::engine::EngineError;
use crate::core::finder::CandidateFinder;
use crate::core::standout::StandoutScorer;
use crate::models::Standout;
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::store::RankingStore;

/// The day's standout list for a seeker, with a cache-hit flag
#[derive(Debug, Clone)]
pub struct StandoutFeed {
    pub day: NaiveDate,
    pub entries: Vec<Standout>,
    pub from_cache: bool,
}

/// Sizing and diversity parameters for the daily ranking
#[derive(Debug, Clone, Copy)]
pub struct RankerParams {
    /// Hard cap on entries per day
    pub standout_count: usize,
    /// Trailing days during which a featured candidate is suppressed
    pub diversity_window_days: u16,
    /// Pool bound requested from the coarse pre-filter
    pub prefilter_limit: usize,
}

impl Default for RankerParams {
    fn default() -> Self {
        Self {
            standout_count: 10,
            diversity_window_days: 7,
            prefilter_limit: 500,
        }
    }
}

/// Produces the capped, diversity-filtered daily standout list, memoized per
/// (seeker, day).
pub struct StandoutRanker<S> {
    store: Arc<S>,
    finder: CandidateFinder,
    scorer: StandoutScorer,
    params: RankerParams,
    cache: Option<Arc<CacheManager>>,
}

impl<S: RankingStore> StandoutRanker<S> {
    pub fn new(store: Arc<S>, scorer: StandoutScorer, params: RankerParams) -> Self {
        Self {
            store,
            finder: CandidateFinder::new(),
            scorer,
            params,
            cache: None,
        }
    }

    /// Attach a cache tier in front of the persistent per-day memo.
    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The day's standouts for a seeker.
    ///
    /// Cache hits are re-validated against the seeker's current exclusion
    /// set, so entries referencing since-swiped or since-blocked candidates
    /// heal themselves. An empty filtered pool yields an empty feed, not an
    /// error.
    pub async fn get_standouts(&self, seeker_id: &str) -> Result<StandoutFeed, EngineError> {
        let today = Utc::now().date_naive();
        let seeker = self
            .store
            .get_user(seeker_id)
            .await?
            .ok_or_else(|| EngineError::UserNotFound(seeker_id.to_string()))?;

        let mut excluded = self.store.swiped_ids(seeker_id).await?;
        excluded.extend(self.store.blocked_ids(seeker_id).await?);

        if let Some(entries) = self.cached_entries(seeker_id, today).await {
            debug!(seeker = %seeker_id, "standout cache tier hit");
            return Ok(self.revalidated(today, entries, &excluded));
        }

        if let Some(entries) = self.store.standouts_for_day(seeker_id, today).await? {
            self.fill_cache(seeker_id, today, &entries).await;
            return Ok(self.revalidated(today, entries, &excluded));
        }

        // Fresh computation: suppress recently featured candidates
        let window_start = today - Duration::days(self.params.diversity_window_days as i64);
        excluded.extend(self.store.featured_since(seeker_id, window_start).await?);

        let pool = self
            .store
            .candidate_prefilter(&seeker, self.params.prefilter_limit)
            .await?;
        let candidates = self.finder.find_candidates(&seeker, pool, &excluded, today);

        if candidates.is_empty() {
            info!(seeker = %seeker_id, "no standout candidates today");
            return Ok(StandoutFeed {
                day: today,
                entries: vec![],
                from_cache: false,
            });
        }

        let now = Utc::now();
        let mut scored: Vec<(u8, String, String)> = candidates
            .iter()
            .map(|c| {
                let s = self
                    .scorer
                    .score(&seeker, &c.profile, c.distance_km, now, today);
                (s.score, s.reason, c.profile.user_id.clone())
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(self.params.standout_count);

        let entries: Vec<Standout> = scored
            .into_iter()
            .enumerate()
            .map(|(i, (score, reason, candidate_id))| Standout {
                seeker_id: seeker_id.to_string(),
                candidate_id,
                day: today,
                rank: (i + 1) as u8,
                score,
                reason,
                created_at: now,
                interacted_at: None,
            })
            .collect();

        // Whichever concurrent computation wins the insert, both callers see
        // the same persisted batch.
        let winners = self
            .store
            .insert_standouts_if_absent(seeker_id, today, &entries)
            .await?;
        self.fill_cache(seeker_id, today, &winners).await;

        info!(seeker = %seeker_id, count = winners.len(), "standouts computed");
        Ok(StandoutFeed {
            day: today,
            entries: winners,
            from_cache: false,
        })
    }

    /// Stamp a standout as interacted-with.
    pub async fn mark_interacted(
        &self,
        seeker_id: &str,
        candidate_id: &str,
    ) -> Result<bool, EngineError> {
        let today = Utc::now().date_naive();
        Ok(self
            .store
            .mark_interacted(seeker_id, candidate_id, today, Utc::now())
            .await?)
    }

    fn revalidated(
        &self,
        day: NaiveDate,
        entries: Vec<Standout>,
        excluded: &HashSet<String>,
    ) -> StandoutFeed {
        let entries = entries
            .into_iter()
            .filter(|s| !excluded.contains(&s.candidate_id))
            .collect();
        StandoutFeed {
            day,
            entries,
            from_cache: true,
        }
    }

    async fn cached_entries(&self, seeker_id: &str, day: NaiveDate) -> Option<Vec<Standout>> {
        let cache = self.cache.as_ref()?;
        cache
            .get::<Vec<Standout>>(&CacheKey::standouts(seeker_id, day))
            .await
            .ok()
    }

    async fn fill_cache(&self, seeker_id: &str, day: NaiveDate, entries: &[Standout]) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&CacheKey::standouts(seeker_id, day), &entries).await {
                warn!("failed to cache standouts: {}", e);
            }
        }
    }
}
