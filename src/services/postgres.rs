use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Months, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

use crate::core::distance::calculate_bounding_box;
use crate::models::{
    AccountStatus, Match, Report, Standout, Swipe, UndoEntry, UserProfile,
};
use crate::services::store::{
    BlockStore, MatchStore, StandoutStore, StoreError, StoreResult, SwipeStore, UserStore,
};

/// PostgreSQL-backed implementation of every storage contract.
///
/// Profiles are stored as JSONB documents with the columns the coarse
/// pre-filter needs (status, gender, birth date, coordinates) broken out and
/// indexed.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run migrations.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Insert or replace a profile document. Profile authorship lives in the
    /// user service; this entry point exists for seeding and tests.
    pub async fn upsert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let doc = serde_json::to_value(profile)?;
        let (latitude, longitude) = match profile.coordinates {
            Some(c) => (Some(c.latitude), Some(c.longitude)),
            None => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, status, gender, birth_date, latitude, longitude, doc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id)
            DO UPDATE SET
                status = EXCLUDED.status,
                gender = EXCLUDED.gender,
                birth_date = EXCLUDED.birth_date,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                doc = EXCLUDED.doc
            "#,
        )
        .bind(&profile.user_id)
        .bind(profile.status)
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.birth_date)
        .bind(latitude)
        .bind(longitude)
        .bind(doc)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> StoreResult<bool> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    fn profile_from_row(row: &sqlx::postgres::PgRow) -> StoreResult<UserProfile> {
        let doc: serde_json::Value = row.get("doc");
        Ok(serde_json::from_value(doc)?)
    }

    fn match_from_row(row: &sqlx::postgres::PgRow) -> Match {
        Match::from_parts(
            row.get("id"),
            row.get("user_a"),
            row.get("user_b"),
            row.get("state"),
            row.get("created_at"),
            row.get("ended_at"),
            row.get("ended_by"),
            row.get("end_reason"),
        )
    }

    fn standout_from_row(row: &sqlx::postgres::PgRow) -> Standout {
        Standout {
            seeker_id: row.get("seeker_id"),
            candidate_id: row.get("candidate_id"),
            day: row.get("day"),
            rank: row.get::<i16, _>("rank") as u8,
            score: row.get::<i16, _>("score") as u8,
            reason: row.get("reason"),
            created_at: row.get("created_at"),
            interacted_at: row.get("interacted_at"),
        }
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn get_user(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query("SELECT doc FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::profile_from_row).transpose()
    }

    async fn find_active(&self, limit: usize) -> StoreResult<Vec<UserProfile>> {
        let rows = sqlx::query("SELECT doc FROM profiles WHERE status = 'active' LIMIT $1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::profile_from_row).collect()
    }

    async fn candidate_prefilter(
        &self,
        seeker: &UserProfile,
        limit: usize,
    ) -> StoreResult<Vec<UserProfile>> {
        let today = Utc::now().date_naive();
        // Birth-date window is deliberately loose; the pipeline re-checks
        // exact ages.
        let earliest_birth = today
            .checked_sub_months(Months::new((seeker.max_age as u32 + 1) * 12))
            .unwrap_or(NaiveDate::MIN);
        let latest_birth = today
            .checked_sub_months(Months::new(seeker.min_age as u32 * 12))
            .unwrap_or(today);

        let genders: Vec<String> = seeker
            .interested_in
            .iter()
            .map(|g| g.as_str().to_string())
            .collect();

        let bbox = seeker
            .coordinates
            .map(|c| calculate_bounding_box(c, seeker.max_distance_km as f64));
        let (min_lat, max_lat, min_lon, max_lon) = match bbox {
            Some(b) => (Some(b.min_lat), Some(b.max_lat), Some(b.min_lon), Some(b.max_lon)),
            None => (None, None, None, None),
        };

        // Candidates without coordinates survive the box; the pipeline
        // decides how unknown locations are treated.
        let rows = sqlx::query(
            r#"
            SELECT doc FROM profiles
            WHERE user_id <> $1
              AND status = 'active'
              AND gender = ANY($2)
              AND birth_date IS NOT NULL
              AND birth_date BETWEEN $3 AND $4
              AND (
                    $5::float8 IS NULL
                    OR latitude IS NULL
                    OR (latitude BETWEEN $5 AND $6 AND longitude BETWEEN $7 AND $8)
                  )
            LIMIT $9
            "#,
        )
        .bind(&seeker.user_id)
        .bind(&genders)
        .bind(earliest_birth)
        .bind(latest_birth)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lon)
        .bind(max_lon)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!(seeker = %seeker.user_id, pool = rows.len(), "coarse pre-filter");
        rows.iter().map(Self::profile_from_row).collect()
    }

    async fn set_account_status(&self, user_id: &str, status: AccountStatus) -> StoreResult<()> {
        let status_str = match status {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Banned => "banned",
        };
        sqlx::query(
            r#"
            UPDATE profiles
            SET status = $2, doc = jsonb_set(doc, '{status}', to_jsonb($3::text))
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(status_str)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SwipeStore for PostgresStore {
    async fn swipe_exists(&self, actor_id: &str, target_id: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM swipes WHERE actor_id = $1 AND target_id = $2)",
        )
        .bind(actor_id)
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn like_timestamp(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let ts: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT created_at FROM swipes
            WHERE actor_id = $1 AND target_id = $2 AND direction = 'like'
            "#,
        )
        .bind(actor_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ts)
    }

    async fn insert_swipe(&self, swipe: &Swipe) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO swipes (id, actor_id, target_id, direction, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (actor_id, target_id) DO NOTHING
            "#,
        )
        .bind(&swipe.id)
        .bind(&swipe.actor_id)
        .bind(&swipe.target_id)
        .bind(swipe.direction)
        .bind(swipe.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_swipe(&self, swipe_id: &str) -> StoreResult<Option<Swipe>> {
        let row = sqlx::query(
            "SELECT id, actor_id, target_id, direction, created_at FROM swipes WHERE id = $1",
        )
        .bind(swipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Swipe {
            id: r.get("id"),
            actor_id: r.get("actor_id"),
            target_id: r.get("target_id"),
            direction: r.get("direction"),
            created_at: r.get("created_at"),
        }))
    }

    async fn delete_swipe(&self, swipe_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM swipes WHERE id = $1")
            .bind(swipe_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn swiped_ids(&self, actor_id: &str) -> StoreResult<HashSet<String>> {
        let rows = sqlx::query("SELECT target_id FROM swipes WHERE actor_id = $1")
            .bind(actor_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("target_id")).collect())
    }

    async fn likes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM swipes
            WHERE actor_id = $1 AND direction = 'like' AND created_at >= $2
            "#,
        )
        .bind(actor_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u32)
    }

    async fn passes_since(&self, actor_id: &str, since: DateTime<Utc>) -> StoreResult<u32> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM swipes
            WHERE actor_id = $1 AND direction = 'pass' AND created_at >= $2
            "#,
        )
        .bind(actor_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u32)
    }

    async fn push_undo(&self, actor_id: &str, swipe_id: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO undo_log (actor_id, swipe_id, recorded_at) VALUES ($1, $2, NOW())",
        )
        .bind(actor_id)
        .bind(swipe_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn pop_undo(&self, actor_id: &str) -> StoreResult<Option<UndoEntry>> {
        let row = sqlx::query(
            r#"
            DELETE FROM undo_log
            WHERE id = (
                SELECT id FROM undo_log
                WHERE actor_id = $1
                ORDER BY recorded_at DESC, id DESC
                LIMIT 1
            )
            RETURNING actor_id, swipe_id, recorded_at
            "#,
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| UndoEntry {
            actor_id: r.get("actor_id"),
            swipe_id: r.get("swipe_id"),
            recorded_at: r.get("recorded_at"),
        }))
    }
}

#[async_trait]
impl BlockStore for PostgresStore {
    async fn blocked_ids(&self, user_id: &str) -> StoreResult<HashSet<String>> {
        let rows = sqlx::query(
            r#"
            SELECT user_b AS other FROM matches WHERE user_a = $1 AND state = 'blocked'
            UNION
            SELECT user_a AS other FROM matches WHERE user_b = $1 AND state = 'blocked'
            UNION
            SELECT reported_id AS other FROM reports WHERE reporter_id = $1
            UNION
            SELECT reporter_id AS other FROM reports WHERE reported_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get("other")).collect())
    }

    async fn is_blocked(&self, a: &str, b: &str) -> StoreResult<bool> {
        let match_id = Match::canonical_id(a, b);
        let blocked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM matches WHERE id = $1 AND state = 'blocked')
                OR EXISTS(
                    SELECT 1 FROM reports
                    WHERE (reporter_id = $2 AND reported_id = $3)
                       OR (reporter_id = $3 AND reported_id = $2)
                  )
            "#,
        )
        .bind(&match_id)
        .bind(a)
        .bind(b)
        .fetch_one(&self.pool)
        .await?;
        Ok(blocked)
    }

    async fn insert_report(&self, report: &Report) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reports (id, reporter_id, reported_id, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&report.id)
        .bind(&report.reporter_id)
        .bind(&report.reported_id)
        .bind(&report.reason)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn report_count(&self, reported_id: &str) -> StoreResult<u32> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE reported_id = $1")
                .bind(reported_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.max(0) as u32)
    }
}

const MATCH_COLUMNS: &str = "id, user_a, user_b, state, created_at, ended_at, ended_by, end_reason";

#[async_trait]
impl MatchStore for PostgresStore {
    async fn get_match(&self, match_id: &str) -> StoreResult<Option<Match>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM matches WHERE id = $1",
            MATCH_COLUMNS
        ))
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(Self::match_from_row))
    }

    async fn match_exists(&self, match_id: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM matches WHERE id = $1)")
                .bind(match_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_match_if_absent(&self, m: &Match) -> StoreResult<Match> {
        // The no-op DO UPDATE makes RETURNING yield the winning row whether
        // this insert won or lost the race.
        let (user_a, user_b) = m.participants();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO matches (id, user_a, user_b, state, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET id = EXCLUDED.id
            RETURNING {}
            "#,
            MATCH_COLUMNS
        ))
        .bind(m.id())
        .bind(user_a)
        .bind(user_b)
        .bind(m.state())
        .bind(m.created_at())
        .fetch_one(&self.pool)
        .await?;
        Ok(Self::match_from_row(&row))
    }

    async fn update_match(&self, m: &Match) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE matches
            SET state = $2, ended_at = $3, ended_by = $4, end_reason = $5
            WHERE id = $1
            "#,
        )
        .bind(m.id())
        .bind(m.state())
        .bind(m.ended_at())
        .bind(m.ended_by())
        .bind(m.end_reason())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("match {}", m.id())));
        }
        Ok(())
    }

    async fn delete_match(&self, match_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1")
            .bind(match_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM matches
            WHERE user_a = $1 OR user_b = $1
            ORDER BY created_at DESC
            "#,
            MATCH_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(Self::match_from_row).collect())
    }

    async fn active_matches_for_user(&self, user_id: &str) -> StoreResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM matches
            WHERE (user_a = $1 OR user_b = $1) AND state IN ('active', 'friends')
            ORDER BY created_at DESC
            "#,
            MATCH_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(Self::match_from_row).collect())
    }
}

#[async_trait]
impl StandoutStore for PostgresStore {
    async fn standouts_for_day(
        &self,
        seeker_id: &str,
        day: NaiveDate,
    ) -> StoreResult<Option<Vec<Standout>>> {
        let rows = sqlx::query(
            r#"
            SELECT seeker_id, candidate_id, day, rank, score, reason, created_at, interacted_at
            FROM standouts
            WHERE seeker_id = $1 AND day = $2
            ORDER BY rank
            "#,
        )
        .bind(seeker_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.iter().map(Self::standout_from_row).collect()))
    }

    async fn insert_standouts_if_absent(
        &self,
        seeker_id: &str,
        day: NaiveDate,
        entries: &[Standout],
    ) -> StoreResult<Vec<Standout>> {
        let mut tx = self.pool.begin().await?;

        // The unique (seeker, day, rank) index makes a losing batch a no-op.
        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO standouts
                    (seeker_id, candidate_id, day, rank, score, reason, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (seeker_id, day, rank) DO NOTHING
                "#,
            )
            .bind(&entry.seeker_id)
            .bind(&entry.candidate_id)
            .bind(entry.day)
            .bind(entry.rank as i16)
            .bind(entry.score as i16)
            .bind(&entry.reason)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;
        }

        let rows = sqlx::query(
            r#"
            SELECT seeker_id, candidate_id, day, rank, score, reason, created_at, interacted_at
            FROM standouts
            WHERE seeker_id = $1 AND day = $2
            ORDER BY rank
            "#,
        )
        .bind(seeker_id)
        .bind(day)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(rows.iter().map(Self::standout_from_row).collect())
    }

    async fn featured_since(
        &self,
        seeker_id: &str,
        since: NaiveDate,
    ) -> StoreResult<HashSet<String>> {
        let rows = sqlx::query(
            "SELECT candidate_id FROM standouts WHERE seeker_id = $1 AND day >= $2",
        )
        .bind(seeker_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| r.get("candidate_id")).collect())
    }

    async fn mark_interacted(
        &self,
        seeker_id: &str,
        candidate_id: &str,
        day: NaiveDate,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE standouts SET interacted_at = $4
            WHERE seeker_id = $1 AND candidate_id = $2 AND day = $3 AND interacted_at IS NULL
            "#,
        )
        .bind(seeker_id)
        .bind(candidate_id)
        .bind(day)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
