use chrono::{DateTime, NaiveDate, Utc};

use crate::core::scoring::{
    age_score, completeness_score, composite_score, distance_score, interest_score,
    lifestyle_score, recency_score, Dimension, StandoutWeights, WeightSumError,
};
use crate::models::UserProfile;

/// A scored daily-ranking candidate
#[derive(Debug, Clone)]
pub struct StandoutScore {
    pub score: u8,
    pub reason: String,
    pub dimensions: Vec<Dimension>,
}

/// Daily standout scorer
///
/// Same weighted-composite mechanism as the quality scorer, with profile
/// completeness and activity recency in place of the perspective-bound pace
/// and response dimensions.
#[derive(Debug, Clone)]
pub struct StandoutScorer {
    weights: StandoutWeights,
    similar_age_years: u8,
}

impl StandoutScorer {
    pub fn new(weights: StandoutWeights, similar_age_years: u8) -> Result<Self, WeightSumError> {
        weights.validate()?;
        Ok(Self {
            weights,
            similar_age_years,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: StandoutWeights::default(),
            similar_age_years: 3,
        }
    }

    pub fn score(
        &self,
        seeker: &UserProfile,
        candidate: &UserProfile,
        distance_km: Option<f64>,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> StandoutScore {
        let (interests, shared_count) = interest_score(&seeker.interests, &candidate.interests);

        let dimensions = vec![
            Dimension::new(
                "distance",
                self.weights.distance,
                distance_score(distance_km, seeker.max_distance_km),
            ),
            Dimension::new(
                "age",
                self.weights.age,
                age_score(seeker, candidate, today, self.similar_age_years),
            ),
            Dimension::new("interests", self.weights.interests, interests),
            Dimension::new(
                "lifestyle",
                self.weights.lifestyle,
                lifestyle_score(&seeker.lifestyle, &candidate.lifestyle),
            ),
            Dimension::new(
                "completeness",
                self.weights.completeness,
                completeness_score(candidate.profile_strength),
            ),
            Dimension::new(
                "recency",
                self.weights.recency,
                recency_score(candidate.last_active_at, now),
            ),
        ];

        let score = composite_score(&dimensions);
        let reason = reason(&dimensions, distance_km, shared_count);

        StandoutScore {
            score,
            reason,
            dimensions,
        }
    }
}

/// First matching reason wins; every standout carries one.
fn reason(dimensions: &[Dimension], distance_km: Option<f64>, shared_interests: usize) -> String {
    let value_of = |name: &str| {
        dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value)
            .unwrap_or(0.0)
    };

    if matches!(distance_km, Some(d) if d <= 5.0) {
        return "Lives nearby".to_string();
    }
    if shared_interests >= 2 {
        return format!("{} shared interests", shared_interests);
    }
    if value_of("completeness") >= 0.8 {
        return "Standout profile".to_string();
    }
    if value_of("recency") >= 0.9 {
        return "Active today".to_string();
    }
    "Worth a look".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, Coordinates, Dealbreakers, Gender, Lifestyle};
    use chrono::Duration;

    fn profile(id: &str, birth_year: i32, strength: u8) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 10),
            gender: Some(Gender::Woman),
            interested_in: vec![Gender::Man],
            coordinates: Some(Coordinates {
                latitude: 40.7128,
                longitude: -74.0060,
            }),
            min_age: 21,
            max_age: 35,
            max_distance_km: 50,
            interests: vec!["hiking".to_string()],
            lifestyle: Lifestyle::default(),
            pace: None,
            dealbreakers: Dealbreakers::default(),
            height_cm: None,
            education: None,
            status: AccountStatus::Active,
            profile_strength: strength,
            last_active_at: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_rejects_invalid_weights() {
        let mut weights = StandoutWeights::default();
        weights.recency = 0.0;
        assert!(StandoutScorer::new(weights, 3).is_err());
    }

    #[test]
    fn test_score_in_range_with_reason() {
        let scorer = StandoutScorer::with_defaults();
        let seeker = profile("s", 1995, 70);
        let candidate = profile("c", 1994, 90);

        let result = scorer.score(&seeker, &candidate, Some(3.0), Utc::now(), today());
        assert!(result.score <= 100);
        assert!(!result.reason.is_empty());
        assert_eq!(result.dimensions.len(), 6);
    }

    #[test]
    fn test_stronger_profile_scores_higher() {
        let scorer = StandoutScorer::with_defaults();
        let seeker = profile("s", 1995, 70);
        let full = profile("full", 1994, 100);
        let sparse = profile("sparse", 1994, 10);
        let now = Utc::now();

        let high = scorer.score(&seeker, &full, Some(3.0), now, today());
        let low = scorer.score(&seeker, &sparse, Some(3.0), now, today());
        assert!(high.score > low.score);
    }

    #[test]
    fn test_recently_active_scores_higher() {
        let scorer = StandoutScorer::with_defaults();
        let seeker = profile("s", 1995, 70);
        let now = Utc::now();

        let mut fresh = profile("fresh", 1994, 50);
        fresh.last_active_at = Some(now - Duration::minutes(30));
        let mut stale = profile("stale", 1994, 50);
        stale.last_active_at = Some(now - Duration::days(45));

        let high = scorer.score(&seeker, &fresh, Some(3.0), now, today());
        let low = scorer.score(&seeker, &stale, Some(3.0), now, today());
        assert!(high.score > low.score);
    }

    #[test]
    fn test_nearby_reason_wins_first() {
        let scorer = StandoutScorer::with_defaults();
        let mut seeker = profile("s", 1995, 70);
        let mut candidate = profile("c", 1994, 100);
        seeker.interests = vec!["hiking".to_string(), "jazz".to_string()];
        candidate.interests = seeker.interests.clone();

        let result = scorer.score(&seeker, &candidate, Some(2.0), Utc::now(), today());
        assert_eq!(result.reason, "Lives nearby");
    }
}
