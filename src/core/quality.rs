use chrono::NaiveDate;

use crate::core::distance::distance_between;
use crate::core::scoring::{
    age_score, composite_score, distance_score, interest_score, lifestyle_score,
    response_latency_score, Dimension, QualityWeights, ResponseBands, WeightSumError,
};
use crate::models::{PacePreferences, UserProfile};

/// Fixed sub-score when either side holds no preference on a pace dimension
const PACE_WILDCARD_SCORE: f64 = 0.8;

/// Highlights are capped to this many entries
const MAX_HIGHLIGHTS: usize = 3;

/// Computed quality view of a relationship, from one participant's
/// perspective
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub score: u8,
    pub highlights: Vec<String>,
    pub dimensions: Vec<Dimension>,
}

/// Relationship quality scorer
///
/// Weighted composite over distance, age, shared interests, lifestyle,
/// communication pace and response latency. Weights are validated once at
/// construction.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    weights: QualityWeights,
    bands: ResponseBands,
    similar_age_years: u8,
}

impl QualityScorer {
    pub fn new(
        weights: QualityWeights,
        bands: ResponseBands,
        similar_age_years: u8,
    ) -> Result<Self, WeightSumError> {
        weights.validate()?;
        Ok(Self {
            weights,
            bands,
            similar_age_years,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: QualityWeights::default(),
            bands: ResponseBands::default(),
            similar_age_years: 3,
        }
    }

    /// Score the relationship from `viewer`'s perspective.
    ///
    /// `like_gap_hours` is the time between the two reciprocal likes, when
    /// known.
    pub fn score(
        &self,
        viewer: &UserProfile,
        other: &UserProfile,
        like_gap_hours: Option<f64>,
        today: NaiveDate,
    ) -> QualityReport {
        let distance_km = distance_between(viewer.coordinates, other.coordinates);
        let (interests, shared_count) = interest_score(&viewer.interests, &other.interests);

        let dimensions = vec![
            Dimension::new(
                "distance",
                self.weights.distance,
                distance_score(distance_km, viewer.max_distance_km),
            ),
            Dimension::new(
                "age",
                self.weights.age,
                age_score(viewer, other, today, self.similar_age_years),
            ),
            Dimension::new("interests", self.weights.interests, interests),
            Dimension::new(
                "lifestyle",
                self.weights.lifestyle,
                lifestyle_score(&viewer.lifestyle, &other.lifestyle),
            ),
            Dimension::new(
                "pace",
                self.weights.pace,
                pace_score(viewer.pace.as_ref(), other.pace.as_ref()),
            ),
            Dimension::new(
                "response",
                self.weights.response,
                response_latency_score(like_gap_hours, &self.bands),
            ),
        ];

        let score = composite_score(&dimensions);
        let highlights = highlights(&dimensions, distance_km, shared_count);

        QualityReport {
            score,
            highlights,
            dimensions,
        }
    }
}

/// Ordinal comparison for one pace sub-dimension. A wildcard on either side
/// yields the fixed neutral-high value.
fn pace_sub_score(a: Option<u8>, b: Option<u8>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return PACE_WILDCARD_SCORE;
    };
    match a.abs_diff(b) {
        0 => 1.0,
        1 => 0.6,
        _ => 0.2,
    }
}

/// Communication-pace compatibility (0-1). Missing preferences on either
/// side yield an overall neutral score.
pub fn pace_score(a: Option<&PacePreferences>, b: Option<&PacePreferences>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.5;
    };
    let subs = [
        pace_sub_score(a.messaging.ordinal(), b.messaging.ordinal()),
        pace_sub_score(a.first_date.ordinal(), b.first_date.ordinal()),
        pace_sub_score(a.style.ordinal(), b.style.ordinal()),
        pace_sub_score(a.depth.ordinal(), b.depth.ordinal()),
    ];
    subs.iter().sum::<f64>() / subs.len() as f64
}

/// Short human-readable highlights from the evaluated dimensions,
/// first-match-wins, capped.
fn highlights(
    dimensions: &[Dimension],
    distance_km: Option<f64>,
    shared_interests: usize,
) -> Vec<String> {
    let value_of = |name: &str| {
        dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value)
            .unwrap_or(0.0)
    };

    let mut out = Vec::new();
    if matches!(distance_km, Some(d) if d <= 5.0) {
        out.push("Lives nearby".to_string());
    }
    if out.len() < MAX_HIGHLIGHTS && shared_interests >= 2 {
        out.push(format!("You share {} interests", shared_interests));
    }
    if out.len() < MAX_HIGHLIGHTS && value_of("lifestyle") >= 0.75 {
        out.push("Lifestyle in sync".to_string());
    }
    if out.len() < MAX_HIGHLIGHTS && value_of("pace") >= 0.8 {
        out.push("Similar communication pace".to_string());
    }
    if out.len() < MAX_HIGHLIGHTS && value_of("response") >= 0.9 {
        out.push("Replies quickly".to_string());
    }
    out.truncate(MAX_HIGHLIGHTS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountStatus, CommunicationStyle, ConversationDepth, Coordinates, Dealbreakers,
        FirstDateTiming, Gender, Lifestyle, MessagingCadence,
    };

    fn profile(id: &str, birth_year: i32) -> UserProfile {
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
            interests: vec!["hiking".to_string(), "jazz".to_string()],
            lifestyle: Lifestyle::default(),
            pace: None,
            dealbreakers: Dealbreakers::default(),
            height_cm: None,
            education: None,
            status: AccountStatus::Active,
            profile_strength: 50,
            last_active_at: None,
        }
    }

    fn pace(
        messaging: MessagingCadence,
        first_date: FirstDateTiming,
        style: CommunicationStyle,
        depth: ConversationDepth,
    ) -> PacePreferences {
        PacePreferences {
            messaging,
            first_date,
            style,
            depth,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_rejects_invalid_weights() {
        let mut weights = QualityWeights::default();
        weights.pace = 0.5;
        assert!(QualityScorer::new(weights, ResponseBands::default(), 3).is_err());
    }

    #[test]
    fn test_score_in_range() {
        let scorer = QualityScorer::with_defaults();
        let a = profile("a", 1995);
        let b = profile("b", 1994);

        let report = scorer.score(&a, &b, Some(2.0), today());
        assert!(report.score <= 100);
        assert_eq!(report.dimensions.len(), 6);
        for d in &report.dimensions {
            assert!((0.0..=1.0).contains(&d.value), "{} out of range", d.name);
        }
    }

    #[test]
    fn test_pace_exact_match_scores_high() {
        let a = pace(
            MessagingCadence::Daily,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Deep,
        );
        assert_eq!(pace_score(Some(&a), Some(&a)), 1.0);
    }

    #[test]
    fn test_pace_wildcard_sub_dimension() {
        let a = pace(
            MessagingCadence::NoPreference,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Deep,
        );
        let b = pace(
            MessagingCadence::Constant,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Deep,
        );
        // Wildcard messaging sub-dimension scores 0.8, the rest 1.0
        let expected = (0.8 + 3.0) / 4.0;
        assert!((pace_score(Some(&a), Some(&b)) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pace_missing_preferences_neutral() {
        let a = pace(
            MessagingCadence::Daily,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Deep,
        );
        assert_eq!(pace_score(Some(&a), None), 0.5);
        assert_eq!(pace_score(None, None), 0.5);
    }

    #[test]
    fn test_pace_ordinal_distance() {
        let a = pace(
            MessagingCadence::Constant,
            FirstDateTiming::WithinDays,
            CommunicationStyle::Texting,
            ConversationDepth::Light,
        );
        let b = pace(
            MessagingCadence::Weekly,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Light,
        );
        // Far (0.2), adjacent (0.6), exact (1.0), exact (1.0)
        let expected = (0.2 + 0.6 + 1.0 + 1.0) / 4.0;
        assert!((pace_score(Some(&a), Some(&b)) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_highlights_first_match_wins_and_capped() {
        let scorer = QualityScorer::with_defaults();
        let mut a = profile("a", 1995);
        let mut b = profile("b", 1994);
        a.pace = Some(pace(
            MessagingCadence::Daily,
            FirstDateTiming::WithinWeeks,
            CommunicationStyle::Texting,
            ConversationDepth::Deep,
        ));
        b.pace = a.pace;

        // Same spot, shared interests, matching pace, instant reciprocity:
        // more than three qualifying highlights
        let report = scorer.score(&a, &b, Some(0.25), today());
        assert!(report.highlights.len() <= 3);
        assert_eq!(report.highlights[0], "Lives nearby");
    }
}
