use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ChildrenStance, Lifestyle, UserProfile};

/// Tolerance when validating that a weight table sums to 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
#[error("dimension weights must sum to 1.0, got {sum:.6}")]
pub struct WeightSumError {
    pub sum: f64,
}

/// One evaluated dimension of a composite score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimension {
    pub name: &'static str,
    pub weight: f64,
    pub value: f64,
}

impl Dimension {
    pub fn new(name: &'static str, weight: f64, value: f64) -> Self {
        Self {
            name,
            weight,
            value,
        }
    }
}

/// Validate a named weight table. Runs once at scorer construction, never at
/// scoring time.
pub fn validate_weights(weights: &[(&'static str, f64)]) -> Result<(), WeightSumError> {
    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(WeightSumError { sum });
    }
    Ok(())
}

/// Combine evaluated dimensions into a 0-100 composite. Dimension values are
/// clamped to [0, 1] before weighting.
pub fn composite_score(dimensions: &[Dimension]) -> u8 {
    let total: f64 = dimensions
        .iter()
        .map(|d| d.weight * d.value.clamp(0.0, 1.0))
        .sum();
    (total * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Weights for the relationship quality score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualityWeights {
    pub distance: f64,
    pub age: f64,
    pub interests: f64,
    pub lifestyle: f64,
    pub pace: f64,
    pub response: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            distance: 0.20,
            age: 0.15,
            interests: 0.25,
            lifestyle: 0.15,
            pace: 0.15,
            response: 0.10,
        }
    }
}

impl QualityWeights {
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("distance", self.distance),
            ("age", self.age),
            ("interests", self.interests),
            ("lifestyle", self.lifestyle),
            ("pace", self.pace),
            ("response", self.response),
        ]
    }

    pub fn validate(&self) -> Result<(), WeightSumError> {
        validate_weights(&self.named())
    }
}

/// Weights for the daily standout score
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StandoutWeights {
    pub distance: f64,
    pub age: f64,
    pub interests: f64,
    pub lifestyle: f64,
    pub completeness: f64,
    pub recency: f64,
}

impl Default for StandoutWeights {
    fn default() -> Self {
        Self {
            distance: 0.20,
            age: 0.15,
            interests: 0.25,
            lifestyle: 0.15,
            completeness: 0.15,
            recency: 0.10,
        }
    }
}

impl StandoutWeights {
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("distance", self.distance),
            ("age", self.age),
            ("interests", self.interests),
            ("lifestyle", self.lifestyle),
            ("completeness", self.completeness),
            ("recency", self.recency),
        ]
    }

    pub fn validate(&self) -> Result<(), WeightSumError> {
        validate_weights(&self.named())
    }
}

/// Hour thresholds for the response-latency bands
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResponseBands {
    pub excellent_hours: f64,
    pub great_hours: f64,
    pub good_hours: f64,
    pub okay_hours: f64,
    pub low_hours: f64,
}

impl Default for ResponseBands {
    fn default() -> Self {
        Self {
            excellent_hours: 1.0,
            great_hours: 24.0,
            good_hours: 72.0,
            okay_hours: 168.0,
            low_hours: 720.0,
        }
    }
}

/// Distance score (0-1). 1.0 within a kilometer, 0.0 at or past the seeker's
/// max distance, linear decay between. Unknown distance scores neutral.
#[inline]
pub fn distance_score(distance_km: Option<f64>, max_distance_km: u16) -> f64 {
    let Some(d) = distance_km else {
        return 0.5;
    };
    if d <= 1.0 {
        return 1.0;
    }
    let max = max_distance_km as f64;
    if max <= 0.0 || d >= max {
        return 0.0;
    }
    1.0 - d / max
}

/// Age affinity (0-1) between two users. 1.0 when the difference is within
/// the similar-years threshold, otherwise decays over the mean of both
/// preferred-range widths. Unknown ages score neutral.
pub fn age_score(a: &UserProfile, b: &UserProfile, today: NaiveDate, similar_years: u8) -> f64 {
    let (Some(age_a), Some(age_b)) = (a.age_on(today), b.age_on(today)) else {
        return 0.5;
    };
    let diff = age_a.abs_diff(age_b);
    if diff <= similar_years {
        return 1.0;
    }
    let avg_range = (a.age_range_width() as f64 + b.age_range_width() as f64) / 2.0;
    if avg_range <= 0.0 {
        return 1.0;
    }
    (1.0 - diff as f64 / avg_range).max(0.0)
}

/// Shared-interest score (0-1): neutral when neither side lists interests, a
/// flat penalty when only one side does, otherwise overlap over the smaller
/// set.
pub fn interest_score(a: &[String], b: &[String]) -> (f64, usize) {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => (0.5, 0),
        (true, false) | (false, true) => (0.3, 0),
        (false, false) => {
            let shared = a.iter().filter(|i| b.contains(i)).count();
            let smaller = a.len().min(b.len());
            (shared as f64 / smaller as f64, shared)
        }
    }
}

fn kids_compatible(a: ChildrenStance, b: ChildrenStance) -> bool {
    a == b
        || a == ChildrenStance::Open
        || b == ChildrenStance::Open
        || matches!(
            (a, b),
            (ChildrenStance::Someday, ChildrenStance::HaveKids)
                | (ChildrenStance::HaveKids, ChildrenStance::Someday)
        )
}

/// Lifestyle compatibility (0-1): the fraction of jointly-specified
/// dimensions that are compatible, neutral when nothing is jointly specified.
pub fn lifestyle_score(a: &Lifestyle, b: &Lifestyle) -> f64 {
    let mut considered = 0u32;
    let mut compatible = 0u32;

    if let (Some(x), Some(y)) = (a.smoking, b.smoking) {
        considered += 1;
        if x == y {
            compatible += 1;
        }
    }
    if let (Some(x), Some(y)) = (a.drinking, b.drinking) {
        considered += 1;
        if x == y {
            compatible += 1;
        }
    }
    if let (Some(x), Some(y)) = (a.children, b.children) {
        considered += 1;
        if kids_compatible(x, y) {
            compatible += 1;
        }
    }
    if let (Some(x), Some(y)) = (a.relationship_goal, b.relationship_goal) {
        considered += 1;
        if x == y {
            compatible += 1;
        }
    }

    if considered == 0 {
        return 0.5;
    }
    compatible as f64 / considered as f64
}

/// Response-latency score (0-1), tiered by the hours between the two
/// reciprocal likes. Unknown or non-positive latency scores neutral.
pub fn response_latency_score(gap_hours: Option<f64>, bands: &ResponseBands) -> f64 {
    let Some(hours) = gap_hours else {
        return 0.5;
    };
    if hours <= 0.0 {
        return 0.5;
    }
    if hours < bands.excellent_hours {
        1.0
    } else if hours < bands.great_hours {
        0.9
    } else if hours < bands.good_hours {
        0.75
    } else if hours < bands.okay_hours {
        0.6
    } else if hours < bands.low_hours {
        0.3
    } else {
        0.1
    }
}

/// Profile completeness (0-1) from the precomputed 0-100 strength.
#[inline]
pub fn completeness_score(profile_strength: u8) -> f64 {
    profile_strength.min(100) as f64 / 100.0
}

/// Activity recency (0-1), tiered by hours since the last profile activity.
/// Never-active profiles score the bottom tier.
pub fn recency_score(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(last) = last_active_at else {
        return 0.1;
    };
    let hours = (now - last).num_minutes() as f64 / 60.0;
    if hours < 1.0 {
        1.0
    } else if hours < 24.0 {
        0.9
    } else if hours < 72.0 {
        0.7
    } else if hours < 168.0 {
        0.5
    } else if hours < 720.0 {
        0.3
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, Dealbreakers, Gender, Habit, RelationshipGoal};
    use chrono::Duration;

    fn profile(birth_year: i32, min_age: u8, max_age: u8) -> UserProfile {
        UserProfile {
            user_id: "u".to_string(),
            name: "U".to_string(),
            birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 10),
            gender: Some(Gender::Woman),
            interested_in: vec![Gender::Man],
            coordinates: None,
            min_age,
            max_age,
            max_distance_km: 50,
            interests: vec![],
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

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_default_weight_tables_sum_to_one() {
        assert!(QualityWeights::default().validate().is_ok());
        assert!(StandoutWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weight_validation_rejects_bad_sum() {
        let mut weights = QualityWeights::default();
        weights.distance += 0.05;
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_composite_score_range_and_rounding() {
        let dims = [
            Dimension::new("a", 0.5, 1.0),
            Dimension::new("b", 0.5, 0.0),
        ];
        assert_eq!(composite_score(&dims), 50);

        // Out-of-range values are clamped, not propagated
        let wild = [
            Dimension::new("a", 0.5, 7.0),
            Dimension::new("b", 0.5, -3.0),
        ];
        assert_eq!(composite_score(&wild), 50);
    }

    #[test]
    fn test_distance_score_linear_decay() {
        // Worked example: 5.5km at max 10 is ~0.45
        let score = distance_score(Some(5.5), 10);
        assert!((score - 0.45).abs() < 0.01);

        assert_eq!(distance_score(Some(0.5), 10), 1.0);
        assert_eq!(distance_score(Some(10.0), 10), 0.0);
        assert_eq!(distance_score(Some(25.0), 10), 0.0);
        assert_eq!(distance_score(None, 10), 0.5);
    }

    #[test]
    fn test_age_score_similar_threshold() {
        let a = profile(1995, 21, 35); // 31
        let b = profile(1993, 21, 35); // 33
        assert_eq!(age_score(&a, &b, today(), 3), 1.0);
    }

    #[test]
    fn test_age_score_decays_over_average_range() {
        let a = profile(1995, 25, 35); // 31, width 10
        let b = profile(1975, 25, 45); // 51, width 20
        // diff 20, avg range 15 -> clamped to 0
        assert_eq!(age_score(&a, &b, today(), 3), 0.0);

        let c = profile(1986, 25, 45); // 40, diff 9, avg 15 -> 0.4
        let score = age_score(&a, &c, today(), 3);
        assert!((score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_age_score_unknown_is_neutral() {
        let a = profile(1995, 21, 35);
        let mut b = profile(1993, 21, 35);
        b.birth_date = None;
        assert_eq!(age_score(&a, &b, today(), 3), 0.5);
    }

    #[test]
    fn test_age_score_zero_width_ranges() {
        let a = profile(1995, 30, 30);
        let b = profile(1980, 40, 40);
        assert_eq!(age_score(&a, &b, today(), 3), 1.0);
    }

    #[test]
    fn test_interest_score_neutral_and_penalty() {
        let none: Vec<String> = vec![];
        let some = vec!["hiking".to_string()];

        assert_eq!(interest_score(&none, &none).0, 0.5);
        assert_eq!(interest_score(&some, &none).0, 0.3);
        assert_eq!(interest_score(&none, &some).0, 0.3);
    }

    #[test]
    fn test_interest_score_overlap_ratio() {
        let a = vec!["hiking".to_string(), "jazz".to_string(), "films".to_string()];
        let b = vec!["jazz".to_string(), "films".to_string()];

        let (score, shared) = interest_score(&a, &b);
        assert_eq!(shared, 2);
        assert!((score - 1.0).abs() < 1e-9); // 2 shared / min(3, 2)
    }

    #[test]
    fn test_lifestyle_score_joint_dimensions_only() {
        let a = Lifestyle {
            smoking: Some(Habit::Never),
            drinking: Some(Habit::Sometimes),
            children: None,
            relationship_goal: Some(RelationshipGoal::LongTerm),
        };
        let b = Lifestyle {
            smoking: Some(Habit::Never),
            drinking: None,
            children: Some(ChildrenStance::Someday),
            relationship_goal: Some(RelationshipGoal::Casual),
        };

        // Joint: smoking (match), goal (mismatch) -> 1/2
        assert!((lifestyle_score(&a, &b) - 0.5).abs() < 1e-9);
        assert_eq!(lifestyle_score(&Lifestyle::default(), &Lifestyle::default()), 0.5);
    }

    #[test]
    fn test_kids_stance_special_rules() {
        assert!(kids_compatible(ChildrenStance::Open, ChildrenStance::DontWant));
        assert!(kids_compatible(ChildrenStance::Someday, ChildrenStance::HaveKids));
        assert!(kids_compatible(ChildrenStance::HaveKids, ChildrenStance::Someday));
        assert!(!kids_compatible(ChildrenStance::Someday, ChildrenStance::DontWant));
    }

    #[test]
    fn test_response_latency_bands() {
        let bands = ResponseBands::default();
        // 30 minutes -> excellent
        assert_eq!(response_latency_score(Some(0.5), &bands), 1.0);
        // 10 days -> low
        assert_eq!(response_latency_score(Some(240.0), &bands), 0.3);
        // Unknown or zero -> neutral
        assert_eq!(response_latency_score(None, &bands), 0.5);
        assert_eq!(response_latency_score(Some(0.0), &bands), 0.5);
        // Beyond a month -> very low
        assert_eq!(response_latency_score(Some(1000.0), &bands), 0.1);
    }

    #[test]
    fn test_recency_tiers() {
        let now = Utc::now();
        assert_eq!(recency_score(Some(now - Duration::minutes(20)), now), 1.0);
        assert_eq!(recency_score(Some(now - Duration::hours(10)), now), 0.9);
        assert_eq!(recency_score(Some(now - Duration::days(40)), now), 0.1);
        assert_eq!(recency_score(None, now), 0.1);
    }

    #[test]
    fn test_completeness_scaling() {
        assert_eq!(completeness_score(0), 0.0);
        assert_eq!(completeness_score(80), 0.8);
        assert_eq!(completeness_score(200), 1.0);
    }
}
