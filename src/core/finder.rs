use std::collections::HashSet;

use chrono::NaiveDate;

use crate::core::distance::distance_between;
use crate::core::filters::{mutual_age_ok, mutual_gender_ok, passes_dealbreakers, within_distance};
use crate::models::UserProfile;

/// A candidate that survived the filter pipeline
#[derive(Debug, Clone)]
pub struct Candidate {
    pub profile: UserProfile,
    /// Unknown when either party has no coordinates
    pub distance_km: Option<f64>,
}

/// Candidate discovery - the multi-stage filtering pipeline
///
/// # Pipeline stages (each a hard exclusion, applied in order)
/// 1. Exclude self
/// 2. Exclude non-active accounts
/// 3. Exclude the caller-supplied set (already swiped, blocked either way)
/// 4. Mutual gender check
/// 5. Mutual age check
/// 6. Distance check (skipped when location is unknown on either side)
/// 7. Seeker's dealbreakers
///
/// The final step sorts by ascending distance, unknown distance last.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFinder;

impl CandidateFinder {
    pub fn new() -> Self {
        Self
    }

    pub fn find_candidates(
        &self,
        seeker: &UserProfile,
        pool: Vec<UserProfile>,
        excluded: &HashSet<String>,
        today: NaiveDate,
    ) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = pool
            .into_iter()
            .filter(|p| p.user_id != seeker.user_id)
            .filter(|p| p.is_active())
            .filter(|p| !excluded.contains(&p.user_id))
            .filter(|p| mutual_gender_ok(seeker, p))
            .filter(|p| mutual_age_ok(seeker, p, today))
            .filter(|p| within_distance(seeker, p))
            .filter(|p| passes_dealbreakers(&seeker.dealbreakers, seeker, p, today))
            .map(|profile| {
                let distance_km = distance_between(seeker.coordinates, profile.coordinates);
                Candidate {
                    profile,
                    distance_km,
                }
            })
            .collect();

        // Unknown distance sorts as maximal
        candidates.sort_by(|a, b| {
            let da = a.distance_km.unwrap_or(f64::INFINITY);
            let db = b.distance_km.unwrap_or(f64::INFINITY);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountStatus, Coordinates, Dealbreakers, Gender, Lifestyle};

    fn profile(id: &str, gender: Gender, birth_year: i32, lat_offset: f64) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            birth_date: NaiveDate::from_ymd_opt(birth_year, 1, 10),
            gender: Some(gender),
            interested_in: vec![Gender::Woman, Gender::Man],
            coordinates: Some(Coordinates {
                latitude: 40.7128 + lat_offset,
                longitude: -74.0060,
            }),
            min_age: 21,
            max_age: 45,
            max_distance_km: 50,
            interests: vec![],
            lifestyle: Lifestyle::default(),
            pace: None,
            dealbreakers: Dealbreakers::default(),
            height_cm: Some(170),
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
    fn test_excludes_self_and_excluded_set() {
        let finder = CandidateFinder::new();
        let seeker = profile("seeker", Gender::Woman, 1995, 0.0);
        let pool = vec![
            profile("seeker", Gender::Woman, 1995, 0.0),
            profile("swiped", Gender::Man, 1994, 0.01),
            profile("fresh", Gender::Man, 1994, 0.01),
        ];
        let excluded: HashSet<String> = ["swiped".to_string()].into();

        let result = finder.find_candidates(&seeker, pool, &excluded, today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].profile.user_id, "fresh");
    }

    #[test]
    fn test_excludes_inactive_accounts() {
        let finder = CandidateFinder::new();
        let seeker = profile("seeker", Gender::Woman, 1995, 0.0);
        let mut inactive = profile("inactive", Gender::Man, 1994, 0.01);
        inactive.status = AccountStatus::Inactive;
        let mut banned = profile("banned", Gender::Man, 1994, 0.01);
        banned.status = AccountStatus::Banned;

        let result =
            finder.find_candidates(&seeker, vec![inactive, banned], &HashSet::new(), today());

        assert!(result.is_empty());
    }

    #[test]
    fn test_mutual_gender_enforced() {
        let finder = CandidateFinder::new();
        let mut seeker = profile("seeker", Gender::Woman, 1995, 0.0);
        seeker.interested_in = vec![Gender::Man];

        let mut one_way = profile("one_way", Gender::Man, 1994, 0.01);
        one_way.interested_in = vec![Gender::Nonbinary];
        let mutual = profile("mutual", Gender::Man, 1994, 0.01);

        let result =
            finder.find_candidates(&seeker, vec![one_way, mutual], &HashSet::new(), today());

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].profile.user_id, "mutual");
    }

    #[test]
    fn test_sorted_by_distance_unknown_last() {
        let finder = CandidateFinder::new();
        let seeker = profile("seeker", Gender::Woman, 1995, 0.0);

        let far = profile("far", Gender::Man, 1994, 0.3);
        let near = profile("near", Gender::Man, 1994, 0.01);
        let mut unknown = profile("unknown", Gender::Man, 1994, 0.0);
        unknown.coordinates = None;

        let result =
            finder.find_candidates(&seeker, vec![far, unknown, near], &HashSet::new(), today());

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].profile.user_id, "near");
        assert_eq!(result[1].profile.user_id, "far");
        assert_eq!(result[2].profile.user_id, "unknown");
        assert!(result[2].distance_km.is_none());
    }

    #[test]
    fn test_distance_cutoff_applies_when_both_located() {
        let finder = CandidateFinder::new();
        let seeker = profile("seeker", Gender::Woman, 1995, 0.0);
        // ~0.9 degrees latitude is ~100km, past the 50km preference
        let too_far = profile("too_far", Gender::Man, 1994, 0.9);

        let result = finder.find_candidates(&seeker, vec![too_far], &HashSet::new(), today());

        assert!(result.is_empty());
    }
}
