use chrono::NaiveDate;

use crate::core::distance::distance_between;
use crate::models::{Dealbreakers, UserProfile};

/// Mutual gender check: the seeker must be interested in the candidate's
/// gender AND the candidate must be interested in the seeker's. Missing
/// gender or an empty interest set on either side fails the check.
#[inline]
pub fn mutual_gender_ok(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    let (Some(seeker_gender), Some(candidate_gender)) = (seeker.gender, candidate.gender) else {
        return false;
    };
    seeker.interested_in.contains(&candidate_gender)
        && candidate.interested_in.contains(&seeker_gender)
}

/// Mutual age check: each party's age must fall inside the other's preferred
/// range. An unknown age on either side fails the check.
#[inline]
pub fn mutual_age_ok(seeker: &UserProfile, candidate: &UserProfile, today: NaiveDate) -> bool {
    let (Some(seeker_age), Some(candidate_age)) = (seeker.age_on(today), candidate.age_on(today))
    else {
        return false;
    };
    candidate_age >= seeker.min_age
        && candidate_age <= seeker.max_age
        && seeker_age >= candidate.min_age
        && seeker_age <= candidate.max_age
}

/// Distance check. Skipped (treated as pass) when either party has no
/// coordinates: incomplete profiles are not punished, and unknown data is
/// not filtered on.
#[inline]
pub fn within_distance(seeker: &UserProfile, candidate: &UserProfile) -> bool {
    match distance_between(seeker.coordinates, candidate.coordinates) {
        None => true,
        Some(d) => d <= seeker.max_distance_km as f64,
    }
}

/// A set-valued dealbreaker: pass when disengaged, otherwise the candidate
/// value must be present and acceptable.
#[inline]
fn set_rule_ok<T: PartialEq + Copy>(accepted: &Option<Vec<T>>, value: Option<T>) -> bool {
    match accepted {
        None => true,
        Some(accepted) => match value {
            Some(v) => accepted.contains(&v),
            None => false,
        },
    }
}

/// Evaluate the seeker's dealbreaker rules against a candidate.
///
/// One-directional: only the seeker's rules are consulted. Each engaged
/// sub-rule must pass independently, and a candidate missing the relevant
/// field fails any rule engaged on that dimension.
pub fn passes_dealbreakers(
    rules: &Dealbreakers,
    seeker: &UserProfile,
    candidate: &UserProfile,
    today: NaiveDate,
) -> bool {
    if !set_rule_ok(&rules.smoking, candidate.lifestyle.smoking) {
        return false;
    }
    if !set_rule_ok(&rules.drinking, candidate.lifestyle.drinking) {
        return false;
    }
    if !set_rule_ok(&rules.children, candidate.lifestyle.children) {
        return false;
    }
    if !set_rule_ok(&rules.looking_for, candidate.lifestyle.relationship_goal) {
        return false;
    }
    if !set_rule_ok(&rules.education, candidate.education) {
        return false;
    }

    if rules.min_height_cm.is_some() || rules.max_height_cm.is_some() {
        let Some(height) = candidate.height_cm else {
            return false;
        };
        if let Some(min) = rules.min_height_cm {
            if height < min {
                return false;
            }
        }
        if let Some(max) = rules.max_height_cm {
            if height > max {
                return false;
            }
        }
    }

    if let Some(max_gap) = rules.max_age_gap_years {
        let (Some(seeker_age), Some(candidate_age)) =
            (seeker.age_on(today), candidate.age_on(today))
        else {
            return false;
        };
        if seeker_age.abs_diff(candidate_age) > max_gap {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AccountStatus, ChildrenStance, Coordinates, Education, Gender, Habit, Lifestyle,
    };

    fn profile(id: &str, gender: Gender, interested: Vec<Gender>, birth_year: i32) -> UserProfile {
        UserProfile {
            user_id: id.to_string(),
            name: format!("User {}", id),
            birth_date: NaiveDate::from_ymd_opt(birth_year, 6, 15),
            gender: Some(gender),
            interested_in: interested,
            coordinates: Some(Coordinates {
                latitude: 40.7128,
                longitude: -74.0060,
            }),
            min_age: 21,
            max_age: 40,
            max_distance_km: 50,
            interests: vec![],
            lifestyle: Lifestyle::default(),
            pace: None,
            dealbreakers: Dealbreakers::default(),
            height_cm: Some(170),
            education: Some(Education::Undergraduate),
            status: AccountStatus::Active,
            profile_strength: 50,
            last_active_at: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_mutual_gender_requires_both_directions() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let liked_back = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        let not_interested = profile("c2", Gender::Man, vec![Gender::Man], 1994);

        assert!(mutual_gender_ok(&seeker, &liked_back));
        assert!(!mutual_gender_ok(&seeker, &not_interested));
    }

    #[test]
    fn test_missing_gender_fails_mutual_check() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut unknown = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        unknown.gender = None;

        assert!(!mutual_gender_ok(&seeker, &unknown));
    }

    #[test]
    fn test_empty_interest_set_fails_mutual_check() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut indifferent = profile("c", Gender::Man, vec![], 1994);
        indifferent.interested_in = vec![];

        assert!(!mutual_gender_ok(&seeker, &indifferent));
    }

    #[test]
    fn test_mutual_age_both_ranges() {
        let mut seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995); // 30
        let mut candidate = profile("c", Gender::Man, vec![Gender::Woman], 1990); // 35

        assert!(mutual_age_ok(&seeker, &candidate, today()));

        // Candidate narrows their range to exclude the seeker
        candidate.min_age = 33;
        assert!(!mutual_age_ok(&seeker, &candidate, today()));

        candidate.min_age = 21;
        seeker.max_age = 32;
        assert!(!mutual_age_ok(&seeker, &candidate, today()));
    }

    #[test]
    fn test_unknown_age_fails_mutual_check() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut candidate = profile("c", Gender::Man, vec![Gender::Woman], 1990);
        candidate.birth_date = None;

        assert!(!mutual_age_ok(&seeker, &candidate, today()));
    }

    #[test]
    fn test_distance_skipped_when_location_unknown() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut far = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        far.coordinates = Some(Coordinates {
            latitude: 48.8566,
            longitude: 2.3522,
        });

        assert!(!within_distance(&seeker, &far));

        far.coordinates = None;
        assert!(within_distance(&seeker, &far));
    }

    #[test]
    fn test_dealbreaker_disengaged_rules_pass() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let candidate = profile("c", Gender::Man, vec![Gender::Woman], 1994);

        assert!(passes_dealbreakers(
            &Dealbreakers::default(),
            &seeker,
            &candidate,
            today()
        ));
    }

    #[test]
    fn test_dealbreaker_missing_field_fails_engaged_rule() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let candidate = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        // Candidate has not filled in smoking
        let rules = Dealbreakers {
            smoking: Some(vec![Habit::Never]),
            ..Dealbreakers::default()
        };

        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));
    }

    #[test]
    fn test_dealbreaker_set_rule() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut candidate = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        candidate.lifestyle.smoking = Some(Habit::Often);

        let rules = Dealbreakers {
            smoking: Some(vec![Habit::Never, Habit::Sometimes]),
            ..Dealbreakers::default()
        };
        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));

        candidate.lifestyle.smoking = Some(Habit::Sometimes);
        assert!(passes_dealbreakers(&rules, &seeker, &candidate, today()));
    }

    #[test]
    fn test_dealbreaker_height_bounds() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut candidate = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        candidate.height_cm = Some(165);

        let rules = Dealbreakers {
            min_height_cm: Some(170),
            ..Dealbreakers::default()
        };
        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));

        candidate.height_cm = Some(180);
        assert!(passes_dealbreakers(&rules, &seeker, &candidate, today()));

        candidate.height_cm = None;
        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));
    }

    #[test]
    fn test_dealbreaker_age_gap() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995); // 30
        let candidate = profile("c", Gender::Man, vec![Gender::Woman], 1985); // 41... outside
        let rules = Dealbreakers {
            max_age_gap_years: Some(8),
            ..Dealbreakers::default()
        };

        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));

        let close = profile("c2", Gender::Man, vec![Gender::Woman], 1992); // 33
        assert!(passes_dealbreakers(&rules, &seeker, &close, today()));
    }

    #[test]
    fn test_dealbreaker_children_stance() {
        let seeker = profile("s", Gender::Woman, vec![Gender::Man], 1995);
        let mut candidate = profile("c", Gender::Man, vec![Gender::Woman], 1994);
        candidate.lifestyle.children = Some(ChildrenStance::DontWant);

        let rules = Dealbreakers {
            children: Some(vec![ChildrenStance::Someday, ChildrenStance::Open]),
            ..Dealbreakers::default()
        };
        assert!(!passes_dealbreakers(&rules, &seeker, &candidate, today()));

        candidate.lifestyle.children = Some(ChildrenStance::Someday);
        assert!(passes_dealbreakers(&rules, &seeker, &candidate, today()));
    }
}
