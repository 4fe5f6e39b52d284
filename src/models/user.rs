use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position. Profiles without one are treated as "location unset",
/// never as coordinates (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Woman,
    Man,
    Nonbinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Woman => "woman",
            Gender::Man => "man",
            Gender::Nonbinary => "nonbinary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    Banned,
}

/// Smoking/drinking frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Habit {
    Never,
    Sometimes,
    Often,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildrenStance {
    Someday,
    DontWant,
    HaveKids,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipGoal {
    Casual,
    LongTerm,
    Marriage,
    Unsure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    HighSchool,
    Undergraduate,
    Postgraduate,
    Doctorate,
}

/// Lifestyle attributes. Every dimension is optional; compatibility scoring
/// only considers dimensions both sides have filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifestyle {
    #[serde(default)]
    pub smoking: Option<Habit>,
    #[serde(default)]
    pub drinking: Option<Habit>,
    #[serde(default)]
    pub children: Option<ChildrenStance>,
    #[serde(rename = "relationshipGoal", default)]
    pub relationship_goal: Option<RelationshipGoal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagingCadence {
    Constant,
    Daily,
    FewTimesAWeek,
    Weekly,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstDateTiming {
    WithinDays,
    WithinWeeks,
    WithinAMonth,
    SlowBurn,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Texting,
    VoiceCalls,
    VideoCalls,
    InPerson,
    NoPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationDepth {
    Light,
    Balanced,
    Deep,
    NoPreference,
}

impl MessagingCadence {
    /// Position on the cadence scale; `None` means no preference (wildcard).
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            MessagingCadence::Constant => Some(0),
            MessagingCadence::Daily => Some(1),
            MessagingCadence::FewTimesAWeek => Some(2),
            MessagingCadence::Weekly => Some(3),
            MessagingCadence::NoPreference => None,
        }
    }
}

impl FirstDateTiming {
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            FirstDateTiming::WithinDays => Some(0),
            FirstDateTiming::WithinWeeks => Some(1),
            FirstDateTiming::WithinAMonth => Some(2),
            FirstDateTiming::SlowBurn => Some(3),
            FirstDateTiming::NoPreference => None,
        }
    }
}

impl CommunicationStyle {
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            CommunicationStyle::Texting => Some(0),
            CommunicationStyle::VoiceCalls => Some(1),
            CommunicationStyle::VideoCalls => Some(2),
            CommunicationStyle::InPerson => Some(3),
            CommunicationStyle::NoPreference => None,
        }
    }
}

impl ConversationDepth {
    pub fn ordinal(&self) -> Option<u8> {
        match self {
            ConversationDepth::Light => Some(0),
            ConversationDepth::Balanced => Some(1),
            ConversationDepth::Deep => Some(2),
            ConversationDepth::NoPreference => None,
        }
    }
}

/// Communication pace preferences, compared ordinally between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacePreferences {
    pub messaging: MessagingCadence,
    #[serde(rename = "firstDate")]
    pub first_date: FirstDateTiming,
    pub style: CommunicationStyle,
    pub depth: ConversationDepth,
}

/// Hard one-directional exclusion rules a seeker applies to candidates.
///
/// A rule is engaged when its field is `Some`; an engaged rule fails any
/// candidate missing the relevant profile field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dealbreakers {
    #[serde(default)]
    pub smoking: Option<Vec<Habit>>,
    #[serde(default)]
    pub drinking: Option<Vec<Habit>>,
    #[serde(default)]
    pub children: Option<Vec<ChildrenStance>>,
    #[serde(rename = "lookingFor", default)]
    pub looking_for: Option<Vec<RelationshipGoal>>,
    #[serde(default)]
    pub education: Option<Vec<Education>>,
    #[serde(rename = "minHeightCm", default)]
    pub min_height_cm: Option<u16>,
    #[serde(rename = "maxHeightCm", default)]
    pub max_height_cm: Option<u16>,
    #[serde(rename = "maxAgeGapYears", default)]
    pub max_age_gap_years: Option<u8>,
}

impl Dealbreakers {
    pub fn is_empty(&self) -> bool {
        self.smoking.is_none()
            && self.drinking.is_none()
            && self.children.is_none()
            && self.looking_for.is_none()
            && self.education.is_none()
            && self.min_height_cm.is_none()
            && self.max_height_cm.is_none()
            && self.max_age_gap_years.is_none()
    }
}

/// User profile with demographics, preferences and matching data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(rename = "birthDate", default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(rename = "interestedIn", default)]
    pub interested_in: Vec<Gender>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "minAge")]
    pub min_age: u8,
    #[serde(rename = "maxAge")]
    pub max_age: u8,
    #[serde(rename = "maxDistanceKm")]
    pub max_distance_km: u16,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default)]
    pub pace: Option<PacePreferences>,
    #[serde(default)]
    pub dealbreakers: Dealbreakers,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<u16>,
    #[serde(default)]
    pub education: Option<Education>,
    #[serde(default = "default_status")]
    pub status: AccountStatus,
    #[serde(rename = "profileStrength", default)]
    pub profile_strength: u8,
    #[serde(rename = "lastActiveAt", default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

fn default_status() -> AccountStatus {
    AccountStatus::Active
}

impl UserProfile {
    /// Age in whole years on the given day. Unknown birth dates and
    /// implausible zero ages both report as unknown.
    pub fn age_on(&self, today: NaiveDate) -> Option<u8> {
        let birth = self.birth_date?;
        let years = today.years_since(birth)?;
        if years == 0 || years > u8::MAX as u32 {
            return None;
        }
        Some(years as u8)
    }

    pub fn age(&self) -> Option<u8> {
        self.age_on(Utc::now().date_naive())
    }

    /// Width of the preferred age range in years.
    pub fn age_range_width(&self) -> u8 {
        self.max_age.saturating_sub(self.min_age)
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_born(date: Option<NaiveDate>) -> UserProfile {
        UserProfile {
            user_id: "u1".to_string(),
            name: "Test".to_string(),
            birth_date: date,
            gender: Some(Gender::Woman),
            interested_in: vec![Gender::Man],
            coordinates: None,
            min_age: 21,
            max_age: 35,
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

    #[test]
    fn test_age_from_birth_date() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let profile = profile_born(NaiveDate::from_ymd_opt(1998, 3, 14));
        assert_eq!(profile.age_on(today), Some(28));
    }

    #[test]
    fn test_age_unknown_without_birth_date() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(profile_born(None).age_on(today), None);
    }

    #[test]
    fn test_zero_age_is_unknown() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let profile = profile_born(NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(profile.age_on(today), None);
    }

    #[test]
    fn test_dealbreakers_default_is_empty() {
        assert!(Dealbreakers::default().is_empty());
        let engaged = Dealbreakers {
            smoking: Some(vec![Habit::Never]),
            ..Dealbreakers::default()
        };
        assert!(!engaged.is_empty());
    }

    #[test]
    fn test_pace_wildcard_has_no_ordinal() {
        assert_eq!(MessagingCadence::NoPreference.ordinal(), None);
        assert_eq!(MessagingCadence::Daily.ordinal(), Some(1));
        assert!(ConversationDepth::Deep.ordinal() > ConversationDepth::Light.ordinal());
    }
}
