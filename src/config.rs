use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::scoring::{QualityWeights, ResponseBands, StandoutWeights};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_limit")]
    pub default_limit: u16,
    #[serde(default = "default_max_limit")]
    pub max_limit: u16,
    #[serde(default = "default_prefilter_limit")]
    pub prefilter_limit: usize,
    #[serde(default = "default_daily_like_limit")]
    pub daily_like_limit: u32,
    #[serde(default = "default_session_swipe_cap")]
    pub session_swipe_cap: u32,
    #[serde(default = "default_standout_count")]
    pub standout_count: usize,
    #[serde(default = "default_diversity_window_days")]
    pub diversity_window_days: u16,
    #[serde(default = "default_auto_ban_threshold")]
    pub auto_ban_report_threshold: u32,
    #[serde(default = "default_lock_stripes")]
    pub lock_stripes: usize,
}

fn default_limit() -> u16 {
    20
}
fn default_max_limit() -> u16 {
    100
}
fn default_prefilter_limit() -> usize {
    500
}
fn default_daily_like_limit() -> u32 {
    100
}
fn default_session_swipe_cap() -> u32 {
    500
}
fn default_standout_count() -> usize {
    10
}
fn default_diversity_window_days() -> u16 {
    7
}
fn default_auto_ban_threshold() -> u32 {
    5
}
fn default_lock_stripes() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_similar_age_years")]
    pub similar_age_years: u8,
    #[serde(default)]
    pub quality_weights: QualityWeightsConfig,
    #[serde(default)]
    pub standout_weights: StandoutWeightsConfig,
    #[serde(default)]
    pub response_bands: ResponseBandsConfig,
}

fn default_similar_age_years() -> u8 {
    3
}

/// Weights for the relationship quality score. The two weight tables diverge
/// deliberately; both are configuration data, not code.
#[derive(Debug, Clone, Deserialize)]
pub struct QualityWeightsConfig {
    #[serde(default = "default_q_distance")]
    pub distance: f64,
    #[serde(default = "default_q_age")]
    pub age: f64,
    #[serde(default = "default_q_interests")]
    pub interests: f64,
    #[serde(default = "default_q_lifestyle")]
    pub lifestyle: f64,
    #[serde(default = "default_q_pace")]
    pub pace: f64,
    #[serde(default = "default_q_response")]
    pub response: f64,
}

impl Default for QualityWeightsConfig {
    fn default() -> Self {
        Self {
            distance: default_q_distance(),
            age: default_q_age(),
            interests: default_q_interests(),
            lifestyle: default_q_lifestyle(),
            pace: default_q_pace(),
            response: default_q_response(),
        }
    }
}

fn default_q_distance() -> f64 {
    0.20
}
fn default_q_age() -> f64 {
    0.15
}
fn default_q_interests() -> f64 {
    0.25
}
fn default_q_lifestyle() -> f64 {
    0.15
}
fn default_q_pace() -> f64 {
    0.15
}
fn default_q_response() -> f64 {
    0.10
}

impl From<QualityWeightsConfig> for QualityWeights {
    fn from(c: QualityWeightsConfig) -> Self {
        Self {
            distance: c.distance,
            age: c.age,
            interests: c.interests,
            lifestyle: c.lifestyle,
            pace: c.pace,
            response: c.response,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandoutWeightsConfig {
    #[serde(default = "default_s_distance")]
    pub distance: f64,
    #[serde(default = "default_s_age")]
    pub age: f64,
    #[serde(default = "default_s_interests")]
    pub interests: f64,
    #[serde(default = "default_s_lifestyle")]
    pub lifestyle: f64,
    #[serde(default = "default_s_completeness")]
    pub completeness: f64,
    #[serde(default = "default_s_recency")]
    pub recency: f64,
}

impl Default for StandoutWeightsConfig {
    fn default() -> Self {
        Self {
            distance: default_s_distance(),
            age: default_s_age(),
            interests: default_s_interests(),
            lifestyle: default_s_lifestyle(),
            completeness: default_s_completeness(),
            recency: default_s_recency(),
        }
    }
}

fn default_s_distance() -> f64 {
    0.20
}
fn default_s_age() -> f64 {
    0.15
}
fn default_s_interests() -> f64 {
    0.25
}
fn default_s_lifestyle() -> f64 {
    0.15
}
fn default_s_completeness() -> f64 {
    0.15
}
fn default_s_recency() -> f64 {
    0.10
}

impl From<StandoutWeightsConfig> for StandoutWeights {
    fn from(c: StandoutWeightsConfig) -> Self {
        Self {
            distance: c.distance,
            age: c.age,
            interests: c.interests,
            lifestyle: c.lifestyle,
            completeness: c.completeness,
            recency: c.recency,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBandsConfig {
    #[serde(default = "default_excellent_hours")]
    pub excellent_hours: f64,
    #[serde(default = "default_great_hours")]
    pub great_hours: f64,
    #[serde(default = "default_good_hours")]
    pub good_hours: f64,
    #[serde(default = "default_okay_hours")]
    pub okay_hours: f64,
    #[serde(default = "default_low_hours")]
    pub low_hours: f64,
}

impl Default for ResponseBandsConfig {
    fn default() -> Self {
        Self {
            excellent_hours: default_excellent_hours(),
            great_hours: default_great_hours(),
            good_hours: default_good_hours(),
            okay_hours: default_okay_hours(),
            low_hours: default_low_hours(),
        }
    }
}

fn default_excellent_hours() -> f64 {
    1.0
}
fn default_great_hours() -> f64 {
    24.0
}
fn default_good_hours() -> f64 {
    72.0
}
fn default_okay_hours() -> f64 {
    168.0
}
fn default_low_hours() -> f64 {
    720.0
}

impl From<ResponseBandsConfig> for ResponseBands {
    fn from(c: ResponseBandsConfig) -> Self {
        Self {
            excellent_hours: c.excellent_hours,
            great_hours: c.great_hours,
            good_hours: c.good_hours,
            okay_hours: c.okay_hours,
            low_hours: c.low_hours,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Loaded in order (later overrides earlier):
    /// 1. Default values in the structs
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with KINDRED_)
    ///
    /// The scoring weight tables are validated here, once, so scorers never
    /// re-check at scoring time.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("KINDRED")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // DATABASE_URL wins over file configuration when set
        let builder = match std::env::var("DATABASE_URL") {
            Ok(url) => builder.set_override("database.url", url)?,
            Err(_) => builder,
        };

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("KINDRED")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        QualityWeights::from(self.scoring.quality_weights.clone())
            .validate()
            .map_err(|e| ConfigError::Message(format!("quality weights: {}", e)))?;
        StandoutWeights::from(self.scoring.standout_weights.clone())
            .validate()
            .map_err(|e| ConfigError::Message(format!("standout weights: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quality_weights_sum_to_one() {
        let weights = QualityWeightsConfig::default();
        let sum = weights.distance
            + weights.age
            + weights.interests
            + weights.lifestyle
            + weights.pace
            + weights.response;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_standout_weights_sum_to_one() {
        let weights = StandoutWeightsConfig::default();
        let sum = weights.distance
            + weights.age
            + weights.interests
            + weights.lifestyle
            + weights.completeness
            + weights.recency;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weight_tables_are_independent_configurations() {
        // The two scorer instantiations keep distinct weight tables
        let quality = QualityWeightsConfig::default();
        let standout = StandoutWeightsConfig::default();
        assert_eq!(quality.distance, standout.distance);
        assert_eq!(quality.interests, standout.interests);
        // pace/response vs completeness/recency are different dimensions
        assert_eq!(quality.pace + quality.response, standout.completeness + standout.recency);
    }

    #[test]
    fn test_default_response_bands_ordered() {
        let bands = ResponseBandsConfig::default();
        assert!(bands.excellent_hours < bands.great_hours);
        assert!(bands.great_hours < bands.good_hours);
        assert!(bands.good_hours < bands.okay_hours);
        assert!(bands.okay_hours < bands.low_hours);
    }

    #[test]
    fn test_default_logging() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "json");
    }
}
