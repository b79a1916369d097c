//! Static configuration loading and load-time validation.
//!
//! The dashboard is configured once from a TOML file and never re-reads it.
//! Secrets can be left out of the file and supplied through environment
//! variables instead, so the file can be committed without credentials.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Deserialize;

use crate::model::{CollectionRule, HolidayException, weekday_from_sunday_index};

/// Environment variable overriding `[weather].api_key`.
pub const OPENWEATHER_KEY_VAR: &str = "MIRRA_OPENWEATHER_API_KEY";
/// Environment variable overriding `[arrivals].app_id`.
pub const TFL_APP_ID_VAR: &str = "MIRRA_TFL_APP_ID";
/// Environment variable overriding `[arrivals].app_key`.
pub const TFL_APP_KEY_VAR: &str = "MIRRA_TFL_APP_KEY";
/// Environment variable overriding `[air_quality].api_token`.
pub const WAQI_TOKEN_VAR: &str = "MIRRA_WAQI_API_TOKEN";

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading or validating the configuration.
pub enum ConfigError {
    /// The file is not valid TOML or a date field failed to parse.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A collection weekday index is outside 0–6.
    #[error("Collection '{name}': day_of_week {day_of_week} is out of range (0 = Sunday … 6 = Saturday)")]
    DayOfWeekOutOfRange {
        /// Offending rule name.
        name: String,
        /// Configured index.
        day_of_week: u8,
    },
    /// A biweekly phase offset is outside 0–1.
    #[error("Collection '{name}': week_offset {week_offset} must be 0 or 1")]
    WeekOffsetOutOfRange {
        /// Offending rule name.
        name: String,
        /// Configured offset.
        week_offset: u8,
    },
    /// The anchor date does not fall on the configured weekday.
    #[error("Collection '{name}': reference date {reference_date} falls on a {actual}, not the configured weekday")]
    ReferenceWeekdayMismatch {
        /// Offending rule name.
        name: String,
        /// Configured anchor date.
        reference_date: NaiveDate,
        /// Weekday the anchor actually falls on.
        actual: Weekday,
    },
    /// Two collection rules share a name.
    #[error("Duplicate collection name '{0}'")]
    DuplicateCollectionName(String),
    /// Two holiday exceptions cover the same original date.
    #[error("Duplicate holiday exception for {0}")]
    DuplicateException(NaiveDate),
    /// The cutoff hour is outside 0–23.
    #[error("Cutoff hour {0} is out of range (0-23)")]
    CutoffHourOutOfRange(u32),
}

#[derive(Debug, Clone, Deserialize)]
/// Top-level dashboard configuration.
pub struct MirraConfig {
    /// Seconds between refresh ticks.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
    /// Bin-collection schedule.
    #[serde(default)]
    pub bins: BinsConfig,
    /// Weather widget, absent to disable.
    #[serde(default)]
    pub weather: Option<WeatherConfig>,
    /// Transit arrivals widget, absent to disable.
    #[serde(default)]
    pub arrivals: Option<ArrivalsConfig>,
    /// Air quality widget, absent to disable.
    #[serde(default)]
    pub air_quality: Option<AirQualityConfig>,
}

#[derive(Debug, Clone, Deserialize)]
/// Bin-collection rules, holiday table, and the same-day cutoff.
pub struct BinsConfig {
    /// Local hour after which today's pending collection counts as missed.
    #[serde(default = "default_cutoff_hour")]
    pub cutoff_hour: u32,
    /// Recurring collection streams.
    #[serde(default)]
    pub collections: Vec<CollectionRule>,
    /// One-off date substitutions published by the council.
    #[serde(default)]
    pub holiday_exceptions: Vec<HolidayException>,
}

impl Default for BinsConfig {
    fn default() -> Self {
        Self {
            cutoff_hour: default_cutoff_hour(),
            collections: Vec::new(),
            holiday_exceptions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
/// Location and credentials for the weather provider.
pub struct WeatherConfig {
    /// Latitude of the display location.
    pub latitude: f64,
    /// Longitude of the display location.
    pub longitude: f64,
    /// OpenWeatherMap API key; falls back to [`OPENWEATHER_KEY_VAR`].
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// Stop and credentials for the transit arrivals provider.
pub struct ArrivalsConfig {
    /// NaPTAN id of the stop to watch.
    pub naptan_id: String,
    /// Friendly stop name shown instead of the upstream one.
    #[serde(default)]
    pub stop_name: Option<String>,
    /// Maximum arrivals to keep.
    #[serde(default = "default_arrival_limit")]
    pub limit: usize,
    /// TfL application id; falls back to [`TFL_APP_ID_VAR`].
    #[serde(default)]
    pub app_id: Option<String>,
    /// TfL application key; falls back to [`TFL_APP_KEY_VAR`].
    #[serde(default)]
    pub app_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// City and credentials for the air-quality provider.
pub struct AirQualityConfig {
    /// WAQI city feed to query.
    pub city: String,
    /// WAQI API token; falls back to [`WAQI_TOKEN_VAR`].
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_cutoff_hour() -> u32 {
    7
}

fn default_arrival_limit() -> usize {
    5
}

impl MirraConfig {
    /// Parse a TOML document, fill secrets from the environment, and validate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the document fails to parse or violates
    /// a schedule invariant.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: MirraConfig = toml::from_str(raw)?;
        config.fill_secrets_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Check the schedule invariants the resolver relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bins.cutoff_hour > 23 {
            return Err(ConfigError::CutoffHourOutOfRange(self.bins.cutoff_hour));
        }

        let mut names = HashSet::new();
        for rule in &self.bins.collections {
            if !names.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateCollectionName(rule.name.clone()));
            }

            let Some(weekday) = weekday_from_sunday_index(rule.day_of_week) else {
                return Err(ConfigError::DayOfWeekOutOfRange {
                    name: rule.name.clone(),
                    day_of_week: rule.day_of_week,
                });
            };

            if rule.week_offset > 1 {
                return Err(ConfigError::WeekOffsetOutOfRange {
                    name: rule.name.clone(),
                    week_offset: rule.week_offset,
                });
            }

            // A mismatched anchor would silently produce the wrong biweekly
            // phase, so it is rejected here rather than tolerated per tick.
            if rule.reference_date.weekday() != weekday {
                return Err(ConfigError::ReferenceWeekdayMismatch {
                    name: rule.name.clone(),
                    reference_date: rule.reference_date,
                    actual: rule.reference_date.weekday(),
                });
            }
        }

        let mut originals = HashSet::new();
        for exception in &self.bins.holiday_exceptions {
            if !originals.insert(exception.original_date) {
                return Err(ConfigError::DuplicateException(exception.original_date));
            }
        }

        Ok(())
    }

    fn fill_secrets_from_env(&mut self) {
        if let Some(weather) = &mut self.weather
            && weather.api_key.is_none()
        {
            weather.api_key = env_secret(OPENWEATHER_KEY_VAR);
        }

        if let Some(arrivals) = &mut self.arrivals {
            if arrivals.app_id.is_none() {
                arrivals.app_id = env_secret(TFL_APP_ID_VAR);
            }
            if arrivals.app_key.is_none() {
                arrivals.app_key = env_secret(TFL_APP_KEY_VAR);
            }
        }

        if let Some(air_quality) = &mut self.air_quality
            && air_quality.api_token.is_none()
        {
            air_quality.api_token = env_secret(WAQI_TOKEN_VAR);
        }
    }
}

fn env_secret(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{ConfigError, MirraConfig};

    const MINIMAL: &str = r##"
        [bins]
        [[bins.collections]]
        name = "General waste"
        day_of_week = 3
        frequency = "weekly"
        reference_date = "2025-05-07"
        accent = "#9ca3af"

        [[bins.collections]]
        name = "Recycling"
        day_of_week = 3
        frequency = "biweekly"
        week_offset = 1
        reference_date = "2025-05-14"

        [[bins.holiday_exceptions]]
        original_date = "2025-12-25"
        revised_date = "2025-12-27"
    "##;

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config = MirraConfig::from_toml_str(MINIMAL).expect("valid config");
        assert_eq!(config.refresh_interval_seconds, 60);
        assert_eq!(config.bins.cutoff_hour, 7);
        assert_eq!(config.bins.collections.len(), 2);
        let first = config.bins.collections.first().expect("first rule");
        assert_eq!(
            first.reference_date,
            NaiveDate::from_ymd_opt(2025, 5, 7).expect("valid date")
        );
        assert!(config.weather.is_none());
    }

    #[test]
    fn malformed_reference_date_is_a_parse_error() {
        let raw = MINIMAL.replace("2025-05-07", "2025-13-40");
        let err = MirraConfig::from_toml_str(&raw).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn anchor_weekday_mismatch_is_rejected() {
        // 2025-05-08 is a Thursday but day_of_week 3 means Wednesday.
        let raw = MINIMAL.replace("2025-05-07", "2025-05-08");
        let err = MirraConfig::from_toml_str(&raw).expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::ReferenceWeekdayMismatch { .. }
        ));
    }

    #[test]
    fn duplicate_exception_dates_are_rejected() {
        let raw = format!(
            "{MINIMAL}\n[[bins.holiday_exceptions]]\noriginal_date = \"2025-12-25\"\nrevised_date = \"2025-12-29\"\n"
        );
        let err = MirraConfig::from_toml_str(&raw).expect_err("must fail");
        assert!(matches!(err, ConfigError::DuplicateException(_)));
    }

    #[test]
    fn duplicate_rule_names_are_rejected() {
        let raw = MINIMAL.replace("Recycling", "General waste");
        let err = MirraConfig::from_toml_str(&raw).expect_err("must fail");
        assert!(matches!(err, ConfigError::DuplicateCollectionName(_)));
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let raw = MINIMAL.replace("day_of_week = 3", "day_of_week = 7");
        assert!(matches!(
            MirraConfig::from_toml_str(&raw).expect_err("must fail"),
            ConfigError::DayOfWeekOutOfRange { .. }
        ));

        let raw = MINIMAL.replace("week_offset = 1", "week_offset = 2");
        assert!(matches!(
            MirraConfig::from_toml_str(&raw).expect_err("must fail"),
            ConfigError::WeekOffsetOutOfRange { .. }
        ));

        let raw = "[bins]\ncutoff_hour = 24\n";
        assert!(matches!(
            MirraConfig::from_toml_str(raw).expect_err("must fail"),
            ConfigError::CutoffHourOutOfRange(24)
        ));
    }
}
