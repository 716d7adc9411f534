use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use plantcare_schedule::{UrgencyThresholds, WeekStart};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    /// IANA name of the timezone whose calendar day counts as "today"
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// How far ahead "due soon" looks, in days
    #[serde(default = "default_due_soon_days")]
    pub due_soon_days: u32,
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default)]
    pub urgency: UrgencyThresholds,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            due_soon_days: default_due_soon_days(),
            week_start: WeekStart::default(),
            urgency: UrgencyThresholds::default(),
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_due_soon_days() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Month views kept before the least recently used one is dropped
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    12
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PLANTCARE__SCHEDULE__TIMEZONE, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("schedule.timezone", default_timezone())?
            .set_default("schedule.due_soon_days", u64::from(default_due_soon_days()))?
            .set_default("schedule.week_start", "monday")?
            .set_default("cache.capacity", default_cache_capacity() as u64)?
            .set_default("observability.log_level", default_log_level())?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // The file is optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PLANTCARE")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.cache.capacity == 0 {
            return Err("Cache capacity must be at least 1".to_string());
        }
        if self.schedule.timezone != "UTC" {
            plantcare_shared::date::check_timezone(&self.schedule.timezone)
                .map_err(|e| e.to_string())?;
        }
        self.schedule
            .urgency
            .validate()
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
