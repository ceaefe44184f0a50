//! Configuration management for Wayfarer services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use crate::errors::{AppError, Result};
use crate::query::{
    dates::ReferenceDate, gazetteer::DEFAULT_DESTINATIONS, preference::DEFAULT_PREFERENCES,
    ParserStrategy,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Parser configuration (gazetteer, vocabulary, defaults)
    #[serde(default)]
    pub parser: ParserSettings,

    /// Entity recognition backend
    #[serde(default)]
    pub entities: EntityConfig,

    /// Date search backend
    #[serde(default)]
    pub dates: DateConfig,

    /// Booking desk configuration
    #[serde(default)]
    pub booking: BookingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum queries accepted by the batch endpoint
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParserSettings {
    /// Which parser design to run
    #[serde(default)]
    pub strategy: ParserStrategy,

    /// Known destinations, in tie-break order
    #[serde(default = "default_gazetteer")]
    pub gazetteer: Vec<String>,

    /// Preference keywords, in scan order
    #[serde(default = "default_preferences")]
    pub preferences: Vec<String>,

    /// Preference used when no keyword is present
    #[serde(default = "default_preference")]
    pub default_preference: String,

    /// Trip length used to derive a missing return date
    #[serde(default = "default_trip_days")]
    pub default_trip_days: u32,

    /// Minimum similarity (0.0 - 1.0) for a gazetteer match
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Honour explicit lengths of stay ("for 5 days")
    #[serde(default = "default_infer_duration")]
    pub infer_duration: bool,

    /// Anchor for relative dates, `YYYY-MM-DD`; unset means today
    #[serde(default)]
    pub reference_date: Option<String>,
}

/// Entity recognition providers
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityProvider {
    #[default]
    Heuristic,
    Remote,
    Disabled,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityConfig {
    /// Provider: heuristic, remote, disabled
    #[serde(default)]
    pub provider: EntityProvider,

    /// NER service endpoint (remote provider only)
    pub endpoint: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_entity_timeout")]
    pub timeout_ms: u64,
}

/// Date search providers
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateProvider {
    #[default]
    Calendar,
    Disabled,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DateConfig {
    /// Provider: calendar, disabled
    #[serde(default)]
    pub provider: DateProvider,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingConfig {
    /// Hotel name echoed in hotel confirmations
    #[serde(default = "default_hotel_name")]
    pub hotel_name: String,

    /// Prefix of flight confirmation codes
    #[serde(default = "default_flight_prefix")]
    pub flight_prefix: String,

    /// Prefix of hotel confirmation codes
    #[serde(default = "default_hotel_prefix")]
    pub hotel_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_max_batch_size() -> usize { 50 }
fn default_gazetteer() -> Vec<String> { DEFAULT_DESTINATIONS.iter().map(|s| s.to_string()).collect() }
fn default_preferences() -> Vec<String> { DEFAULT_PREFERENCES.iter().map(|s| s.to_string()).collect() }
fn default_preference() -> String { "beach".to_string() }
fn default_trip_days() -> u32 { 3 }
fn default_fuzzy_threshold() -> f64 { 0.75 }
fn default_infer_duration() -> bool { true }
fn default_entity_timeout() -> u64 { 2_000 }
fn default_hotel_name() -> String { "Sea Breeze Resort".to_string() }
fn default_flight_prefix() -> String { "PNR".to_string() }
fn default_hotel_prefix() -> String { "HTL".to_string() }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "wayfarer".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            strategy: ParserStrategy::default(),
            gazetteer: default_gazetteer(),
            preferences: default_preferences(),
            default_preference: default_preference(),
            default_trip_days: default_trip_days(),
            fuzzy_threshold: default_fuzzy_threshold(),
            infer_duration: default_infer_duration(),
            reference_date: None,
        }
    }
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            provider: EntityProvider::default(),
            endpoint: None,
            timeout_ms: default_entity_timeout(),
        }
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            hotel_name: default_hotel_name(),
            flight_prefix: default_flight_prefix(),
            hotel_prefix: default_hotel_prefix(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl ParserSettings {
    /// Resolve the configured reference date
    pub fn reference(&self) -> Result<ReferenceDate> {
        match self.reference_date.as_deref() {
            None => Ok(ReferenceDate::Today),
            Some(raw) => ReferenceDate::parse(raw),
        }
    }

    /// Check invariants the parser relies on
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fuzzy_threshold) {
            return Err(AppError::config(format!(
                "parser.fuzzy_threshold must be within 0.0..=1.0, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.gazetteer.iter().all(|entry| entry.trim().is_empty()) {
            return Err(AppError::config("parser.gazetteer must name at least one destination"));
        }
        if self.preferences.iter().all(|keyword| keyword.trim().is_empty()) {
            return Err(AppError::config("parser.preferences must contain at least one keyword"));
        }
        let default_preference = self.default_preference.trim().to_lowercase();
        if !self
            .preferences
            .iter()
            .any(|keyword| keyword.trim().to_lowercase() == default_preference)
        {
            return Err(AppError::config(format!(
                "parser.default_preference {:?} is not one of parser.preferences",
                self.default_preference
            )));
        }
        self.reference()?;
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__PARSER__FUZZY_THRESHOLD=0.8
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-section invariants
    pub fn validate(&self) -> Result<()> {
        self.parser.validate()?;

        if self.entities.provider == EntityProvider::Remote && self.entities.endpoint.is_none() {
            return Err(AppError::config("entities.endpoint is required for the remote provider"));
        }
        if self.server.max_batch_size == 0 {
            return Err(AppError::config("server.max_batch_size must be positive"));
        }
        Ok(())
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            parser: ParserSettings::default(),
            entities: EntityConfig::default(),
            dates: DateConfig::default(),
            booking: BookingConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.parser.default_trip_days, 3);
        assert_eq!(config.parser.default_preference, "beach");
        assert_eq!(config.parser.strategy, ParserStrategy::Layered);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let mut config = AppConfig::default();
        config.parser.fuzzy_threshold = 1.5;
        assert!(matches!(config.validate(), Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_remote_provider_requires_endpoint() {
        let mut config = AppConfig::default();
        config.entities.provider = EntityProvider::Remote;
        assert!(config.validate().is_err());

        config.entities.endpoint = Some("http://localhost:5005/ner".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reference_date_parsing() {
        let mut settings = ParserSettings::default();
        assert_eq!(settings.reference().unwrap(), ReferenceDate::Today);

        settings.reference_date = Some("2025-06-01".to_string());
        assert_eq!(
            settings.reference().unwrap(),
            ReferenceDate::Fixed(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        );

        settings.reference_date = Some("June first".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_default_preference_must_be_in_vocabulary() {
        let mut settings = ParserSettings::default();
        settings.default_preference = "spa".to_string();
        assert!(matches!(settings.validate(), Err(AppError::Configuration { .. })));

        settings.default_preference = " Mountain ".to_string();
        assert!(settings.validate().is_ok());

        settings.default_preference = String::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_empty_gazetteer_rejected() {
        let mut settings = ParserSettings::default();
        settings.gazetteer = vec!["  ".to_string()];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sections_deserialize_from_partial_source() {
        let config = Config::builder()
            .set_override("parser.strategy", "keyword")
            .unwrap()
            .set_override("entities.provider", "disabled")
            .unwrap()
            .build()
            .unwrap();
        let config: AppConfig = config.try_deserialize().unwrap();
        assert_eq!(config.parser.strategy, ParserStrategy::Keyword);
        assert_eq!(config.entities.provider, EntityProvider::Disabled);
        assert_eq!(config.parser.gazetteer.len(), DEFAULT_DESTINATIONS.len());
    }
}
