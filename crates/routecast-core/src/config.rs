use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when no API key is configured on disk.
pub const API_KEY_ENV: &str = "ACCUWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream weather provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Forecast cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Route request defaults
    #[serde(default)]
    pub route: RouteConfig,

    /// Bad-weather thresholds
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Connection settings for the AccuWeather-compatible provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL shared by the geocoding and forecast endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. When absent, `ACCUWEATHER_API_KEY` is read at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Request metric units (°C, km/h) instead of imperial
    #[serde(default = "default_metric")]
    pub metric: bool,
}

fn default_base_url() -> String {
    "http://dataservice.accuweather.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_metric() -> bool {
    true
}

impl ProviderConfig {
    /// Configured key, falling back to the environment.
    pub fn effective_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            metric: default_metric(),
        }
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("metric", &self.metric)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached forecast stays fresh
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Horizon used when the caller does not ask for one
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,

    /// Largest horizon accepted from callers
    #[serde(default = "default_max_horizon_days")]
    pub max_horizon_days: u32,

    /// Resolve and fetch waypoints in parallel
    #[serde(default)]
    pub concurrent: bool,
}

fn default_horizon_days() -> u32 {
    5
}

fn default_max_horizon_days() -> u32 {
    15
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            default_horizon_days: default_horizon_days(),
            max_horizon_days: default_max_horizon_days(),
            concurrent: false,
        }
    }
}

impl RouteConfig {
    /// Check a caller-supplied horizon against the configured bounds.
    pub fn check_horizon(&self, days: u32) -> Result<u32, ConfigError> {
        if days == 0 || days > self.max_horizon_days {
            return Err(ConfigError::Invalid(format!(
                "horizon must be between 1 and {} days, got {}",
                self.max_horizon_days, days
            )));
        }
        Ok(days)
    }
}

/// Thresholds for the bad-weather rules. Values strictly beyond a bound raise a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_min_temp")]
    pub min_temp: f64,
    #[serde(default = "default_max_temp")]
    pub max_temp: f64,
    #[serde(default = "default_max_wind_speed")]
    pub max_wind_speed: f64,
    #[serde(default = "default_max_precipitation_probability")]
    pub max_precipitation_probability: f64,
}

fn default_min_temp() -> f64 {
    -15.0
}

fn default_max_temp() -> f64 {
    35.0
}

fn default_max_wind_speed() -> f64 {
    50.0
}

fn default_max_precipitation_probability() -> f64 {
    60.0
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_temp: default_min_temp(),
            max_temp: default_max_temp(),
            max_wind_speed: default_max_wind_speed(),
            max_precipitation_probability: default_max_precipitation_probability(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);

        if self.provider.timeout_secs == 0 {
            result.add_error("provider.timeout_secs", "Timeout must be greater than 0");
        } else if self.provider.timeout_secs > 60 {
            result.add_warning(
                "provider.timeout_secs",
                "Timeout is unusually long (>60s); stalled requests will hold the route",
            );
        }

        if self.provider.effective_api_key().is_none() {
            result.add_warning(
                "provider.api_key",
                format!("No API key configured and {} is not set", API_KEY_ENV),
            );
        }

        if self.cache.ttl_secs == 0 {
            result.add_warning("cache.ttl_secs", "Forecast caching disabled (0 seconds)");
        }

        if self.route.max_horizon_days == 0 {
            result.add_error("route.max_horizon_days", "Maximum horizon must be at least 1 day");
        }
        if self.route.default_horizon_days == 0 {
            result.add_error("route.default_horizon_days", "Default horizon must be at least 1 day");
        } else if self.route.default_horizon_days > self.route.max_horizon_days {
            result.add_error(
                "route.default_horizon_days",
                "Default horizon exceeds route.max_horizon_days",
            );
        }

        if self.classifier.min_temp >= self.classifier.max_temp {
            result.add_error(
                "classifier.min_temp",
                "Minimum temperature must be below the maximum",
            );
        }
        if !(0.0..=100.0).contains(&self.classifier.max_precipitation_probability) {
            result.add_error(
                "classifier.max_precipitation_probability",
                "Precipitation probability is a percentage (0-100)",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("routecast");

        Ok(config_dir.join("config.toml"))
    }
}
