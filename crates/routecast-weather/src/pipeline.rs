//! Wiring of the pipeline from application configuration.

use std::sync::Arc;
use std::time::Duration;

use routecast_core::{AppError, ClassifierConfig, Config, ConfigError, API_KEY_ENV};

use crate::cache::{InMemoryForecastCache, SystemClock};
use crate::classify::SafeRanges;
use crate::fetcher::ForecastFetcher;
use crate::geocode::AccuWeatherGeocoder;
use crate::http::ApiSettings;
use crate::provider::AccuWeatherForecasts;
use crate::route::{RouteAggregator, RouteOptions};

impl From<&ClassifierConfig> for SafeRanges {
    fn from(c: &ClassifierConfig) -> Self {
        SafeRanges {
            min_temp: c.min_temp,
            max_temp: c.max_temp,
            max_wind_speed: c.max_wind_speed,
            max_precipitation_probability: c.max_precipitation_probability,
        }
    }
}

/// A ready-to-run aggregator plus handles to its shared parts.
pub struct Pipeline {
    pub aggregator: RouteAggregator,
    pub cache: Arc<InMemoryForecastCache>,
}

impl Pipeline {
    /// Build the HTTP-backed pipeline. Fails if no API key is available.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let api_key = config.provider.effective_api_key().ok_or_else(|| {
            ConfigError::MissingSetting(format!("provider.api_key (or {})", API_KEY_ENV))
        })?;

        let settings = ApiSettings::new(api_key)
            .with_base_url(config.provider.base_url.clone())
            .with_timeout(Duration::from_secs(config.provider.timeout_secs))
            .with_metric(config.provider.metric);

        let geocoder =
            AccuWeatherGeocoder::new(settings.clone()).map_err(|e| AppError::Network(e.cause))?;
        let forecasts =
            AccuWeatherForecasts::new(settings).map_err(|e| AppError::Network(e.cause))?;

        let cache = Arc::new(InMemoryForecastCache::new(Duration::from_secs(
            config.cache.ttl_secs,
        )));
        let fetcher = Arc::new(ForecastFetcher::new(
            Arc::new(forecasts),
            cache.clone(),
            Arc::new(SystemClock),
        ));

        let aggregator = RouteAggregator::new(Arc::new(geocoder), fetcher)
            .with_ranges(SafeRanges::from(&config.classifier))
            .with_options(RouteOptions {
                concurrent: config.route.concurrent,
            });

        tracing::debug!("Pipeline ready: {:?}", config.provider);
        Ok(Self { aggregator, cache })
    }
}
