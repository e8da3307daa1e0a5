//! Cached forecast retrieval and normalization.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::instrument;

use crate::cache::{Clock, ForecastCache};
use crate::error::ProviderError;
use crate::provider::ForecastProvider;
use crate::types::{CacheKey, ForecastDay, ForecastSeries, RawForecastDay};

/// Fetches forecasts through the cache, calling upstream at most once per key
/// per freshness window even when callers race.
pub struct ForecastFetcher {
    provider: Arc<dyn ForecastProvider>,
    cache: Arc<dyn ForecastCache>,
    clock: Arc<dyn Clock>,
    // One gate per key being fetched; different keys never wait on each other.
    in_flight: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl ForecastFetcher {
    pub fn new(
        provider: Arc<dyn ForecastProvider>,
        cache: Arc<dyn ForecastCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Forecast for `location_key`, exactly `horizon_days` long.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(
        &self,
        location_key: &str,
        horizon_days: u32,
    ) -> Result<ForecastSeries, ProviderError> {
        let key = CacheKey::new(location_key, horizon_days);
        if let Some(series) = self.cache.get(&key, self.clock.now()) {
            return Ok(series);
        }

        let gate = self.gate(&key);
        let result = self.fetch_gated(&key, &gate).await;
        self.release(&key, gate);
        result
    }

    async fn fetch_gated(
        &self,
        key: &CacheKey,
        gate: &tokio::sync::Mutex<()>,
    ) -> Result<ForecastSeries, ProviderError> {
        let _held = gate.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(series) = self.cache.get(key, self.clock.now()) {
            return Ok(series);
        }

        let raw = self
            .provider
            .daily(&key.location_key, key.horizon_days)
            .await
            .map_err(|e| {
                tracing::warn!("Forecast fetch failed: {}", e);
                e
            })?;
        let series = normalize(&key.location_key, raw, key.horizon_days)?;

        self.cache.put(key.clone(), series.clone(), self.clock.now());
        Ok(series)
    }

    fn gate(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .lock()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn release(&self, key: &CacheKey, gate: Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.in_flight.lock();
        // Only the map and this caller hold it: nobody else is waiting.
        if Arc::strong_count(&gate) <= 2 {
            in_flight.remove(key);
        }
    }
}

/// Turn upstream days into a series of exactly `horizon_days` entries.
///
/// Extra days are dropped. Too few days, or a kept day missing a required
/// reading, fails the whole series; optional readings may be absent.
pub fn normalize(
    context: &str,
    mut raw: Vec<RawForecastDay>,
    horizon_days: u32,
) -> Result<ForecastSeries, ProviderError> {
    let wanted = horizon_days as usize;
    if raw.len() < wanted {
        return Err(ProviderError::malformed(
            context,
            format!("provider returned {} of {} requested days", raw.len(), wanted),
        ));
    }

    // Order by date before truncating so the kept days are the earliest ones.
    // Dateless days sort first and fail the series below.
    raw.sort_by_key(|day| day.date);

    let days = raw
        .into_iter()
        .take(wanted)
        .enumerate()
        .map(|(i, day)| normalize_day(context, i, day))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ForecastSeries::new(days))
}

fn normalize_day(context: &str, index: usize, raw: RawForecastDay) -> Result<ForecastDay, ProviderError> {
    let missing = |field: &str| {
        ProviderError::malformed(context, format!("day {} is missing {}", index, field))
    };

    Ok(ForecastDay {
        date: raw.date.ok_or_else(|| missing("date"))?,
        max_temp: raw.max_temp.ok_or_else(|| missing("maximum temperature"))?,
        min_temp: raw.min_temp.ok_or_else(|| missing("minimum temperature"))?,
        wind_speed: raw.wind_speed.ok_or_else(|| missing("wind speed"))?,
        precipitation_probability: raw
            .precipitation_probability
            .map(|p| p.clamp(0.0, 100.0))
            .ok_or_else(|| missing("precipitation probability"))?,
        humidity: raw.humidity.map(percent),
        uv_index: raw.uv_index,
        real_feel_max: raw.real_feel_max,
        summary: raw.summary.filter(|s| !s.trim().is_empty()),
    })
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
