//! In-process fakes for pipeline tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;
use routecast_core::NetworkError;
use routecast_weather::{
    ForecastFetcher, ForecastProvider, GeocodeError, Geocoder, InMemoryForecastCache, Location,
    ManualClock, ProviderError, RawForecastDay, RouteAggregator,
};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
}

pub fn location(key: &str, name: &str) -> Location {
    Location {
        key: key.to_string(),
        name: name.to_string(),
        latitude: 50.0,
        longitude: 30.0,
        region: None,
        country: None,
    }
}

/// A mild day: every reading inside the safe ranges.
pub fn mild_day(day: u32) -> RawForecastDay {
    RawForecastDay {
        date: NaiveDate::from_ymd_opt(2024, 6, day),
        max_temp: Some(22.0),
        min_temp: Some(13.0),
        wind_speed: Some(15.0),
        precipitation_probability: Some(20.0),
        humidity: Some(55.0),
        uv_index: Some(6.0),
        real_feel_max: None,
        summary: Some("Mostly sunny".into()),
    }
}

pub fn mild_days(count: u32) -> Vec<RawForecastDay> {
    (1..=count).map(mild_day).collect()
}

/// Geocoder backed by a fixed table; unknown names are not found.
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Result<Location, GeocodeError>>,
    delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, key: &str) -> Self {
        self.places.insert(name.to_string(), Ok(location(key, name)));
        self
    }

    pub fn with_failure(mut self, name: &str, cause: NetworkError) -> Self {
        self.places.insert(
            name.to_string(),
            Err(GeocodeError::Provider(ProviderError::new(name, cause))),
        );
        self
    }

    pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }

    pub fn called_with(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, place: &str) -> Result<Location, GeocodeError> {
        self.calls.lock().push(place.to_string());
        if let Some(delay) = self.delays.get(place) {
            tokio::time::sleep(*delay).await;
        }
        self.places
            .get(place)
            .cloned()
            .unwrap_or_else(|| Err(GeocodeError::NotFound(place.to_string())))
    }
}

/// Forecast provider that counts upstream calls per location key.
#[derive(Default)]
pub struct FakeProvider {
    forecasts: HashMap<String, Result<Vec<RawForecastDay>, ProviderError>>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(mut self, key: &str, days: Vec<RawForecastDay>) -> Self {
        self.forecasts.insert(key.to_string(), Ok(days));
        self
    }

    pub fn with_failure(mut self, key: &str, cause: NetworkError) -> Self {
        self.forecasts
            .insert(key.to_string(), Err(ProviderError::new(key, cause)));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_for(&self, key: &str) -> usize {
        self.calls.lock().get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastProvider for FakeProvider {
    async fn daily(
        &self,
        location_key: &str,
        _horizon_days: u32,
    ) -> Result<Vec<RawForecastDay>, ProviderError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(location_key.to_string()).or_insert(0) += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.forecasts.get(location_key).cloned().unwrap_or_else(|| {
            Err(ProviderError::new(
                location_key,
                NetworkError::ServerError {
                    status: 404,
                    message: "unknown location".into(),
                },
            ))
        })
    }
}

pub struct Harness {
    pub geocoder: Arc<FakeGeocoder>,
    pub provider: Arc<FakeProvider>,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<InMemoryForecastCache>,
    pub fetcher: Arc<ForecastFetcher>,
}

impl Harness {
    pub fn new(geocoder: FakeGeocoder, provider: FakeProvider) -> Self {
        let geocoder = Arc::new(geocoder);
        let provider = Arc::new(provider);
        let clock = Arc::new(ManualClock::new(start_time()));
        let cache = Arc::new(InMemoryForecastCache::default());
        let fetcher = Arc::new(ForecastFetcher::new(
            provider.clone(),
            cache.clone(),
            clock.clone(),
        ));
        Self {
            geocoder,
            provider,
            clock,
            cache,
            fetcher,
        }
    }

    pub fn aggregator(&self) -> RouteAggregator {
        RouteAggregator::new(self.geocoder.clone(), self.fetcher.clone())
    }
}
