//! Upstream daily forecast provider.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::ProviderError;
use crate::http::{get_json, ApiSettings};
use crate::types::RawForecastDay;

/// Fixed forecast windows offered by the daily endpoint.
const DAILY_WINDOWS: [u32; 4] = [1, 5, 10, 15];

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Fetch at least `horizon_days` daily entries for a location, unvalidated.
    async fn daily(
        &self,
        location_key: &str,
        horizon_days: u32,
    ) -> Result<Vec<RawForecastDay>, ProviderError>;
}

/// Smallest provider window covering `horizon_days`, capped at the largest one.
pub fn window_for(horizon_days: u32) -> u32 {
    DAILY_WINDOWS
        .iter()
        .copied()
        .find(|w| *w >= horizon_days)
        .unwrap_or(DAILY_WINDOWS[DAILY_WINDOWS.len() - 1])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DailyResponse {
    daily_forecasts: Vec<ApiDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiDay {
    date: Option<String>,
    temperature: Option<MinMax>,
    real_feel_temperature: Option<MinMax>,
    day: Option<HalfDay>,
    #[serde(default)]
    air_and_pollen: Vec<AirAndPollen>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MinMax {
    minimum: Option<Measure>,
    maximum: Option<Measure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Measure {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HalfDay {
    icon_phrase: Option<String>,
    precipitation_probability: Option<f64>,
    wind: Option<Wind>,
    relative_humidity: Option<Humidity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Wind {
    speed: Option<Measure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Humidity {
    average: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AirAndPollen {
    name: String,
    value: Option<f64>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| raw.parse::<NaiveDate>().ok())
}

impl From<ApiDay> for RawForecastDay {
    fn from(d: ApiDay) -> Self {
        let value = |m: Option<Measure>| m.and_then(|m| m.value);
        let (min_temp, max_temp) = d
            .temperature
            .map(|t| (value(t.minimum), value(t.maximum)))
            .unwrap_or((None, None));
        let real_feel_max = d.real_feel_temperature.and_then(|t| value(t.maximum));
        let uv_index = d
            .air_and_pollen
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case("UVIndex"))
            .and_then(|a| a.value);

        let (summary, precipitation_probability, wind_speed, humidity) = match d.day {
            Some(day) => (
                day.icon_phrase,
                day.precipitation_probability,
                day.wind.and_then(|w| value(w.speed)),
                day.relative_humidity.and_then(|h| h.average),
            ),
            None => (None, None, None, None),
        };

        RawForecastDay {
            date: d.date.as_deref().and_then(parse_date),
            max_temp,
            min_temp,
            wind_speed,
            precipitation_probability,
            humidity,
            uv_index,
            real_feel_max,
            summary,
        }
    }
}

/// Daily forecasts from the AccuWeather forecasts API.
#[derive(Debug, Clone)]
pub struct AccuWeatherForecasts {
    client: Client,
    settings: ApiSettings,
}

impl AccuWeatherForecasts {
    pub fn new(settings: ApiSettings) -> Result<Self, ProviderError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ForecastProvider for AccuWeatherForecasts {
    #[instrument(skip(self), level = "info")]
    async fn daily(
        &self,
        location_key: &str,
        horizon_days: u32,
    ) -> Result<Vec<RawForecastDay>, ProviderError> {
        let window = window_for(horizon_days);
        let url = format!(
            "{}/forecasts/v1/daily/{}day/{}",
            self.settings.base_url, window, location_key
        );
        let metric = if self.settings.metric { "true" } else { "false" };
        let request = self.client.get(&url).query(&[
            ("apikey", self.settings.api_key.as_str()),
            ("details", "true"),
            ("metric", metric),
        ]);

        let response: DailyResponse = get_json(request, location_key).await?;
        tracing::info!(
            "Fetched {} day(s) for location {} ({}-day window)",
            response.daily_forecasts.len(),
            location_key,
            window
        );

        Ok(response
            .daily_forecasts
            .into_iter()
            .map(RawForecastDay::from)
            .collect())
    }
}
