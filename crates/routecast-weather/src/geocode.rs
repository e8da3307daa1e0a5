//! Forward geocoding: place name to provider location key and coordinates.
//!
//! The first candidate returned by the provider wins. Ambiguous names
//! (several towns called "Springfield") are not disambiguated.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::error::{GeocodeError, ProviderError};
use crate::http::{get_json, ApiSettings};
use crate::types::Location;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a place name to a single location.
    async fn resolve(&self, place: &str) -> Result<Location, GeocodeError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CityCandidate {
    key: String,
    localized_name: String,
    geo_position: GeoPosition,
    administrative_area: Option<NamedArea>,
    country: Option<NamedArea>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NamedArea {
    localized_name: Option<String>,
}

impl From<CityCandidate> for Location {
    fn from(c: CityCandidate) -> Self {
        Location {
            key: c.key,
            name: c.localized_name,
            latitude: c.geo_position.latitude,
            longitude: c.geo_position.longitude,
            region: c.administrative_area.and_then(|a| a.localized_name),
            country: c.country.and_then(|a| a.localized_name),
        }
    }
}

/// City search against the AccuWeather locations API.
#[derive(Debug, Clone)]
pub struct AccuWeatherGeocoder {
    client: Client,
    settings: ApiSettings,
}

impl AccuWeatherGeocoder {
    pub fn new(settings: ApiSettings) -> Result<Self, ProviderError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl Geocoder for AccuWeatherGeocoder {
    #[instrument(skip(self), level = "info")]
    async fn resolve(&self, place: &str) -> Result<Location, GeocodeError> {
        let place = place.trim();
        if place.is_empty() {
            return Err(GeocodeError::NotFound(String::new()));
        }

        let url = format!("{}/locations/v1/cities/search", self.settings.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("apikey", self.settings.api_key.as_str()), ("q", place)]);

        let candidates: Vec<CityCandidate> = get_json(request, place).await?;
        tracing::debug!("{} candidate(s) for {:?}", candidates.len(), place);

        let location = candidates
            .into_iter()
            .next()
            .map(Location::from)
            .ok_or_else(|| GeocodeError::NotFound(place.to_string()))?;

        tracing::info!(
            "Resolved {:?} to {} ({:.4}, {:.4})",
            place,
            location.key,
            location.latitude,
            location.longitude
        );
        Ok(location)
    }
}
