//! Route weather for Routecast
//!
//! Resolves an ordered list of place names, fetches and caches multi-day
//! forecasts for each, classifies every day against the bad-weather rules
//! and assembles one ordered route report.

pub mod cache;
pub mod classify;
pub mod error;
pub mod fetcher;
pub mod geocode;
mod http;
pub mod pipeline;
pub mod provider;
pub mod route;
pub mod store;
pub mod types;

pub use cache::{Clock, ForecastCache, InMemoryForecastCache, ManualClock, SystemClock, DEFAULT_TTL};
pub use classify::{classify, Flag, SafeRanges, Verdict};
pub use error::{GeocodeError, ProviderError, RouteError, ValidationError, WaypointFailure};
pub use fetcher::ForecastFetcher;
pub use geocode::{AccuWeatherGeocoder, Geocoder};
pub use http::ApiSettings;
pub use pipeline::Pipeline;
pub use provider::{AccuWeatherForecasts, ForecastProvider};
pub use route::{BadDay, DayReport, MapPoint, RouteAggregator, RouteOptions, RouteReport, WaypointReport};
pub use store::{InMemoryReportStore, ReportOutcome, ReportStore};
pub use types::*;
