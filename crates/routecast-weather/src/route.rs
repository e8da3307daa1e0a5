//! Route aggregation: geocode, fetch and classify every waypoint in order.
//!
//! A run either yields a complete `RouteReport` or the first failure by
//! waypoint index. Partial reports are never returned.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};

use crate::classify::{Flag, SafeRanges, Verdict};
use crate::error::{RouteError, ValidationError, WaypointFailure};
use crate::fetcher::ForecastFetcher;
use crate::geocode::Geocoder;
use crate::types::{ForecastDay, Location, Waypoint, WaypointRole};

/// A forecast day with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    #[serde(flatten)]
    pub day: ForecastDay,
    pub verdict: Verdict,
}

/// Everything known about one waypoint of a finished route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointReport {
    pub index: usize,
    pub role: WaypointRole,
    /// Place name as the user typed it (trimmed)
    pub query: String,
    pub location: Location,
    pub days: Vec<DayReport>,
}

impl WaypointReport {
    pub fn has_bad_weather(&self) -> bool {
        self.days.iter().any(|d| !d.verdict.is_good())
    }
}

/// A day with at least one raised flag, located on the route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadDay {
    pub waypoint_index: usize,
    pub place: String,
    pub date: NaiveDate,
    pub flags: Vec<Flag>,
}

/// Marker for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub index: usize,
    pub role: WaypointRole,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub bad_weather: bool,
}

/// Completed route, index-aligned with the requested waypoints. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    horizon_days: u32,
    waypoints: Vec<WaypointReport>,
}

impl RouteReport {
    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn waypoints(&self) -> &[WaypointReport] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn has_bad_weather(&self) -> bool {
        self.waypoints.iter().any(WaypointReport::has_bad_weather)
    }

    pub fn bad_days(&self) -> Vec<BadDay> {
        self.waypoints
            .iter()
            .flat_map(|w| {
                w.days.iter().filter_map(move |d| match &d.verdict {
                    Verdict::Good => None,
                    Verdict::Bad(flags) => Some(BadDay {
                        waypoint_index: w.index,
                        place: w.location.display_name(),
                        date: d.day.date,
                        flags: flags.clone(),
                    }),
                })
            })
            .collect()
    }

    pub fn map_points(&self) -> Vec<MapPoint> {
        self.waypoints
            .iter()
            .map(|w| MapPoint {
                index: w.index,
                role: w.role,
                name: w.location.display_name(),
                latitude: w.location.latitude,
                longitude: w.location.longitude,
                bad_weather: w.has_bad_weather(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouteOptions {
    /// Resolve and fetch all waypoints at once instead of one after another
    pub concurrent: bool,
}

pub struct RouteAggregator {
    geocoder: Arc<dyn Geocoder>,
    fetcher: Arc<ForecastFetcher>,
    ranges: SafeRanges,
    options: RouteOptions,
}

impl RouteAggregator {
    pub fn new(geocoder: Arc<dyn Geocoder>, fetcher: Arc<ForecastFetcher>) -> Self {
        Self {
            geocoder,
            fetcher,
            ranges: SafeRanges::default(),
            options: RouteOptions::default(),
        }
    }

    pub fn with_ranges(mut self, ranges: SafeRanges) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the report for `waypoints` (start first, end last).
    pub async fn build_report<S: AsRef<str>>(
        &self,
        waypoints: &[S],
        horizon_days: u32,
    ) -> Result<RouteReport, RouteError> {
        if waypoints.len() < 2 {
            return Err(ValidationError::TooFewWaypoints {
                count: waypoints.len(),
            }
            .into());
        }
        if horizon_days == 0 {
            return Err(ValidationError::NonPositiveHorizon.into());
        }

        let route = Waypoint::route(waypoints);
        tracing::info!(
            "Building {}-day report for {} waypoint(s){}",
            horizon_days,
            route.len(),
            if self.options.concurrent { " concurrently" } else { "" }
        );

        let result = if self.options.concurrent {
            self.run_concurrent(&route, horizon_days).await
        } else {
            self.run_sequential(&route, horizon_days).await
        };

        match result {
            Ok(entries) => Ok(RouteReport {
                horizon_days,
                waypoints: entries,
            }),
            Err(e) => {
                tracing::warn!("Route aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn run_sequential(
        &self,
        route: &[Waypoint],
        horizon_days: u32,
    ) -> Result<Vec<WaypointReport>, RouteError> {
        let mut entries = Vec::with_capacity(route.len());
        for waypoint in route {
            entries.push(self.process(waypoint, horizon_days).await?);
        }
        Ok(entries)
    }

    // Results are consumed in index order; returning early drops, and so
    // cancels, every waypoint still in flight.
    async fn run_concurrent(
        &self,
        route: &[Waypoint],
        horizon_days: u32,
    ) -> Result<Vec<WaypointReport>, RouteError> {
        let mut pending: FuturesOrdered<_> = route
            .iter()
            .map(|waypoint| self.process(waypoint, horizon_days))
            .collect();

        let mut entries = Vec::with_capacity(route.len());
        while let Some(result) = pending.next().await {
            entries.push(result?);
        }
        Ok(entries)
    }

    async fn process(
        &self,
        waypoint: &Waypoint,
        horizon_days: u32,
    ) -> Result<WaypointReport, RouteError> {
        let fail = |failure: WaypointFailure| RouteError::Waypoint {
            index: waypoint.index,
            place: waypoint.name.clone(),
            role: waypoint.role,
            failure,
        };

        if waypoint.name.is_empty() {
            return Err(fail(WaypointFailure::NotFound));
        }

        let location = self
            .geocoder
            .resolve(&waypoint.name)
            .await
            .map_err(|e| fail(e.into()))?;

        let series = self
            .fetcher
            .fetch(&location.key, horizon_days)
            .await
            .map_err(|e| fail(WaypointFailure::Forecast(e)))?;

        let days = series
            .into_days()
            .into_iter()
            .map(|day| DayReport {
                verdict: self
                    .ranges
                    .classify(day.max_temp, day.wind_speed, day.precipitation_probability),
                day,
            })
            .collect();

        tracing::debug!("Waypoint {} ({}) complete", waypoint.index, waypoint.name);
        Ok(WaypointReport {
            index: waypoint.index,
            role: waypoint.role,
            query: waypoint.name.clone(),
            location,
            days,
        })
    }
}
