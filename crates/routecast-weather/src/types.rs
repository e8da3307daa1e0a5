use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Position of a waypoint within its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointRole {
    Start,
    Via,
    End,
}

impl WaypointRole {
    /// Role of the waypoint at `index` in a route of `len` points.
    pub fn for_index(index: usize, len: usize) -> Self {
        if index == 0 {
            Self::Start
        } else if index + 1 >= len {
            Self::End
        } else {
            Self::Via
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "Start point",
            Self::Via => "Waypoint",
            Self::End => "Destination",
        }
    }
}

/// One user-supplied place name and its position in the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waypoint {
    pub index: usize,
    pub name: String,
    pub role: WaypointRole,
}

impl Waypoint {
    /// Build the ordered waypoint list for a route.
    pub fn route<S: AsRef<str>>(names: &[S]) -> Vec<Waypoint> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| Waypoint {
                index,
                name: name.as_ref().trim().to_string(),
                role: WaypointRole::for_index(index, names.len()),
            })
            .collect()
    }
}

/// Resolved identity of a waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Opaque provider key used for forecast lookups
    pub key: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    /// Name with region/country appended when they add information.
    pub fn display_name(&self) -> String {
        let suffix = self
            .region
            .as_deref()
            .filter(|r| !r.is_empty() && *r != self.name)
            .or_else(|| {
                self.country
                    .as_deref()
                    .filter(|c| !c.is_empty() && *c != self.name)
            });

        match suffix {
            Some(s) => format!("{}, {}", self.name, s),
            None => self.name.clone(),
        }
    }
}

/// One forecast day. Optional readings are `None` when the provider omits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp: f64,
    pub min_temp: f64,
    pub wind_speed: f64,
    /// Chance of precipitation, 0..=100
    pub precipitation_probability: f64,
    pub humidity: Option<u8>,
    pub uv_index: Option<f64>,
    pub real_feel_max: Option<f64>,
    pub summary: Option<String>,
}

/// A forecast day as delivered by the upstream provider, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawForecastDay {
    pub date: Option<NaiveDate>,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,
    pub wind_speed: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub humidity: Option<f64>,
    pub uv_index: Option<f64>,
    pub real_feel_max: Option<f64>,
    pub summary: Option<String>,
}

/// Date-ascending run of forecast days, exactly as long as the requested horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastSeries {
    days: Vec<ForecastDay>,
}

impl ForecastSeries {
    /// Wrap days, sorting them by date.
    pub fn new(mut days: Vec<ForecastDay>) -> Self {
        days.sort_by_key(|d| d.date);
        Self { days }
    }

    pub fn days(&self) -> &[ForecastDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ForecastDay> {
        self.days.iter()
    }

    pub fn into_days(self) -> Vec<ForecastDay> {
        self.days
    }
}

impl<'a> IntoIterator for &'a ForecastSeries {
    type Item = &'a ForecastDay;
    type IntoIter = std::slice::Iter<'a, ForecastDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

/// Cache key: the same location with a different horizon is a different entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub location_key: String,
    pub horizon_days: u32,
}

impl CacheKey {
    pub fn new(location_key: impl Into<String>, horizon_days: u32) -> Self {
        Self {
            location_key: location_key.into(),
            horizon_days,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}d", self.location_key, self.horizon_days)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn day(date: &str) -> ForecastDay {
        ForecastDay {
            date: date.parse().unwrap(),
            max_temp: 20.0,
            min_temp: 10.0,
            wind_speed: 12.0,
            precipitation_probability: 10.0,
            humidity: None,
            uv_index: None,
            real_feel_max: None,
            summary: None,
        }
    }

    #[test]
    fn test_roles_follow_position() {
        let route = Waypoint::route(&["Moscow", "Tver", "Saint Petersburg"]);
        let roles: Vec<_> = route.iter().map(|w| w.role).collect();
        assert_eq!(roles, vec![WaypointRole::Start, WaypointRole::Via, WaypointRole::End]);
        assert_eq!(route[2].index, 2);
    }

    #[test]
    fn test_route_trims_names() {
        let route = Waypoint::route(&["  Kazan ", "Samara"]);
        assert_eq!(route[0].name, "Kazan");
        assert_eq!(route[1].role, WaypointRole::End);
    }

    #[test]
    fn test_series_sorted_by_date() {
        let series = ForecastSeries::new(vec![day("2024-03-03"), day("2024-03-01"), day("2024-03-02")]);
        let dates: Vec<_> = series.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-03-02", "2024-03-03"]);
    }

    #[test]
    fn test_cache_keys_differ_by_horizon() {
        assert_ne!(CacheKey::new("294021", 1), CacheKey::new("294021", 5));
        assert_eq!(CacheKey::new("294021", 5).to_string(), "294021/5d");
    }

    #[test]
    fn test_display_name_adds_region() {
        let loc = Location {
            key: "1".into(),
            name: "Springfield".into(),
            latitude: 39.8,
            longitude: -89.6,
            region: Some("Illinois".into()),
            country: Some("United States".into()),
        };
        assert_eq!(loc.display_name(), "Springfield, Illinois");
    }

    #[test]
    fn test_unavailable_readings_serialize_as_null() {
        let json = serde_json::to_value(day("2024-03-01")).unwrap();
        assert!(json["uv_index"].is_null());
        assert!(json["summary"].is_null());
    }
}
