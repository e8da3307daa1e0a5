//! Error types for the route-weather pipeline.

use routecast_core::{AppError, NetworkError};
use thiserror::Error;

use crate::types::WaypointRole;

/// Failure talking to an upstream provider.
///
/// `context` names what was being requested (a place name or location key),
/// never the request URL, which carries the API key.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{context}: {cause}")]
pub struct ProviderError {
    pub context: String,
    #[source]
    pub cause: NetworkError,
}

impl ProviderError {
    pub fn new(context: impl Into<String>, cause: NetworkError) -> Self {
        Self {
            context: context.into(),
            cause,
        }
    }

    pub fn malformed(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(context, NetworkError::InvalidResponse(detail.into()))
    }

    /// Short failure class (`timeout`, `status`, `malformed`, ...).
    pub fn class(&self) -> &'static str {
        self.cause.class()
    }
}

/// Geocoding failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    #[error("no location matches \"{0}\"")]
    NotFound(String),

    #[error("geocoding failed for {0}")]
    Provider(#[from] ProviderError),
}

/// Route rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a route needs a start and an end, got {count} waypoint(s)")]
    TooFewWaypoints { count: usize },

    #[error("forecast horizon must be at least one day")]
    NonPositiveHorizon,
}

/// Why a single waypoint stopped the route
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WaypointFailure {
    #[error("place not found")]
    NotFound,

    #[error("geocoding failed: {0}")]
    Geocode(ProviderError),

    #[error("forecast failed: {0}")]
    Forecast(ProviderError),
}

impl From<GeocodeError> for WaypointFailure {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::NotFound(_) => WaypointFailure::NotFound,
            GeocodeError::Provider(p) => WaypointFailure::Geocode(p),
        }
    }
}

/// Terminal error of a route run. No partial report accompanies it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("invalid route: {0}")]
    Validation(#[from] ValidationError),

    #[error("waypoint {index} ({place}): {failure}")]
    Waypoint {
        index: usize,
        place: String,
        role: WaypointRole,
        failure: WaypointFailure,
    },
}

impl RouteError {
    /// Index of the failing waypoint, if the error is tied to one.
    pub fn waypoint_index(&self) -> Option<usize> {
        match self {
            RouteError::Waypoint { index, .. } => Some(*index),
            RouteError::Validation(_) => None,
        }
    }

    /// Message for end users, naming the failing point.
    pub fn user_message(&self) -> String {
        match self {
            RouteError::Validation(ValidationError::TooFewWaypoints { .. }) => {
                "Enter both a start point and a destination.".to_string()
            }
            RouteError::Validation(ValidationError::NonPositiveHorizon) => {
                "Choose a forecast period of at least one day.".to_string()
            }
            RouteError::Waypoint {
                place,
                role,
                failure: WaypointFailure::NotFound,
                ..
            } => format!(
                "{} \"{}\" was not found. Check the spelling and try again.",
                role.label(),
                place
            ),
            RouteError::Waypoint {
                place,
                role,
                failure: WaypointFailure::Geocode(e) | WaypointFailure::Forecast(e),
                ..
            } => format!(
                "Could not get weather for {} \"{}\". {}",
                role.label().to_lowercase(),
                place,
                e.cause.user_message()
            ),
        }
    }
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        AppError::Route {
            message: err.to_string(),
            user_message: err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_the_point() {
        let err = RouteError::Waypoint {
            index: 0,
            place: "Atlantis".into(),
            role: WaypointRole::Start,
            failure: WaypointFailure::NotFound,
        };
        assert_eq!(
            err.user_message(),
            "Start point \"Atlantis\" was not found. Check the spelling and try again."
        );
        assert_eq!(err.waypoint_index(), Some(0));
    }

    #[test]
    fn test_provider_failure_message() {
        let err = RouteError::Waypoint {
            index: 1,
            place: "Oslo".into(),
            role: WaypointRole::End,
            failure: WaypointFailure::Forecast(ProviderError::new("349727", NetworkError::Timeout)),
        };
        let msg = err.user_message();
        assert!(msg.contains("destination \"Oslo\""));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn test_geocode_error_maps_to_failure() {
        let failure: WaypointFailure = GeocodeError::NotFound("x".into()).into();
        assert_eq!(failure, WaypointFailure::NotFound);

        let provider = ProviderError::malformed("Paris", "expected array");
        let failure: WaypointFailure = GeocodeError::Provider(provider.clone()).into();
        assert_eq!(failure, WaypointFailure::Geocode(provider));
    }

    #[test]
    fn test_validation_has_no_index() {
        let err: RouteError = ValidationError::NonPositiveHorizon.into();
        assert_eq!(err.waypoint_index(), None);
    }

    #[test]
    fn test_provider_error_display_omits_url() {
        let err = ProviderError::new(
            "Paris",
            NetworkError::ServerError {
                status: 503,
                message: "Service Unavailable".into(),
            },
        );
        assert_eq!(err.to_string(), "Paris: Server error: 503 - Service Unavailable");
        assert_eq!(err.class(), "status");
    }

    #[test]
    fn test_route_error_converts_to_app_error() {
        let err = RouteError::Validation(ValidationError::TooFewWaypoints { count: 1 });
        let app: AppError = err.into();
        assert_eq!(
            app.user_message(),
            "Enter both a start point and a destination."
        );
    }
}
