//! Application-level errors shared by the Routecast crates.
//!
//! Every variant carries a `user_message()` for display; the `Display`
//! text is for logs.

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a message suitable for end users.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Route pipeline failures, already rendered by the weather crate.
    #[error("Route error: {message}")]
    Route {
        message: String,
        user_message: String,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(e) => e.user_message().to_string(),
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Io(_) => "A file operation failed. Please try again.".to_string(),
            AppError::Route { user_message, .. } => user_message.clone(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Transport-level failure of an upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("TLS/SSL error: {0}")]
    TlsError(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::Unauthorized { .. } => {
                "The weather service rejected the API key. Check your settings."
            }
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
            NetworkError::TlsError(_) => "Secure connection failed. Check your network settings.",
        }
    }

    /// Short name of the failure class, safe to show in logs and reports.
    pub fn class(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "connection",
            NetworkError::Timeout => "timeout",
            NetworkError::ServerError { .. } => "status",
            NetworkError::Unauthorized { .. } => "unauthorized",
            NetworkError::InvalidResponse(_) => "malformed",
            NetworkError::TlsError(_) => "tls",
        }
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => NetworkError::Unauthorized { status },
            _ => NetworkError::ServerError {
                status,
                message: message.into(),
            },
        }
    }
}

/// Problems loading or validating `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Maps `reqwest` failures onto `NetworkError` with the request URL stripped.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        // The request URL carries the API key as a query parameter.
        let err = self.without_url();
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            NetworkError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::from_status(status.as_u16(), err.to_string())
        } else {
            NetworkError::ConnectionFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_converts_to_app_error() {
        let err: AppError = NetworkError::Timeout.into();
        assert!(matches!(err, AppError::Network(NetworkError::Timeout)));
    }

    #[test]
    fn test_invalid_config_user_message() {
        let err = AppError::Config(ConfigError::Invalid("cache.ttl_secs".into()));
        assert_eq!(err.user_message(), "Invalid configuration. Check your settings.");
    }

    #[test]
    fn test_route_error_keeps_rendered_message() {
        let err = AppError::Route {
            message: "waypoint 1 (Nowhere): not found".into(),
            user_message: "Destination \"Nowhere\" was not found.".into(),
        };
        assert!(err.user_message().contains("Nowhere"));
    }

    #[test]
    fn test_from_status_classifies_auth_failures() {
        assert_eq!(
            NetworkError::from_status(401, "denied"),
            NetworkError::Unauthorized { status: 401 }
        );
        assert_eq!(NetworkError::from_status(503, "down").class(), "status");
    }

    #[test]
    fn test_server_error_messages_split_on_5xx() {
        let server = NetworkError::ServerError {
            status: 502,
            message: "bad gateway".into(),
        };
        let client = NetworkError::ServerError {
            status: 400,
            message: "bad request".into(),
        };
        assert_ne!(server.user_message(), client.user_message());
    }

    #[test]
    fn test_config_errors_have_specific_messages() {
        let parse = ConfigError::ParseError("expected `]`".into());
        let missing = ConfigError::MissingSetting("provider.api_key".into());
        assert_eq!(
            parse.user_message(),
            "Configuration file is malformed. Check your settings."
        );
        assert_eq!(
            AppError::from(missing).user_message(),
            "A required setting is missing. Check your settings."
        );
    }
}
