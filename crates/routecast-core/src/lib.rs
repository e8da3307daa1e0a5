pub mod config;
pub mod error;

pub use config::{
    CacheConfig, ClassifierConfig, Config, ProviderConfig, RouteConfig, ValidationResult,
    API_KEY_ENV,
};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging. Output goes to stderr so reports on stdout stay machine-readable.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Routecast core initialized");
    Ok(())
}
