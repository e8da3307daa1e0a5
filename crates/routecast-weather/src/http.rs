//! Shared HTTP plumbing for the AccuWeather-compatible endpoints.

use std::time::Duration;

use reqwest::Client;
use routecast_core::{NetworkError, ReqwestErrorExt};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

pub const DEFAULT_BASE_URL: &str = "http://dataservice.accuweather.com";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Routecast/", env!("CARGO_PKG_VERSION"));

/// Endpoint settings shared by the geocoder and the forecast provider.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub metric: bool,
}

impl ApiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            metric: true,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_metric(mut self, metric: bool) -> Self {
        self.metric = metric;
        self
    }

    pub(crate) fn build_client(&self) -> Result<Client, ProviderError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::new("http client", e.into_network_error()))
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("metric", &self.metric)
            .finish()
    }
}

/// Send a request and decode a JSON body, mapping every failure to `ProviderError`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    context: &str,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::new(context, e.into_network_error()))?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "{}: upstream returned an error status", context);
        return Err(ProviderError::new(
            context,
            NetworkError::from_status(status.as_u16(), truncate(&text, 200)),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ProviderError::new(context, e.into_network_error()))?;

    serde_json::from_slice(&body).map_err(|e| ProviderError::malformed(context, e.to_string()))
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
