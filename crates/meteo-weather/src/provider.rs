//! HTTP fetch client for the forecast endpoint.

use async_trait::async_trait;
use meteo_core::WeatherConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::instrument;

use crate::error::{FetchError, TIMEOUT_STATUS};
use crate::reshape::reshape;
use crate::types::{FetchParams, RawWeatherResponse, StructuredWeather};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn request parameters into a structured result.
///
/// Implementations report every failure as a `FetchError` value.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(&self, params: &FetchParams) -> Result<StructuredWeather, FetchError>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl WeatherProvider {
    /// Provider for the public endpoint with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_endpoint(meteo_core::config::DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_endpoint(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self, FetchError> {
        Self::with_endpoint(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn request(&self, params: &FetchParams) -> Result<StructuredWeather, FetchError> {
        let resolved = params.resolved();

        let request = self
            .client
            .get(&self.base_url)
            .query(&resolved.query_pairs())
            .build()
            .map_err(|e| FetchError::unknown(e.to_string()))?;
        tracing::debug!("GET {}", request.url());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        let raw: RawWeatherResponse = serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!("Malformed weather response: {}", e);
            FetchError::unknown(format!("Malformed response body: {e}"))
        })?;

        Ok(reshape(&raw, resolved.past_days, resolved.forecast_days))
    }

    fn transport_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            tracing::warn!("Weather request timed out after {:?}", self.timeout);
            FetchError::timeout()
        } else {
            tracing::warn!("Weather request failed: {}", err);
            FetchError::unknown(err.to_string())
        }
    }
}

/// Classify a non-2xx status.
fn status_error(status: StatusCode) -> FetchError {
    let code = status.as_u16();
    tracing::warn!("Weather service returned {}", status);

    if code == TIMEOUT_STATUS {
        FetchError::timeout()
    } else if status.is_server_error() {
        FetchError::server(code)
    } else if status.is_client_error() {
        FetchError::client(code)
    } else {
        FetchError::unexpected_status(code)
    }
}

#[async_trait]
impl WeatherFetcher for WeatherProvider {
    #[instrument(skip(self), level = "info")]
    async fn fetch(&self, params: &FetchParams) -> Result<StructuredWeather, FetchError> {
        let result = self.request(params).await;
        if let Ok(weather) = &result {
            tracing::info!(
                "Fetched weather for {}, {} ({} forecast days)",
                weather.latitude,
                weather.longitude,
                weather.forecast.len()
            );
        }
        result
    }
}
