use crate::endpoints::path_for;
use async_trait::async_trait;
use compass::{CacheParams, Endpoint, HotelDataProvider};
use serde_json::Value;
use shared::config::Config;
use shared::{Error, Result};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_IDLE_PER_HOST: usize = 10;

#[derive(Clone, Debug)]
pub struct BookingClientConfig {
    pub api_key: String,
    pub api_host: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl BookingClientConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .rapidapi_key
            .clone()
            .ok_or_else(|| Error::Config("RAPIDAPI_KEY is required".into()))?;

        Ok(Self {
            api_key,
            api_host: config.rapidapi_host.clone(),
            base_url: config.booking_api_base_url.clone(),
            timeout: Duration::from_secs(config.booking_api_timeout_secs),
        })
    }
}

/// RapidAPI Booking.com client.
///
/// Failures are mapped onto [`shared::Error`]: an error status from upstream
/// becomes [`Error::Upstream`] with that status, no response at all becomes
/// [`Error::Unavailable`], anything else is [`Error::Internal`].
#[derive(Clone)]
pub struct BookingClient {
    http: reqwest::Client,
    config: BookingClientConfig,
}

impl BookingClient {
    pub fn new(config: BookingClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("RapidAPI key must not be empty".into()));
        }

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout))
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout.as_secs(),
            "Booking client ready"
        );
        Ok(Self { http, config })
    }

    fn url_for(&self, endpoint: Endpoint) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            path_for(endpoint)
        )
    }
}

#[async_trait]
impl HotelDataProvider for BookingClient {
    async fn fetch(&self, endpoint: Endpoint, params: &CacheParams) -> Result<Value> {
        let url = self.url_for(endpoint);
        let query: Vec<(&str, String)> = params
            .iter()
            .map(|(name, value)| (name.as_str(), query_value(value)))
            .collect();

        tracing::debug!(endpoint = endpoint.cache_type(), %url, "Calling upstream");

        let response = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", &self.config.api_key)
            .header("X-RapidAPI-Host", &self.config.api_host)
            .query(&query)
            .send()
            .await
            .map_err(send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "upstream request failed".to_string());
            tracing::warn!(
                endpoint = endpoint.cache_type(),
                status = status.as_u16(),
                "Upstream returned an error: {}",
                message
            );
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                Error::Unavailable(format!("timed out reading upstream body: {}", e))
            } else {
                Error::Internal(format!("invalid upstream response body: {}", e))
            }
        })
    }
}

impl std::fmt::Debug for BookingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingClient")
            .field("base_url", &self.config.base_url)
            .field("api_host", &self.config.api_host)
            .finish_non_exhaustive()
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_builder() {
        Error::Internal(format!("failed to build upstream request: {}", e))
    } else {
        // connect failures, timeouts and dropped connections
        Error::Unavailable(e.to_string())
    }
}

/// The `message` field of a JSON error body, or the trimmed body itself.
fn upstream_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = map.get("message") {
            return Some(message.clone());
        }
    }
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
