//! Gazetteer HTTP client
//!
//! This module is the only layer that talks to the network. It handles:
//! - Building a pooled keep-alive HTTP client with a fixed request timeout
//! - Appending the caller's API identity to every request
//! - Retrying transient network failures with a linearly growing delay
//! - Classifying everything else as terminal

use crate::config::ApiConfig;
use crate::model::{ApiStatus, ChildrenResponse, CountryInfoResponse};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;
use url::Url;

pub const COUNTRY_INFO_PATH: &str = "/countryInfoJSON";
pub const CHILDREN_PATH: &str = "/childrenJSON";

/// Retry schedule for transient failures
///
/// Retry `n` (1-based) waits `base_delay * n` before re-sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Delay before the given retry
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }
}

impl From<&ApiConfig> for RetryPolicy {
    fn from(config: &ApiConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}

/// Source of raw gazetteer records
///
/// [`GeonamesClient`] is the production implementation; the pipeline only
/// depends on this trait.
#[async_trait]
pub trait GeoSource: Send + Sync {
    /// Lists every country (`countryInfoJSON`)
    async fn country_info(&self, identity: &str) -> FetchResult<CountryInfoResponse>;

    /// Lists the direct children of a feature (`childrenJSON`)
    async fn children(&self, geoname_id: u64, identity: &str) -> FetchResult<ChildrenResponse>;
}

/// Builds the pooled HTTP client
///
/// # Example
///
/// ```no_run
/// use geo_atlas::config::ApiConfig;
/// use geo_atlas::crawler::build_http_client;
///
/// let client = build_http_client(&ApiConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ApiConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .user_agent(concat!("geo-atlas/", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .pool_max_idle_per_host(config.max_idle_connections)
        .tcp_keepalive(Duration::from_secs(60))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Whether a transport error is worth retrying
///
/// Only timeouts and connections dropped mid-flight are transient. DNS
/// failures, refused connections and TLS errors surface immediately. The io
/// error may sit several levels down the source chain.
pub fn is_transient_error(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }

    err.source().map_or(false, has_transient_cause)
}

/// Walks `err` and its sources looking for a reset or timed-out io error
fn has_transient_cause(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::TimedOut
            ) {
                return true;
            }
        }
        current = cause.source();
    }

    false
}

/// GeoNames web service client
#[derive(Debug, Clone)]
pub struct GeonamesClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl GeonamesClient {
    /// Creates a client from API configuration
    pub fn new(config: &ApiConfig) -> Result<Self, crate::AtlasError> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, &config.base_url, RetryPolicy::from(config)))
    }

    /// Creates a client around an existing `reqwest::Client`
    pub fn with_client(client: Client, base_url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Builds the request URL; `identity` is sent as the `username` parameter
    pub fn endpoint(&self, path: &str, query: &[(&str, String)], identity: &str) -> FetchResult<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidRequest {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("username", identity);
        }

        Ok(url)
    }

    /// GETs `path` and deserializes the JSON body
    ///
    /// # Arguments
    ///
    /// * `path` - Endpoint path relative to the base URL, e.g. `/childrenJSON`
    /// * `query` - Query parameters, without the identity
    /// * `identity` - API username sent as `username`
    ///
    /// # Returns
    ///
    /// * `Ok(T)` - The decoded body
    /// * `Err(FetchError)` - A terminal failure, or [`FetchError::Exhausted`]
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Timeout / connection reset | Retry up to `max_retries`, `base_delay * n` |
    /// | DNS, refused connect, TLS | Immediate failure |
    /// | Non-2xx status | Immediate failure |
    /// | Malformed body | Immediate failure |
    /// | GeoNames `status` payload | Immediate failure |
    ///
    /// After the last retry a transient failure surfaces as
    /// [`FetchError::Exhausted`].
    pub async fn fetch<T>(&self, path: &str, query: &[(&str, String)], identity: &str) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        // Build the URL once; it is identical for every attempt
        let url = self.endpoint(path, query, identity)?;

        let mut attempt: u32 = 1;
        loop {
            let err = match self.fetch_once(path, &url).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            // Status, decode and API errors never improve on retry
            if !err.is_transient() {
                return Err(err);
            }

            // Out of retries
            if attempt > self.retry.max_retries {
                return Err(exhausted(err, attempt));
            }

            // Back off linearly before the next attempt
            let delay = self.retry.delay_for(attempt);
            tracing::warn!(
                "Transient failure on {} ({}), retry {}/{} in {:?}",
                path,
                err,
                attempt,
                self.retry.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn fetch_once<T>(&self, path: &str, url: &Url) -> FetchResult<T>
    where
        T: DeserializeOwned,
    {
        tracing::debug!("GET {}", path);

        let transport = |source| FetchError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;

        // Any non-2xx status is terminal
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        // Read the full body; a reset here is still a transport error
        let body = response.text().await.map_err(transport)?;
        decode_body(path, &body)
    }
}

/// Parses a response body, surfacing GeoNames' in-band error payload
pub fn decode_body<T>(path: &str, body: &str) -> FetchResult<T>
where
    T: DeserializeOwned,
{
    let decode = |e: serde_json::Error| FetchError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(body).map_err(decode)?;

    if let Some(status) = value.get("status") {
        let status: ApiStatus = serde_json::from_value(status.clone()).map_err(decode)?;
        return Err(FetchError::Api {
            path: path.to_string(),
            code: status.value,
            message: status.message,
        });
    }

    serde_json::from_value(value).map_err(decode)
}

fn exhausted(err: FetchError, attempts: u32) -> FetchError {
    match err {
        FetchError::Transport { path, source } => FetchError::Exhausted {
            path,
            attempts,
            source,
        },
        other => other,
    }
}

#[async_trait]
impl GeoSource for GeonamesClient {
    async fn country_info(&self, identity: &str) -> FetchResult<CountryInfoResponse> {
        self.fetch(COUNTRY_INFO_PATH, &[], identity).await
    }

    async fn children(&self, geoname_id: u64, identity: &str) -> FetchResult<ChildrenResponse> {
        self.fetch(CHILDREN_PATH, &[("geonameId", geoname_id.to_string())], identity)
            .await
    }
}
