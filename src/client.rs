//! The API client: retrying single-request fetch and batch fetch.
//!
//! [`Client`] is the main entry point. It is cheap to clone, shares one
//! lazily-created connection pool across clones, and applies the configured
//! retry policy to every request. Use [`ClientBuilder`] to configure one.

use crate::endpoint::Endpoint;
use crate::rate_limit;
use crate::retry::RetryPolicy;
use crate::{batch, Error, Response, Result};
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Base URL of the stats API.
pub const DEFAULT_BASE_URL: &str = "https://stats.nba.com/stats";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on concurrently in-flight batch requests.
const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// An async client for the NBA Stats API.
///
/// The client retries transient failures (network errors, HTTP 429, HTTP
/// 5xx) with full-jitter exponential backoff, honors server rate-limit
/// hints, and fans batches out under a bounded concurrency gate while
/// preserving input order.
///
/// # Examples
///
/// ```no_run
/// use courtside::{Client, RetryPolicy};
/// use courtside::endpoints::{LeagueGameLog, SeasonType};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), courtside::Error> {
/// let client = Client::builder()
///     .timeout(Duration::from_secs(20))
///     .max_retries(5)
///     .concurrency_limit(4)
///     .build()?;
///
/// let log = LeagueGameLog::new("2024-25", SeasonType::RegularSeason);
/// let response = client.get(&log).await?;
/// println!("{} game-log rows", response.data.len());
///
/// client.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    pool: Mutex<PoolState>,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    retry: RetryPolicy,
    concurrency_limit: usize,
    cancel: CancellationToken,
}

/// The connection pool is created on first use and torn down by
/// [`Client::close`]; `owned` marks whether this layer created it.
struct PoolState {
    http: Option<reqwest::Client>,
    owned: bool,
}

impl Client {
    /// Creates a new [`ClientBuilder`] with default settings.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Fetches one endpoint to completion: a decoded, validated response or
    /// a terminal error.
    ///
    /// Transient failures are retried under the configured [`RetryPolicy`];
    /// fatal failures (non-429 4xx, decode errors) propagate immediately
    /// without consuming a retry. After exhaustion the error from the final
    /// attempt is surfaced unchanged.
    pub async fn get<E: Endpoint>(&self, endpoint: &E) -> Result<Response<E::Response>> {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            tracing::debug!(
                path = %endpoint.path(),
                attempt = attempts,
                params = ?endpoint.params(),
                "issuing request"
            );

            match self.attempt(endpoint, attempts).await {
                Ok((data, status)) => {
                    let latency = start.elapsed();
                    tracing::debug!(
                        path = %endpoint.path(),
                        status = status.as_u16(),
                        attempts,
                        latency_ms = latency.as_millis() as u64,
                        "request succeeded"
                    );
                    return Ok(Response::new(data, status, latency, attempts));
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if !self.inner.retry.allows_retry(attempts) {
                        tracing::warn!(
                            path = %endpoint.path(),
                            attempts,
                            error = %e,
                            "retries exhausted"
                        );
                        return Err(e);
                    }

                    let hint = e.retry_after();
                    let delay = self.inner.retry.backoff_delay(attempts, hint);
                    tracing::info!(
                        path = %endpoint.path(),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        rate_limited = hint.is_some(),
                        "retrying after backoff"
                    );
                    self.backoff_sleep(delay).await?;
                }
            }
        }
    }

    /// Fetches many endpoints concurrently, bounded by the configured
    /// concurrency limit, returning results in input order.
    ///
    /// The batch is all-or-nothing: if any request fails terminally the
    /// whole batch fails with [`Error::Batch`] aggregating every failure,
    /// though sibling requests are allowed to run to completion first.
    pub async fn get_many<E>(&self, endpoints: &[E]) -> Result<Vec<Response<E::Response>>>
    where
        E: Endpoint + Sync,
    {
        batch::fetch_all(self, endpoints, self.inner.concurrency_limit).await
    }

    /// Shuts down the client-owned connection pool.
    ///
    /// Idempotent: closing twice is a no-op. A pool supplied by the caller
    /// via [`ClientBuilder::http_client`] is never torn down here. A closed
    /// client lazily re-creates its pool if used again.
    pub async fn close(&self) {
        let mut state = self.inner.pool.lock().await;
        if state.owned && state.http.take().is_some() {
            tracing::debug!("connection pool closed");
        }
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.inner.cancel
    }

    /// One HTTP attempt: send, classify the outcome, decode on success.
    async fn attempt<E: Endpoint>(
        &self,
        endpoint: &E,
        attempt: u32,
    ) -> Result<(E::Response, StatusCode)> {
        let path = endpoint.path();
        let http = self.http_pool().await?;
        let url = self.request_url(endpoint)?;

        let request = http
            .get(url)
            .headers(self.inner.headers.clone())
            .timeout(self.inner.timeout);

        let response = tokio::select! {
            _ = self.inner.cancel.cancelled() => return Err(Error::Cancelled),
            sent = request.send() => sent.map_err(|e| Error::Network {
                path: path.to_string(),
                source: e,
                attempts: attempt,
            })?,
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let hint = rate_limit::retry_hint(response.headers());
            tracing::warn!(
                path = %path,
                attempt,
                hint_ms = hint.map(|h| h.as_millis() as u64),
                "rate limited by server"
            );
            return Err(Error::RateLimited {
                path: path.to_string(),
                retry_after: hint,
                attempts: attempt,
            });
        }
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = status.as_u16(), attempt, "server error");
            return Err(Error::Server {
                status,
                path: path.to_string(),
                body,
                attempts: attempt,
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = status.as_u16(), "client error");
            return Err(Error::Client {
                status,
                path: path.to_string(),
                body,
            });
        }

        let body = tokio::select! {
            _ = self.inner.cancel.cancelled() => return Err(Error::Cancelled),
            text = response.text() => text.map_err(|e| Error::Network {
                path: path.to_string(),
                source: e,
                attempts: attempt,
            })?,
        };

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(path = %path, error = %e, "response is not valid JSON");
            Error::Decode {
                context: path.to_string(),
                detail: e.to_string(),
                raw: body.clone(),
            }
        })?;

        let data = endpoint.decode(&value).map_err(|e| {
            tracing::error!(path = %path, error = %e, "failed to decode response");
            // Normalization errors have no body attached; keep it here.
            match e {
                Error::Decode {
                    context,
                    detail,
                    raw,
                } if raw.is_empty() => Error::Decode {
                    context,
                    detail,
                    raw: body.clone(),
                },
                other => other,
            }
        })?;

        Ok((data, status))
    }

    /// Waits out a backoff delay, abandoning the wait on cancellation.
    async fn backoff_sleep(&self, delay: Duration) -> Result<()> {
        tokio::select! {
            _ = self.inner.cancel.cancelled() => Err(Error::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    /// Hands out the shared pool, creating it on first use.
    async fn http_pool(&self) -> Result<reqwest::Client> {
        let mut state = self.inner.pool.lock().await;
        if let Some(http) = &state.http {
            return Ok(http.clone());
        }
        tracing::debug!("creating connection pool");
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        state.http = Some(http.clone());
        Ok(http)
    }

    fn request_url<E: Endpoint>(&self, endpoint: &E) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.inner.base_url, endpoint.path()))?;
        for (key, value) in endpoint.params() {
            url.query_pairs_mut().append_pair(&key, &value);
        }
        Ok(url)
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Every knob is independently overridable; the defaults match the upstream
/// API's tolerances (30 s timeout, 3 retries, 1–10 s backoff, 10-wide
/// concurrency gate).
///
/// # Examples
///
/// ```no_run
/// use courtside::{Client, CancellationToken, RetryPolicy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), courtside::Error> {
/// let shutdown = CancellationToken::new();
/// let client = Client::builder()
///     .base_url("https://stats.example.com/stats")
///     .timeout(Duration::from_secs(15))
///     .retry_policy(RetryPolicy {
///         max_retries: 2,
///         base_delay: Duration::from_millis(500),
///         ..RetryPolicy::default()
///     })
///     .cancellation_token(shutdown.clone())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    retry: RetryPolicy,
    concurrency_limit: usize,
    cancel: CancellationToken,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: default_headers(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            cancel: CancellationToken::new(),
            http: None,
        }
    }

    /// Overrides the API base URL. Validated when the client is built.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets or replaces a default request header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::Config(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::Config(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count (total attempts = retries + 1).
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Sets the backoff ceiling for the first retry.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.retry.base_delay = base_delay;
        self
    }

    /// Sets the upper bound on the backoff ceiling.
    pub fn max_delay(mut self, max_delay: Duration) -> Self {
        self.retry.max_delay = max_delay;
        self
    }

    /// Caps how long a server rate-limit hint may stretch the wait.
    pub fn max_hint_wait(mut self, max_hint_wait: Duration) -> Self {
        self.retry.max_hint_wait = max_hint_wait;
        self
    }

    /// Replaces the whole retry policy at once.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the batch concurrency gate size.
    pub fn concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit;
        self
    }

    /// Propagates a cancellation token into every attempt, backoff sleep,
    /// and gate wait issued by the client.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Supplies an externally-owned connection pool.
    ///
    /// The client will use it as-is and never tear it down; default headers
    /// configured here still apply per request.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Builds the configured [`Client`].
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the concurrency
    /// limit is zero.
    pub fn build(self) -> Result<Client> {
        Url::parse(&self.base_url)?;
        if self.concurrency_limit == 0 {
            return Err(Error::Config(
                "concurrency limit must be at least 1".to_string(),
            ));
        }

        let owned = self.http.is_none();
        Ok(Client {
            inner: Arc::new(ClientInner {
                pool: Mutex::new(PoolState {
                    http: self.http,
                    owned,
                }),
                base_url: self.base_url.trim_end_matches('/').to_string(),
                headers: self.headers,
                timeout: self.timeout,
                retry: self.retry,
                concurrency_limit: self.concurrency_limit,
                cancel: self.cancel,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The stats API refuses requests that do not look like a browser session,
/// so these ship as defaults. All of them can be replaced via
/// [`ClientBuilder::header`].
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://stats.nba.com/"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/113.0",
        ),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Descriptor;

    #[test]
    fn build_rejects_invalid_base_url() {
        let result = Client::builder().base_url("not a url").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn build_rejects_zero_concurrency() {
        let result = Client::builder().concurrency_limit(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn request_url_serializes_params_in_order() {
        let client = Client::builder()
            .base_url("https://stats.example.com/stats/")
            .build()
            .unwrap();
        let endpoint: Descriptor<Value> = Descriptor::new("leaguegamelog")
            .param("Season", "2024-25")
            .param("Counter", 0)
            .param("LeagueID", "00");

        let url = client.request_url(&endpoint).unwrap();
        assert_eq!(
            url.as_str(),
            "https://stats.example.com/stats/leaguegamelog?Season=2024-25&Counter=0&LeagueID=00"
        );
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let client = Client::builder().build().unwrap();
        let _ = client.http_pool().await.unwrap();
        client.close().await;
        client.close().await;
        // A closed client lazily re-creates its pool.
        let _ = client.http_pool().await.unwrap();
    }

    #[tokio::test]
    async fn external_pool_survives_close() {
        let external = reqwest::Client::new();
        let client = Client::builder().http_client(external).build().unwrap();
        client.close().await;
        let state = client.inner.pool.lock().await;
        assert!(state.http.is_some());
        assert!(!state.owned);
    }
}
