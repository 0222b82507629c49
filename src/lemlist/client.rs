use super::config::LemlistConfig;
use super::error::UpstreamError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

const USER_AGENT: &str = "outstack-api/0.1";
/// Longest server-dictated wait honoured before a retry.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

/// Build the HTTP client shared by every upstream call.
pub fn build_http_client(config: &LemlistConfig) -> Result<Client, UpstreamError> {
    let client = Client::builder()
        .connect_timeout(config.connect_timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Attempt budget and timing for one logical upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_retries: u32,
    /// Timeout of the first attempt; attempt `i` gets `base_timeout * (i + 1)`.
    pub base_timeout: Duration,
    /// Backoff unit; attempt `i` waits `retry_delay * 2^i` before the next one.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(base_timeout: Duration) -> Self {
        Self {
            max_retries: 3,
            base_timeout,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn timeout_for(&self, attempt: u32) -> Duration {
        self.base_timeout.saturating_mul(attempt.saturating_add(1))
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }
}

/// A single logical request against the upstream, relative to the base URL.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Authenticated lemlist API client with retry, backoff and timeout escalation.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct LemlistClient {
    http: Client,
    base_url: String,
    auth_header: HeaderValue,
    retry_delay: Duration,
}

impl LemlistClient {
    /// Fails with [`UpstreamError::Configuration`] when no API key is configured.
    pub fn new(http: Client, config: &LemlistConfig) -> Result<Self, UpstreamError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(UpstreamError::Configuration)?;
        let encoded = STANDARD.encode(format!(":{api_key}"));
        let auth_header = HeaderValue::from_str(&format!("Basic {encoded}"))
            .map_err(|_| UpstreamError::Configuration)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_header,
            retry_delay: config.retry_delay,
        })
    }

    /// Retry policy with the configured backoff unit and the given base timeout.
    pub fn policy(&self, base_timeout: Duration) -> RetryPolicy {
        RetryPolicy::new(base_timeout).with_retry_delay(self.retry_delay)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue `request`, retrying transient failures according to `policy`.
    ///
    /// * 429 waits for `Retry-After` (or the computed backoff) and retries.
    /// * 5xx, timeouts and transport errors back off exponentially and retry.
    /// * Any other 4xx fails immediately.
    ///
    /// The final attempt's error is returned once the budget is spent.
    pub async fn fetch(
        &self,
        request: &UpstreamRequest,
        policy: &RetryPolicy,
        operation: &str,
    ) -> Result<Response, UpstreamError> {
        let url = self.url(&request.path);
        let attempts = policy.max_retries.max(1);

        for attempt in 0..attempts {
            let has_next = attempt + 1 < attempts;
            let timeout = policy.timeout_for(attempt);
            debug!(
                "{operation}: {} {} (attempt {} of {}, timeout {:?})",
                request.method,
                request.path,
                attempt + 1,
                attempts,
                timeout
            );

            let sent = self
                .http
                .request(request.method.clone(), &url)
                .query(&request.query)
                .header(AUTHORIZATION, self.auth_header.clone())
                .timeout(timeout)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(err) => {
                    let err = if err.is_timeout() {
                        UpstreamError::Timeout(timeout)
                    } else {
                        UpstreamError::Transport(err)
                    };
                    if !has_next {
                        warn!("{operation}: {err} after {attempts} attempts");
                        return Err(err);
                    }
                    let wait = policy.backoff(attempt);
                    warn!(
                        "{operation}: {err}, retrying in {wait:?} (attempt {} of {})",
                        attempt + 1,
                        attempts
                    );
                    sleep(wait).await;
                    continue;
                }
            };

            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if !has_next {
                    warn!("{operation}: still rate limited after {attempts} attempts");
                    return Err(UpstreamError::RateLimited { attempts });
                }
                let wait = retry_after(&response).unwrap_or_else(|| policy.backoff(attempt));
                warn!(
                    "{operation}: rate limited (429), waiting {wait:?} before retry {} of {}",
                    attempt + 2,
                    attempts
                );
                sleep(wait).await;
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                if !has_next {
                    return Err(UpstreamError::server_status(status, body));
                }
                let wait = policy.backoff(attempt);
                warn!(
                    "{operation}: server error {status}, retrying in {wait:?} (attempt {} of {})",
                    attempt + 1,
                    attempts
                );
                sleep(wait).await;
                continue;
            }

            if status.is_client_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(UpstreamError::client_status(status, body));
            }

            return Ok(response);
        }

        Err(UpstreamError::RateLimited { attempts })
    }

    /// [`fetch`](Self::fetch) and decode the body as loose JSON.
    pub async fn fetch_json(
        &self,
        request: &UpstreamRequest,
        policy: &RetryPolicy,
        operation: &str,
    ) -> Result<Value, UpstreamError> {
        let response = self.fetch(request, policy, operation).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// `Retry-After` in delta-seconds. HTTP-date values fall back to the computed backoff.
fn retry_after(response: &Response) -> Option<Duration> {
    let raw = response.headers().get(RETRY_AFTER)?.to_str().ok()?;
    parse_retry_after(raw)
}

/// Delta-seconds, integer or fractional, clamped to [`MAX_RETRY_AFTER`].
fn parse_retry_after(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let wait = match raw.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => {
            let secs = raw.parse::<f64>().ok().filter(|secs| *secs >= 0.0)?;
            Duration::try_from_secs_f64(secs).unwrap_or(MAX_RETRY_AFTER)
        }
    };
    Some(wait.min(MAX_RETRY_AFTER))
}
