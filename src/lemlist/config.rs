use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.lemlist.com/api";

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secret(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Connection settings for the lemlist upstream.
///
/// Built once at startup and handed to every [`LemlistClient`](super::LemlistClient)
/// by value; nothing reads the environment after ignite.
#[derive(Debug, Clone)]
pub struct LemlistConfig {
    /// Static API key. `None` makes every upstream-backed route refuse to run.
    pub api_key: Option<String>,
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Base delay for exponential backoff between attempts.
    pub retry_delay: Duration,
    /// Campaigns processed concurrently per dashboard batch.
    pub dashboard_batch_size: usize,
    /// Upper bound on pages walked per activity feed.
    pub activity_max_pages: usize,
}

impl LemlistConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_secret("LEMLIST_API_KEY"),
            base_url: env_string("LEMLIST_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            connect_timeout: env_duration_millis("LEMLIST_CONNECT_TIMEOUT_MS", 10_000),
            retry_delay: env_duration_millis("LEMLIST_RETRY_DELAY_MS", 1_000),
            dashboard_batch_size: env_usize("DASHBOARD_BATCH_SIZE", 2).max(1),
            activity_max_pages: env_usize("ACTIVITY_MAX_PAGES", 100).max(1),
        }
    }

    /// Config pointing at an arbitrary base URL, used by tests and the report CLI.
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            connect_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_secs(1),
            dashboard_batch_size: 2,
            activity_max_pages: 100,
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for LemlistConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
