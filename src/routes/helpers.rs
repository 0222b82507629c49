//! Shared helpers for Rocket route handlers.

use crate::error::ApiError;
use crate::lemlist::{LemlistClient, LemlistConfig, UpstreamError};

/// Upstream access shared by every request: immutable config plus one
/// connection pool.
#[derive(Debug, Clone)]
pub struct LemlistState {
    pub config: LemlistConfig,
    pub http: reqwest::Client,
}

impl LemlistState {
    pub fn new(config: LemlistConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Authenticated client for one request.
    ///
    /// Returns [`ApiError::Configuration`] when no API key is configured.
    pub fn client(&self) -> Result<LemlistClient, ApiError> {
        LemlistClient::new(self.http.clone(), &self.config).map_err(|err| match err {
            UpstreamError::Configuration => ApiError::configuration(),
            other => ApiError::InternalError(other.to_string()),
        })
    }
}
