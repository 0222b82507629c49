use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Failures raised while talking to the lemlist API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("LEMLIST_API_KEY not configured")]
    Configuration,
    #[error("HTTP {status}: {body}")]
    ClientStatus { status: StatusCode, body: String },
    #[error("HTTP {status}: {body}")]
    ServerStatus { status: StatusCode, body: String },
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn client_status(status: StatusCode, body: String) -> Self {
        UpstreamError::ClientStatus { status, body }
    }

    pub fn server_status(status: StatusCode, body: String) -> Self {
        UpstreamError::ServerStatus { status, body }
    }

    /// Failures the fetch client retries locally before giving up.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UpstreamError::ServerStatus { .. }
                | UpstreamError::RateLimited { .. }
                | UpstreamError::Timeout(_)
                | UpstreamError::Transport(_)
        )
    }

    /// Non-retryable 4xx responses; these surface to the caller instead of
    /// degrading into partial results.
    pub fn is_client_error(&self) -> bool {
        matches!(self, UpstreamError::ClientStatus { .. })
    }

    /// The upstream refused the credential itself; every further call would fail the same way.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            UpstreamError::ClientStatus { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    /// Upstream status carried by the error, if the failure came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::ClientStatus { status, .. }
            | UpstreamError::ServerStatus { status, .. } => Some(*status),
            UpstreamError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }
}
