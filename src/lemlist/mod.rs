//! lemlist upstream access: configuration, the retrying HTTP client, the
//! page walker and the loose record types it yields.

pub mod actions;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod types;

pub use actions::{UpstreamAction, perform};
pub use client::{LemlistClient, RetryPolicy, UpstreamRequest, build_http_client};
pub use config::LemlistConfig;
pub use error::UpstreamError;
pub use pagination::{Collected, Listing, Page, PageMode, collect};
