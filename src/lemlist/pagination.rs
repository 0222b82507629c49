//! Offset-paged listing walker.
//!
//! lemlist endpoints answer either with a bare JSON array or with an
//! envelope object (`{"campaigns": [...], "pagination": {...}}`). Each page
//! body is classified once into a [`Page`] here so callers only ever see an
//! ordered `Vec` of records.

use super::client::{LemlistClient, RetryPolicy, UpstreamRequest};
use super::error::UpstreamError;
use log::debug;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: usize = 100;

const CAMPAIGN_KEYS: &[&str] = &["campaigns"];
const LEAD_KEYS: &[&str] = &["leads", "data"];

/// One page body, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Bare(Vec<Value>),
    Envelope {
        items: Vec<Value>,
        total_pages: Option<u64>,
    },
    Unrecognized,
}

impl Page {
    /// Classify `body`. Envelope records come from the first of `record_keys`
    /// holding a non-empty array, falling back to the first one holding any array.
    pub fn detect(body: Value, record_keys: &[&str]) -> Page {
        match body {
            Value::Array(items) => Page::Bare(items),
            Value::Object(mut map) => {
                let total_pages = map
                    .get("pagination")
                    .and_then(|pagination| pagination.get("totalPages"))
                    .and_then(Value::as_u64);

                let mut fallback = None;
                for key in record_keys {
                    if let Some(Value::Array(items)) = map.remove(*key) {
                        if !items.is_empty() {
                            return Page::Envelope { items, total_pages };
                        }
                        fallback.get_or_insert(items);
                    }
                }

                match fallback {
                    Some(items) => Page::Envelope { items, total_pages },
                    None => Page::Unrecognized,
                }
            }
            _ => Page::Unrecognized,
        }
    }
}

/// How a listing is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// One call, no offset parameters (the leads export returns everything at once).
    Single,
    Offset {
        page_size: usize,
        max_pages: Option<usize>,
    },
}

/// A listing endpoint plus everything needed to walk it.
#[derive(Debug, Clone)]
pub struct Listing {
    pub request: UpstreamRequest,
    pub record_keys: &'static [&'static str],
    pub mode: PageMode,
    pub policy: RetryPolicy,
    pub label: String,
}

impl Listing {
    /// `/campaigns`, optionally filtered by upstream status.
    pub fn campaigns(client: &LemlistClient, status: Option<&str>) -> Self {
        let mut request = UpstreamRequest::get("campaigns");
        if let Some(status) = status {
            request = request.param("status", status);
        }
        let label = match status {
            Some(status) => format!("fetching {status} campaigns"),
            None => "fetching campaigns".to_string(),
        };
        Self {
            request,
            record_keys: CAMPAIGN_KEYS,
            mode: PageMode::Offset {
                page_size: DEFAULT_PAGE_SIZE,
                max_pages: None,
            },
            policy: client.policy(Duration::from_secs(60)),
            label,
        }
    }

    /// Full lead export of one campaign.
    pub fn leads_export(client: &LemlistClient, campaign_id: &str, campaign_name: &str) -> Self {
        Self {
            request: UpstreamRequest::get(format!("campaigns/{campaign_id}/export/leads"))
                .param("state", "all")
                .param("format", "json"),
            record_keys: LEAD_KEYS,
            mode: PageMode::Single,
            policy: client.policy(Duration::from_secs(90)),
            label: format!("fetching leads for {campaign_name}"),
        }
    }

    /// One activity feed (`emailsSent`, `emailsOpened`, ...) of one campaign.
    pub fn activities(
        client: &LemlistClient,
        campaign_id: &str,
        campaign_name: &str,
        activity_type: &str,
        max_pages: usize,
    ) -> Self {
        Self {
            request: UpstreamRequest::get("activities")
                .param("campaignId", campaign_id)
                .param("type", activity_type),
            record_keys: &[],
            mode: PageMode::Offset {
                page_size: DEFAULT_PAGE_SIZE,
                max_pages: Some(max_pages),
            },
            policy: client.policy(Duration::from_secs(60)).with_max_retries(2),
            label: format!("fetching {activity_type} for {campaign_name}"),
        }
    }
}

/// Records gathered by a walk, plus the failure that ended it early, if any.
#[derive(Debug, Default)]
pub struct Collected {
    pub records: Vec<Value>,
    pub pages: usize,
    pub failure: Option<UpstreamError>,
}

impl Collected {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Walk `listing` page by page. Pages are requested strictly in order; a
/// failed page ends the walk and keeps what was gathered so far.
pub async fn collect(client: &LemlistClient, listing: &Listing) -> Collected {
    let mut collected = Collected::default();
    let mut page = 0usize;

    loop {
        let request = match listing.mode {
            PageMode::Single => listing.request.clone(),
            PageMode::Offset {
                page_size,
                max_pages,
            } => {
                if max_pages.is_some_and(|max| page >= max) {
                    debug!("{}: stopping at page cap {page}", listing.label);
                    break;
                }
                listing
                    .request
                    .clone()
                    .param("offset", page * page_size)
                    .param("limit", page_size)
            }
        };

        let operation = format!("{} page {page}", listing.label);
        let body = match client.fetch_json(&request, &listing.policy, &operation).await {
            Ok(body) => body,
            Err(err) => {
                debug!(
                    "{operation} failed: {err}; keeping {} records",
                    collected.records.len()
                );
                collected.failure = Some(err);
                break;
            }
        };
        collected.pages += 1;

        let (items, total_pages) = match Page::detect(body, listing.record_keys) {
            Page::Bare(items) => (items, None),
            Page::Envelope { items, total_pages } => (items, Some(total_pages.unwrap_or(1))),
            Page::Unrecognized => {
                debug!("{operation}: unexpected response shape, stopping");
                break;
            }
        };

        let fetched = items.len();
        collected.records.extend(items);

        let PageMode::Offset { page_size, .. } = listing.mode else {
            break;
        };
        if fetched < page_size {
            break;
        }
        if total_pages.is_some_and(|total| (page as u64) + 1 >= total) {
            break;
        }
        page += 1;
    }

    collected
}
