//! Campaign performance dashboard.
//!
//! Lists running campaigns, then computes each campaign's row in small
//! concurrent batches through [`CampaignAggregator`].

pub mod aggregator;
pub mod metrics;

pub use aggregator::CampaignAggregator;
pub use metrics::{Engagement, LeadSummary};

use crate::lemlist::types::{Campaign, decode_records};
use crate::lemlist::{LemlistClient, LemlistConfig, Listing, UpstreamError, collect};
use crate::models::CampaignMetrics;
use crate::orchestrator::run_in_batches;
use log::{info, warn};
use std::time::Instant;

/// Fetch running campaigns and compute their dashboard rows, in listing order.
///
/// Campaigns that fail individually are left out, whatever the status of
/// their failure. Errors are returned only when the listing itself is refused.
pub async fn build_dashboard(
    client: &LemlistClient,
    config: &LemlistConfig,
) -> Result<Vec<CampaignMetrics>, UpstreamError> {
    let started = Instant::now();
    info!("Starting campaigns dashboard fetch");

    let listing = collect(client, &Listing::campaigns(client, Some("running"))).await;
    if let Some(err) = listing.failure {
        if err.is_client_error() {
            return Err(err);
        }
        warn!(
            "campaign listing stopped early ({err}); continuing with {} campaigns",
            listing.records.len()
        );
    }

    let campaigns: Vec<Campaign> = decode_records(listing.records, "campaign");
    info!("Processing {} campaigns...", campaigns.len());

    let aggregator = CampaignAggregator::new(client.clone(), config.activity_max_pages);
    let report = run_in_batches(&campaigns, config.dashboard_batch_size, |campaign, idx, total| {
        aggregator.process(campaign, idx, total)
    })
    .await;

    if let Some(err) = report.fatal {
        return Err(err);
    }

    let elapsed = started.elapsed().as_secs_f64();
    let processed = report.results.len();
    let average = if processed > 0 {
        elapsed / processed as f64
    } else {
        0.0
    };
    info!(
        "Completed processing: {processed}/{} campaigns returned in {elapsed:.1}s (avg {average:.1}s per campaign)",
        campaigns.len()
    );
    if !report.skipped.is_empty() {
        warn!(
            "{} campaigns were skipped due to errors: {}",
            report.skipped.len(),
            report.skipped.join("; ")
        );
    }

    Ok(report.results)
}
