use super::metrics::{Engagement, LeadSummary, build_metrics};
use crate::lemlist::types::{Campaign, Lead, decode_records};
use crate::lemlist::{Collected, LemlistClient, Listing, collect};
use crate::models::{CampaignMetrics, CampaignStatus};
use crate::orchestrator::UnitOutcome;
use log::{debug, error, info, warn};
use std::time::Instant;
use tokio::task::{JoinError, JoinHandle};

pub const ACTIVITY_SENT: &str = "emailsSent";
pub const ACTIVITY_OPENED: &str = "emailsOpened";
pub const ACTIVITY_REPLIED: &str = "emailsReplied";
pub const ACTIVITY_CLICKED: &str = "emailsClicked";

const UNNAMED_CAMPAIGN: &str = "Unnamed Campaign";

/// Computes one [`CampaignMetrics`] row per campaign.
#[derive(Debug, Clone)]
pub struct CampaignAggregator {
    client: LemlistClient,
    activity_max_pages: usize,
}

impl CampaignAggregator {
    pub fn new(client: LemlistClient, activity_max_pages: usize) -> Self {
        Self {
            client,
            activity_max_pages: activity_max_pages.max(1),
        }
    }

    /// Build the row for `campaign` (`idx` of `total`, for progress logs).
    ///
    /// A campaign whose lead export cannot be fetched is skipped. Activity
    /// feeds degrade individually to empty lists.
    pub async fn process(
        &self,
        campaign: &Campaign,
        idx: usize,
        total: usize,
    ) -> UnitOutcome<CampaignMetrics> {
        let name = campaign.name_or(UNNAMED_CAMPAIGN);
        let Some(id) = campaign.id() else {
            info!("[{idx}/{total}] Skipping campaign with no ID: {name}");
            return UnitOutcome::Skip(format!("campaign '{name}' has no id"));
        };

        info!("[{idx}/{total}] Processing campaign: {name} (ID: {id})");
        let started = Instant::now();

        let leads = collect(&self.client, &Listing::leads_export(&self.client, id, name)).await;
        if let Some(err) = leads.failure {
            if err.is_auth_rejection() {
                warn!("[{idx}/{total}] Access to leads of {name} was refused: {err}, skipping campaign");
            } else {
                warn!("[{idx}/{total}] Failed to fetch leads for {name}: {err}, skipping campaign");
            }
            return UnitOutcome::Skip(format!("leads for '{name}' ({id}): {err}"));
        }

        let leads: Vec<Lead> = decode_records(leads.records, "lead");
        let summary = LeadSummary::from_leads(&leads);
        info!(
            "[{idx}/{total}] Campaign {name}: {} active leads (out of {} total)",
            summary.active, summary.total
        );
        if summary.campaign_status() == CampaignStatus::Ended {
            debug!(
                "[{idx}/{total}] Campaign {name} marked as ended with {} active leads",
                summary.active
            );
        }

        let activities_started = Instant::now();
        let engagement =
            engagement_or_zero(self.fetch_engagement(id, name, idx, total).await, id, name, idx, total);
        info!(
            "[{idx}/{total}] Campaign {name} activities: {} reached, {} opened, {} replied (activities: {:.1}s, total: {:.1}s)",
            engagement.reached,
            engagement.opened,
            engagement.replied,
            activities_started.elapsed().as_secs_f64(),
            started.elapsed().as_secs_f64()
        );

        let metrics = build_metrics(id, name, &summary, &engagement);
        info!(
            "[{idx}/{total}] Processed {name}: {} leads, {} companies, {} engaged, {}% open, {}% reply ({:.1}s)",
            metrics.people_count,
            metrics.companies_count,
            metrics.people_engaged,
            metrics.open_rate,
            metrics.reply_rate,
            started.elapsed().as_secs_f64()
        );
        UnitOutcome::Success(metrics)
    }

    /// Walk the four activity feeds of one campaign concurrently.
    ///
    /// Each feed runs as its own task; an `Err` means the join itself failed
    /// and none of the counts can be trusted.
    async fn fetch_engagement(
        &self,
        id: &str,
        name: &str,
        idx: usize,
        total: usize,
    ) -> Result<Engagement, JoinError> {
        let feed = |activity_type: &str| {
            let client = self.client.clone();
            let listing =
                Listing::activities(&client, id, name, activity_type, self.activity_max_pages);
            tokio::spawn(async move { collect(&client, &listing).await })
        };

        let feeds = FeedHandles {
            sent: feed(ACTIVITY_SENT),
            opened: feed(ACTIVITY_OPENED),
            replied: feed(ACTIVITY_REPLIED),
            clicked: feed(ACTIVITY_CLICKED),
        };
        join_feeds(feeds, name, idx, total).await
    }
}

/// The four spawned activity walks of one campaign.
struct FeedHandles {
    sent: JoinHandle<Collected>,
    opened: JoinHandle<Collected>,
    replied: JoinHandle<Collected>,
    clicked: JoinHandle<Collected>,
}

/// Wait for every feed. Individual feed failures only produce warnings;
/// a task that fails to join fails the whole set.
async fn join_feeds(
    feeds: FeedHandles,
    name: &str,
    idx: usize,
    total: usize,
) -> Result<Engagement, JoinError> {
    let (sent, opened, replied, clicked) =
        tokio::try_join!(feeds.sent, feeds.opened, feeds.replied, feeds.clicked)?;

    let warnings: Vec<String> = [
        (ACTIVITY_SENT, &sent),
        (ACTIVITY_OPENED, &opened),
        (ACTIVITY_REPLIED, &replied),
    ]
    .into_iter()
    .filter_map(|(activity_type, collected)| feed_warning(activity_type, collected))
    .collect();

    if !warnings.is_empty() {
        warn!(
            "[{idx}/{total}] Campaign {name} had {} activity fetch errors (continuing with partial data): {}",
            warnings.len(),
            warnings.join("; ")
        );
    }

    Ok(Engagement::from_feeds(
        &sent.records,
        &opened.records,
        &replied.records,
        &clicked.records,
    ))
}

/// Stats that could not be gathered at all count as zero; the row is still emitted.
fn engagement_or_zero(
    joined: Result<Engagement, JoinError>,
    id: &str,
    name: &str,
    idx: usize,
    total: usize,
) -> Engagement {
    match joined {
        Ok(engagement) => engagement,
        Err(err) => {
            error!("[{idx}/{total}] ERROR: Could not fetch stats for campaign {name} ({id}): {err}");
            Engagement::default()
        }
    }
}

fn feed_warning(activity_type: &str, collected: &Collected) -> Option<String> {
    collected.failure.as_ref().map(|err| {
        format!(
            "{activity_type} stopped after {} pages: {err}",
            collected.pages
        )
    })
}
