//! Mailbox utilization report.
//!
//! Cross-references the team's mailboxes with the senders of every campaign
//! to tell which mailboxes are busy, warming up, both, or idle.

pub mod resolver;

pub use resolver::{MailboxReport, SenderIndex, resolve_mailboxes};

use crate::dashboard::LeadSummary;
use crate::lemlist::types::{
    Campaign, CampaignDetail, Lead, Mailbox, TeamSender, decode_records,
};
use crate::lemlist::{LemlistClient, Listing, UpstreamError, UpstreamRequest, collect};
use crate::models::MailboxStatus;
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;

const UNKNOWN_CAMPAIGN: &str = "Unknown Campaign";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);
const DETAIL_TIMEOUT: Duration = Duration::from_secs(60);

/// Build the sorted mailbox report.
pub async fn build_mailbox_report(
    client: &LemlistClient,
) -> Result<Vec<MailboxStatus>, UpstreamError> {
    let Some(mailboxes) = fetch_mailboxes(client).await? else {
        return Ok(Vec::new());
    };

    let index = index_senders(client).await?;
    let report = resolve_mailboxes(&index, &mailboxes);

    info!(
        "Returning {} mailboxes (skipped {} without email)",
        report.statuses.len(),
        report.skipped_without_email
    );
    info!("Status breakdown: {:?}", report.status_counts());
    info!("Emails in use: {} unique emails", index.emails_in_use.len());

    Ok(report.statuses)
}

/// Mailboxes of the team's user. `None` when the team has no usable sender.
pub async fn fetch_mailboxes(
    client: &LemlistClient,
) -> Result<Option<Vec<Mailbox>>, UpstreamError> {
    let policy = client.policy(LOOKUP_TIMEOUT);

    let senders = client
        .fetch_json(
            &UpstreamRequest::get("team/senders"),
            &policy,
            "fetching team senders",
        )
        .await?;
    let first_sender = match senders {
        Value::Array(senders) if !senders.is_empty() => senders.into_iter().next(),
        _ => None,
    };
    let Some(first_sender) = first_sender else {
        warn!("No team senders found or invalid format");
        return Ok(None);
    };

    let user_id = serde_json::from_value::<TeamSender>(first_sender)
        .ok()
        .and_then(|sender| sender.user_id)
        .filter(|user_id| !user_id.is_empty());
    let Some(user_id) = user_id else {
        warn!("No userId found in team senders");
        return Ok(None);
    };
    info!("Found userId: {user_id}");

    let user = client
        .fetch_json(
            &UpstreamRequest::get(format!("users/{user_id}")),
            &policy,
            "fetching user mailboxes",
        )
        .await?;
    let Some(Value::Array(records)) = user.get("mailboxes").cloned() else {
        warn!("Mailboxes is not a list for user {user_id}");
        return Ok(None);
    };

    let mailboxes: Vec<Mailbox> = decode_records(records, "mailbox");
    info!("Found {} mailboxes for user {user_id}", mailboxes.len());
    Ok(Some(mailboxes))
}

/// Walk every campaign (running first-class, others for naming) and index
/// its senders. Details are fetched one campaign at a time.
pub async fn index_senders(client: &LemlistClient) -> Result<SenderIndex, UpstreamError> {
    let running = list_campaigns(client, Some("running")).await?;
    let all = list_campaigns(client, None).await?;

    let running_ids: HashSet<&str> = running.iter().filter_map(Campaign::id).collect();
    let listed_ids: HashSet<&str> = all.iter().filter_map(Campaign::id).collect();
    let walk: Vec<&Campaign> = all
        .iter()
        .chain(
            running
                .iter()
                .filter(|campaign| campaign.id().is_some_and(|id| !listed_ids.contains(id))),
        )
        .collect();

    let detail_policy = client.policy(DETAIL_TIMEOUT);
    let mut index = SenderIndex::default();

    for campaign in walk {
        let Some(id) = campaign.id() else {
            continue;
        };
        let name = campaign.name_or(UNKNOWN_CAMPAIGN);

        let detail = client
            .fetch_json(
                &UpstreamRequest::get(format!("campaigns/{id}")),
                &detail_policy,
                &format!("fetching details for {name}"),
            )
            .await;
        let detail = match detail {
            Ok(detail) => detail,
            Err(err) => {
                warn!("Error processing campaign {id} ({name}) for email mapping: {err}");
                continue;
            }
        };
        let senders = match serde_json::from_value::<CampaignDetail>(detail) {
            Ok(detail) => detail.senders(),
            Err(err) => {
                warn!("Unexpected detail format for campaign {id} ({name}): {err}");
                continue;
            }
        };

        let has_mailbox_sender = senders.iter().any(|sender| sender.mailbox_email().is_some());
        let in_use = has_mailbox_sender
            && running_ids.contains(id)
            && has_pending_leads(client, id, name).await;

        index.record_campaign(name, &senders, in_use);
    }

    Ok(index)
}

async fn list_campaigns(
    client: &LemlistClient,
    status: Option<&str>,
) -> Result<Vec<Campaign>, UpstreamError> {
    let listing = collect(client, &Listing::campaigns(client, status)).await;
    if let Some(err) = listing.failure {
        if err.is_client_error() {
            return Err(err);
        }
        warn!(
            "campaign listing ({}) stopped early: {err}",
            status.unwrap_or("all")
        );
    }
    Ok(decode_records(listing.records, "campaign"))
}

/// Lead export shows at least one active lead that is ready to send or in progress.
async fn has_pending_leads(client: &LemlistClient, id: &str, name: &str) -> bool {
    let leads = collect(client, &Listing::leads_export(client, id, name)).await;
    if let Some(err) = &leads.failure {
        warn!("Error fetching leads for campaign {id} ({name}): {err}");
        return false;
    }
    let leads: Vec<Lead> = decode_records(leads.records, "lead");
    LeadSummary::from_leads(&leads).has_sendable
}
