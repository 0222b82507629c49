//! Write operations forwarded to lemlist on behalf of the dashboard UI.

use super::client::{LemlistClient, UpstreamRequest};
use super::error::UpstreamError;
use std::time::Duration;

const ACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// State-changing upstream calls that must not be replayed blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamAction {
    StartLemwarm,
    PauseLemwarm,
    PauseCampaign,
}

impl UpstreamAction {
    fn path(self, id: &str) -> String {
        match self {
            UpstreamAction::StartLemwarm => format!("lemwarm/{id}/start"),
            UpstreamAction::PauseLemwarm => format!("lemwarm/{id}/pause"),
            UpstreamAction::PauseCampaign => format!("campaigns/{id}/pause"),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            UpstreamAction::StartLemwarm => "starting lemwarm",
            UpstreamAction::PauseLemwarm => "stopping lemwarm",
            UpstreamAction::PauseCampaign => "setting campaign inactive",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            UpstreamAction::StartLemwarm => "Lemwarm started successfully",
            UpstreamAction::PauseLemwarm => "Lemwarm stopped successfully",
            UpstreamAction::PauseCampaign => "Campaign set to inactive successfully",
        }
    }
}

/// Run `action` against `id` with a single attempt.
pub async fn perform(
    client: &LemlistClient,
    action: UpstreamAction,
    id: &str,
) -> Result<(), UpstreamError> {
    let request = UpstreamRequest::post(action.path(id));
    let policy = client.policy(ACTION_TIMEOUT).with_max_retries(1);
    let operation = format!("{} for {id}", action.describe());
    client.fetch(&request, &policy, &operation).await?;
    log::info!("{operation}: done");
    Ok(())
}
