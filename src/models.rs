use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Dashboard Models =====

/// Derived lifecycle of a running campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Ended,
}

/// One dashboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CampaignMetrics {
    pub campaign_id: String,
    pub campaign_name: String,
    /// Distinct non-empty company names among active leads.
    pub companies_count: usize,
    /// Active (non-paused) leads.
    pub people_count: usize,
    /// Distinct leads with at least one sent email ("reach").
    pub people_engaged: usize,
    /// Percentage of reached leads that opened, two decimals.
    pub open_rate: f64,
    /// Percentage of reached leads that replied, two decimals.
    pub reply_rate: f64,
    pub campaign_status: CampaignStatus,
}

// ===== Mailbox Models =====

/// Usage state of a sending mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MailboxState {
    /// Neither warming up nor sending for a campaign with pending leads.
    #[serde(rename = "stuck")]
    Stuck,
    /// Warming up while also sending for a live campaign.
    #[serde(rename = "conflict")]
    Conflict,
    #[serde(rename = "in use")]
    InUse,
    #[serde(rename = "warming up")]
    WarmingUp,
}

impl MailboxState {
    pub fn classify(is_in_use: bool, is_warming_up: bool) -> Self {
        match (is_in_use, is_warming_up) {
            (true, true) => MailboxState::Conflict,
            (true, false) => MailboxState::InUse,
            (false, true) => MailboxState::WarmingUp,
            (false, false) => MailboxState::Stuck,
        }
    }

    /// Sort rank; states needing attention come first.
    pub fn priority(self) -> u8 {
        match self {
            MailboxState::Stuck => 0,
            MailboxState::Conflict => 1,
            MailboxState::InUse => 2,
            MailboxState::WarmingUp => 3,
        }
    }

    /// Only these states carry the campaign list in the report.
    pub fn needs_attention(self) -> bool {
        matches!(self, MailboxState::Stuck | MailboxState::Conflict)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MailboxState::Stuck => "stuck",
            MailboxState::Conflict => "conflict",
            MailboxState::InUse => "in use",
            MailboxState::WarmingUp => "warming up",
        }
    }
}

impl fmt::Display for MailboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MailboxStatus {
    pub email: String,
    pub status: MailboxState,
    pub mailbox_id: Option<String>,
    /// Campaign names using this mailbox; only set for stuck or conflicting mailboxes.
    pub campaigns: Option<Vec<String>>,
}

// ===== Generic Responses =====

/// Outcome of a forwarded write action.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}
