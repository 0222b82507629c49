//! Upstream record shapes.
//!
//! lemlist is loose about field types (ids and names occasionally arrive as
//! numbers, optional objects as `null`), so every scalar is read through
//! [`lenient_string`] and every field defaults when absent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const LEAD_STATE_PAUSED: &str = "paused";
pub const LEAD_STATE_READY_TO_SEND: &str = "readyToSend";
pub const LEAD_STATE_IN_PROGRESS: &str = "inProgress";

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value_to_string(&value)))
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decode loose JSON records into `T`, dropping entries that are not objects
/// or do not fit the shape.
pub fn decode_records<T: DeserializeOwned>(records: Vec<Value>, kind: &str) -> Vec<T> {
    let total = records.len();
    let decoded: Vec<T> = records
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();

    if decoded.len() != total {
        log::debug!(
            "dropped {} of {} {kind} records with an unexpected shape",
            total - decoded.len(),
            total
        );
    }
    decoded
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Campaign {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

impl Campaign {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lead {
    #[serde(default, deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(rename = "stateSystem", default, deserialize_with = "lenient_string")]
    pub state_system: Option<String>,
    #[serde(rename = "companyName", default, deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
}

impl Lead {
    /// A lead counts unless either progress field reports it paused.
    pub fn is_active(&self) -> bool {
        self.state.as_deref() != Some(LEAD_STATE_PAUSED)
            && self.state_system.as_deref() != Some(LEAD_STATE_PAUSED)
    }

    /// Lead still has sequence steps pending.
    pub fn is_sendable(&self) -> bool {
        self.state.as_deref() == Some(LEAD_STATE_READY_TO_SEND)
            || matches!(
                self.state_system.as_deref(),
                Some(LEAD_STATE_READY_TO_SEND) | Some(LEAD_STATE_IN_PROGRESS)
            )
    }

    /// Trimmed company name; `companyName` wins over `company` when non-empty.
    pub fn company(&self) -> Option<&str> {
        [self.company_name.as_deref(), self.company.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Lead id carried by an activity record, if any.
pub fn activity_lead_id(activity: &Value) -> Option<String> {
    activity.get("leadId").and_then(value_to_string)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(rename = "sendUserMailboxId", default, deserialize_with = "lenient_string")]
    pub send_user_mailbox_id: Option<String>,
}

impl Sender {
    /// Email of a real mailbox sender. API, LinkedIn and similar sender
    /// types carry no address and are ignored.
    pub fn mailbox_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty() && email.contains('@'))
    }

    pub fn mailbox_id(&self) -> Option<&str> {
        self.send_user_mailbox_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignDetail {
    #[serde(default)]
    pub senders: Vec<Value>,
}

impl CampaignDetail {
    pub fn senders(&self) -> Vec<Sender> {
        decode_records(self.senders.clone(), "sender")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamSender {
    #[serde(rename = "userId", default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Mailbox {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default)]
    pub lemwarm: Option<Value>,
}

impl Mailbox {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn stored_email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }

    pub fn is_warming_up(&self) -> bool {
        self.lemwarm
            .as_ref()
            .and_then(|lemwarm| lemwarm.get("active"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
