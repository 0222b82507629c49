//! Mailbox classification against campaign sender assignments.

use crate::lemlist::types::{Mailbox, Sender};
use crate::models::{MailboxState, MailboxStatus};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Sender assignments accumulated while walking campaign details.
///
/// Filled by a single task, one campaign at a time, in listing order.
#[derive(Debug, Default, Clone)]
pub struct SenderIndex {
    /// Email to the names of campaigns sending from it, first-seen order.
    pub email_to_campaigns: HashMap<String, Vec<String>>,
    /// Mailbox id to every email ever assigned to it.
    pub mailbox_id_to_emails: HashMap<String, BTreeSet<String>>,
    /// Mailbox id to the email of its most recently walked assignment.
    pub mailbox_id_to_campaign_email: HashMap<String, String>,
    /// Emails sending for a running campaign that still has pending leads.
    pub emails_in_use: HashSet<String>,
}

impl SenderIndex {
    /// Register the senders of one campaign. `in_use` marks their emails as
    /// busy (running campaign with ready-to-send or in-progress leads).
    pub fn record_campaign(&mut self, campaign_name: &str, senders: &[Sender], in_use: bool) {
        for sender in senders {
            let Some(email) = sender.mailbox_email() else {
                continue;
            };

            let names = self.email_to_campaigns.entry(email.to_string()).or_default();
            if !names.iter().any(|name| name == campaign_name) {
                names.push(campaign_name.to_string());
            }

            if let Some(mailbox_id) = sender.mailbox_id() {
                self.mailbox_id_to_emails
                    .entry(mailbox_id.to_string())
                    .or_default()
                    .insert(email.to_string());
                self.mailbox_id_to_campaign_email
                    .insert(mailbox_id.to_string(), email.to_string());
            }

            if in_use {
                self.emails_in_use.insert(email.to_string());
            }
        }
    }

    /// Classify one mailbox. `None` when no email can be resolved for it.
    pub fn resolve(&self, mailbox: &Mailbox) -> Option<MailboxStatus> {
        let mailbox_id = mailbox.id();
        let stored_email = mailbox.stored_email();
        let email = self
            .mailbox_id_to_campaign_email
            .get(mailbox_id)
            .map(String::as_str)
            .filter(|email| !email.is_empty())
            .unwrap_or(stored_email);

        if email.is_empty() {
            return None;
        }

        let is_in_use = self.emails_in_use.contains(email)
            || self.emails_in_use.contains(stored_email)
            || self
                .mailbox_id_to_emails
                .get(mailbox_id)
                .is_some_and(|emails| emails.iter().any(|e| self.emails_in_use.contains(e)));
        let status = MailboxState::classify(is_in_use, mailbox.is_warming_up());

        let campaigns = if status.needs_attention() {
            let mut names: Vec<String> = Vec::new();
            for key in [email, stored_email] {
                for name in self.email_to_campaigns.get(key).into_iter().flatten() {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
            Some(names).filter(|names| !names.is_empty())
        } else {
            None
        };

        Some(MailboxStatus {
            email: email.to_string(),
            status,
            mailbox_id: mailbox.id.clone(),
            campaigns,
        })
    }
}

/// Classified mailboxes plus bookkeeping for the run summary.
#[derive(Debug, Default)]
pub struct MailboxReport {
    pub statuses: Vec<MailboxStatus>,
    pub skipped_without_email: usize,
}

impl MailboxReport {
    pub fn status_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for status in &self.statuses {
            *counts.entry(status.status.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Classify every mailbox and order the result by status priority, then email.
pub fn resolve_mailboxes(index: &SenderIndex, mailboxes: &[Mailbox]) -> MailboxReport {
    let mut report = MailboxReport::default();

    for mailbox in mailboxes {
        match index.resolve(mailbox) {
            Some(status) => {
                if status.email != mailbox.stored_email() {
                    log::debug!(
                        "Mailbox {}: using campaign email '{}' (mailbox email: '{}')",
                        mailbox.id(),
                        status.email,
                        mailbox.stored_email()
                    );
                }
                report.statuses.push(status);
            }
            None => {
                log::warn!("Skipping mailbox {} - no email found", mailbox.id());
                report.skipped_without_email += 1;
            }
        }
    }

    sort_statuses(&mut report.statuses);
    report
}

pub fn sort_statuses(statuses: &mut [MailboxStatus]) {
    statuses.sort_by(|a, b| {
        a.status
            .priority()
            .cmp(&b.status.priority())
            .then_with(|| a.email.cmp(&b.email))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sender(email: &str, mailbox_id: &str) -> Sender {
        serde_json::from_value(json!({"email": email, "sendUserMailboxId": mailbox_id}))
            .expect("sender")
    }

    fn mailbox(id: &str, email: &str, warming: bool) -> Mailbox {
        serde_json::from_value(json!({"_id": id, "email": email, "lemwarm": {"active": warming}}))
            .expect("mailbox")
    }

    #[test]
    fn idle_mailbox_is_stuck_with_its_campaigns() {
        let mut index = SenderIndex::default();
        index.record_campaign("A", &[sender("a@x.io", "mb1")], false);
        index.record_campaign("B", &[sender("a@x.io", "mb1")], false);

        let status = index.resolve(&mailbox("mb1", "a@x.io", false)).expect("status");
        assert_eq!(status.status, MailboxState::Stuck);
        assert_eq!(status.campaigns, Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(status.mailbox_id.as_deref(), Some("mb1"));
    }

    #[test]
    fn warming_and_in_use_is_a_conflict() {
        let mut index = SenderIndex::default();
        index.record_campaign("Live", &[sender("a@x.io", "mb1")], true);

        let status = index.resolve(&mailbox("mb1", "a@x.io", true)).unwrap();
        assert_eq!(status.status, MailboxState::Conflict);
        assert_eq!(status.campaigns, Some(vec!["Live".to_string()]));

        let status = index.resolve(&mailbox("mb1", "a@x.io", false)).unwrap();
        assert_eq!(status.status, MailboxState::InUse);
        assert_eq!(status.campaigns, None);
    }

    #[test]
    fn warming_only_has_no_campaign_list() {
        let index = SenderIndex::default();
        let status = index.resolve(&mailbox("mb1", "a@x.io", true)).unwrap();
        assert_eq!(status.status, MailboxState::WarmingUp);
        assert_eq!(status.campaigns, None);
    }

    #[test]
    fn campaign_email_overrides_stored_email_last_write_wins() {
        let mut index = SenderIndex::default();
        index.record_campaign("Old", &[sender("old@x.io", "mb1")], false);
        index.record_campaign("New", &[sender("new@x.io", "mb1")], false);

        let status = index.resolve(&mailbox("mb1", "stored@x.io", false)).unwrap();
        assert_eq!(status.email, "new@x.io");
        assert_eq!(status.campaigns, Some(vec!["New".to_string()]));
    }

    #[test]
    fn campaigns_merge_resolved_and_stored_email() {
        let mut index = SenderIndex::default();
        index.record_campaign("Alias", &[sender("alias@x.io", "mb1")], false);
        index.record_campaign("Direct", &[sender("stored@x.io", "other")], false);

        let status = index.resolve(&mailbox("mb1", "stored@x.io", false)).unwrap();
        assert_eq!(status.email, "alias@x.io");
        assert_eq!(
            status.campaigns,
            Some(vec!["Alias".to_string(), "Direct".to_string()])
        );
    }

    #[test]
    fn any_email_of_the_mailbox_marks_it_in_use() {
        let mut index = SenderIndex::default();
        index.record_campaign("Live", &[sender("first@x.io", "mb1")], true);
        index.record_campaign("Idle", &[sender("second@x.io", "mb1")], false);

        let status = index.resolve(&mailbox("mb1", "stored@x.io", false)).unwrap();
        assert_eq!(status.email, "second@x.io");
        assert_eq!(status.status, MailboxState::InUse);
    }

    #[test]
    fn mailbox_without_any_email_is_skipped() {
        let index = SenderIndex::default();
        let report = resolve_mailboxes(&index, &[mailbox("mb1", "", false)]);
        assert!(report.statuses.is_empty());
        assert_eq!(report.skipped_without_email, 1);
    }

    #[test]
    fn report_is_sorted_by_priority_then_email() {
        let mut index = SenderIndex::default();
        index.record_campaign("Live", &[sender("busy@x.io", "mb3")], true);

        let mailboxes = vec![
            mailbox("mb1", "warm@x.io", true),
            mailbox("mb2", "zed@x.io", false),
            mailbox("mb3", "busy@x.io", false),
            mailbox("mb4", "amy@x.io", false),
        ];
        let report = resolve_mailboxes(&index, &mailboxes);
        let order: Vec<(&str, MailboxState)> = report
            .statuses
            .iter()
            .map(|status| (status.email.as_str(), status.status))
            .collect();

        assert_eq!(
            order,
            vec![
                ("amy@x.io", MailboxState::Stuck),
                ("zed@x.io", MailboxState::Stuck),
                ("busy@x.io", MailboxState::InUse),
                ("warm@x.io", MailboxState::WarmingUp),
            ]
        );
        assert_eq!(report.status_counts().get("stuck"), Some(&2));
    }

    #[test]
    fn non_mailbox_senders_are_ignored() {
        let mut index = SenderIndex::default();
        let api: Sender = serde_json::from_value(json!({"type": "api"})).unwrap();
        index.record_campaign("Api", &[api], true);
        assert!(index.email_to_campaigns.is_empty());
        assert!(index.emails_in_use.is_empty());
    }
}
