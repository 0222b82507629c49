//! Pure derivations from lead and activity snapshots.

use crate::lemlist::types::{Lead, activity_lead_id};
use crate::models::{CampaignMetrics, CampaignStatus};
use serde_json::Value;
use std::collections::HashSet;

/// Lead-derived figures of one campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeadSummary {
    pub total: usize,
    pub active: usize,
    pub companies: usize,
    /// Some active lead is still ready to send or in progress.
    pub has_sendable: bool,
}

impl LeadSummary {
    pub fn from_leads(leads: &[Lead]) -> Self {
        let active: Vec<&Lead> = leads.iter().filter(|lead| lead.is_active()).collect();
        let companies: HashSet<&str> = active.iter().filter_map(|lead| lead.company()).collect();

        Self {
            total: leads.len(),
            active: active.len(),
            companies: companies.len(),
            has_sendable: active.iter().any(|lead| lead.is_sendable()),
        }
    }

    /// `Ended` only when there are active leads and none of them is pending.
    /// A campaign without any active lead stays `Active`.
    pub fn campaign_status(&self) -> CampaignStatus {
        if !self.has_sendable && self.active > 0 {
            CampaignStatus::Ended
        } else {
            CampaignStatus::Active
        }
    }
}

/// Distinct-lead engagement counts from the activity feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub reached: usize,
    pub opened: usize,
    pub replied: usize,
    pub clicked: usize,
}

impl Engagement {
    pub fn from_feeds(sent: &[Value], opened: &[Value], replied: &[Value], clicked: &[Value]) -> Self {
        Self {
            reached: distinct_leads(sent),
            opened: distinct_leads(opened),
            replied: distinct_leads(replied),
            clicked: distinct_leads(clicked),
        }
    }

    pub fn open_rate(&self) -> f64 {
        percentage(self.opened, self.reached)
    }

    pub fn reply_rate(&self) -> f64 {
        percentage(self.replied, self.reached)
    }
}

/// Number of distinct `leadId`s across `activities`.
pub fn distinct_leads(activities: &[Value]) -> usize {
    activities
        .iter()
        .filter_map(activity_lead_id)
        .collect::<HashSet<_>>()
        .len()
}

/// `100 * part / whole` rounded to two decimals, ties to even; zero when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round_ties_even() / 100.0
}

pub fn build_metrics(
    campaign_id: &str,
    campaign_name: &str,
    leads: &LeadSummary,
    engagement: &Engagement,
) -> CampaignMetrics {
    CampaignMetrics {
        campaign_id: campaign_id.to_string(),
        campaign_name: campaign_name.to_string(),
        companies_count: leads.companies,
        people_count: leads.active,
        people_engaged: engagement.reached,
        open_rate: engagement.open_rate(),
        reply_rate: engagement.reply_rate(),
        campaign_status: leads.campaign_status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lead(state: &str, state_system: &str, company: &str) -> Lead {
        serde_json::from_value(json!({
            "state": state,
            "stateSystem": state_system,
            "companyName": company,
        }))
        .expect("lead")
    }

    fn activities(ids: &[&str]) -> Vec<Value> {
        ids.iter().map(|id| json!({"leadId": id})).collect()
    }

    #[test]
    fn ten_leads_two_paused() {
        let mut leads = vec![
            lead("emailsSent", "emailsSent", "Acme"),
            lead("emailsSent", "emailsSent", "Acme"),
            lead("emailsOpened", "inProgress", "Globex"),
            lead("done", "done", "Initech"),
            lead("done", "done", "Umbrella"),
            lead("done", "done", "Hooli"),
            lead("done", "done", ""),
            lead("done", "done", " Hooli "),
        ];
        leads.push(lead("paused", "emailsSent", "Paused Co"));
        leads.push(lead("emailsSent", "paused", "Paused Too"));

        let summary = LeadSummary::from_leads(&leads);
        assert_eq!(summary.total, 10);
        assert_eq!(summary.active, 8);
        assert_eq!(summary.companies, 5);
        assert!(summary.has_sendable);
        assert_eq!(summary.campaign_status(), CampaignStatus::Active);

        let engagement = Engagement::from_feeds(
            &activities(&["1", "2", "3", "4", "5", "6", "6", "1"]),
            &activities(&["1", "2", "3", "3"]),
            &activities(&["2"]),
            &[],
        );
        assert_eq!(engagement.reached, 6);
        assert_eq!(engagement.open_rate(), 50.0);
        assert_eq!(engagement.reply_rate(), 16.67);

        let metrics = build_metrics("c1", "Q3 outreach", &summary, &engagement);
        assert_eq!(metrics.people_count, 8);
        assert_eq!(metrics.companies_count, 5);
        assert_eq!(metrics.people_engaged, 6);
    }

    #[test]
    fn paused_leads_do_not_keep_a_campaign_active() {
        let leads = vec![
            lead("readyToSend", "paused", "Acme"),
            lead("done", "done", "Globex"),
        ];
        let summary = LeadSummary::from_leads(&leads);
        assert!(!summary.has_sendable);
        assert_eq!(summary.campaign_status(), CampaignStatus::Ended);
    }

    #[test]
    fn campaign_without_leads_is_active() {
        let summary = LeadSummary::from_leads(&[]);
        assert_eq!(summary.active, 0);
        assert_eq!(summary.campaign_status(), CampaignStatus::Active);
    }

    #[test]
    fn only_paused_leads_is_active() {
        let summary = LeadSummary::from_leads(&[lead("paused", "paused", "Acme")]);
        assert_eq!(summary.companies, 0);
        assert_eq!(summary.campaign_status(), CampaignStatus::Active);
    }

    #[test]
    fn rates_are_zero_without_reach() {
        let engagement = Engagement::from_feeds(&[], &activities(&["1"]), &activities(&["1"]), &[]);
        assert_eq!(engagement.open_rate(), 0.0);
        assert_eq!(engagement.reply_rate(), 0.0);
    }

    #[test]
    fn activities_without_lead_id_are_ignored() {
        let feed = vec![json!({"leadId": "a"}), json!({"type": "emailsSent"}), json!("junk")];
        assert_eq!(distinct_leads(&feed), 1);
    }

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(3, 3), 100.0);
        assert_eq!(percentage(1, 6), 16.67);
    }

    #[test]
    fn percentage_ties_round_to_even() {
        assert_eq!(percentage(1, 800), 0.12);
        assert_eq!(percentage(5, 800), 0.62);
        assert_eq!(percentage(3, 800), 0.38);
    }
}
