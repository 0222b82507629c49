//! Mailbox utilization report and warm-up toggles.

use crate::error::ApiError;
use crate::lemlist::UpstreamAction;
use crate::mailboxes::build_mailbox_report;
use crate::models::{ActionResponse, MailboxStatus};
use crate::routes::campaigns::run_action;
use crate::routes::helpers::LemlistState;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Every mailbox with its usage state: stuck first, then conflict, in use, warming up.
#[openapi(tag = "Mailboxes")]
#[get("/mailboxes")]
pub async fn list_mailboxes(
    lemlist: &State<LemlistState>,
) -> Result<Json<Vec<MailboxStatus>>, ApiError> {
    let client = lemlist.client()?;
    let report = build_mailbox_report(&client)
        .await
        .map_err(|err| ApiError::aggregate("fetching mailboxes", err))?;
    Ok(Json(report))
}

#[openapi(tag = "Mailboxes")]
#[post("/mailboxes/<mailbox_id>/start-lemwarm")]
pub async fn start_lemwarm(
    mailbox_id: String,
    lemlist: &State<LemlistState>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(lemlist, UpstreamAction::StartLemwarm, &mailbox_id).await
}

#[openapi(tag = "Mailboxes")]
#[post("/mailboxes/<mailbox_id>/stop-lemwarm")]
pub async fn stop_lemwarm(
    mailbox_id: String,
    lemlist: &State<LemlistState>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(lemlist, UpstreamAction::PauseLemwarm, &mailbox_id).await
}
