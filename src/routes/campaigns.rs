//! Campaign dashboard and campaign actions.

use crate::dashboard::build_dashboard;
use crate::error::ApiError;
use crate::lemlist::{UpstreamAction, perform};
use crate::models::{ActionResponse, CampaignMetrics};
use crate::routes::helpers::LemlistState;
use rocket::State;
use rocket::serde::json::Json;
use rocket_okapi::openapi;

/// Metrics for every running campaign, in upstream listing order.
#[openapi(tag = "Campaigns")]
#[get("/campaigns/dashboard")]
pub async fn campaigns_dashboard(
    lemlist: &State<LemlistState>,
) -> Result<Json<Vec<CampaignMetrics>>, ApiError> {
    let client = lemlist.client()?;
    let rows = build_dashboard(&client, &lemlist.config)
        .await
        .map_err(|err| ApiError::aggregate("fetching campaigns", err))?;
    Ok(Json(rows))
}

/// Pause a campaign upstream.
#[openapi(tag = "Campaigns")]
#[post("/campaigns/<campaign_id>/set-inactive")]
pub async fn set_campaign_inactive(
    campaign_id: String,
    lemlist: &State<LemlistState>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(lemlist, UpstreamAction::PauseCampaign, &campaign_id).await
}

pub(crate) async fn run_action(
    lemlist: &State<LemlistState>,
    action: UpstreamAction,
    id: &str,
) -> Result<Json<ActionResponse>, ApiError> {
    let client = lemlist.client()?;
    perform(&client, action, id)
        .await
        .map_err(|err| ApiError::passthrough(action.describe(), err))?;
    Ok(Json(ActionResponse::ok(action.success_message())))
}
