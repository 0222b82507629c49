mod common;

use common::config_for;
use outstack_api::lemlist::LemlistConfig;
use outstack_api::routes::campaigns::{campaigns_dashboard, set_campaign_inactive};
use outstack_api::routes::health::{health_check, index};
use outstack_api::routes::mailboxes::{list_mailboxes, start_lemwarm, stop_lemwarm};
use outstack_api::test_support::TestRocketBuilder;
use rocket::http::Status;
use rocket::routes;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn health_endpoint_reports_healthy() {
    let client = TestRocketBuilder::new()
        .mount_root_routes(routes![health_check, index])
        .blocking_client();

    let response = client.get("/health").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let payload: Value = response.into_json().expect("valid JSON payload");
    assert_eq!(payload, json!({"status": "healthy"}));

    let response = client.get("/").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let payload: Value = response.into_json().expect("valid JSON payload");
    assert!(payload["message"].is_string());
}

#[test]
fn missing_api_key_is_a_configuration_error() {
    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![campaigns_dashboard, list_mailboxes, stop_lemwarm])
        .manage_lemlist(LemlistConfig::with_base_url("http://127.0.0.1:9", None))
        .blocking_client();

    for response in [
        client.get("/api/campaigns/dashboard").dispatch(),
        client.get("/api/mailboxes").dispatch(),
        client.post("/api/mailboxes/mb1/stop-lemwarm").dispatch(),
    ] {
        assert_eq!(response.status(), Status::InternalServerError);
        let payload: Value = response.into_json().expect("valid JSON payload");
        assert_eq!(payload["error"], "ConfigurationError");
        assert_eq!(payload["message"], "LEMLIST_API_KEY not configured");
    }
}

#[tokio::test]
async fn dashboard_route_serializes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![campaigns_dashboard])
        .manage_lemlist(config_for(&server))
        .async_client()
        .await;

    let response = client.get("/api/campaigns/dashboard").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let payload: Value = response.into_json().await.expect("valid JSON payload");
    assert_eq!(payload, json!([]));
}

#[tokio::test]
async fn aggregate_failure_is_reported_as_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/team/senders"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![list_mailboxes])
        .manage_lemlist(config_for(&server))
        .async_client()
        .await;

    let response = client.get("/api/mailboxes").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);
    let payload: Value = response.into_json().await.expect("valid JSON payload");
    assert_eq!(
        payload["message"],
        "Error fetching mailboxes: HTTP 403 Forbidden: forbidden"
    );
}

#[tokio::test]
async fn set_inactive_pauses_the_campaign() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/campaigns/c1/pause"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![set_campaign_inactive])
        .manage_lemlist(config_for(&server))
        .async_client()
        .await;

    let response = client.post("/api/campaigns/c1/set-inactive").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let payload: Value = response.into_json().await.expect("valid JSON payload");
    assert_eq!(
        payload,
        json!({"success": true, "message": "Campaign set to inactive successfully"})
    );
}

#[tokio::test]
async fn action_failure_passes_upstream_status_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/lemwarm/mb1/start"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such mailbox"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestRocketBuilder::new()
        .mount_api_routes(routes![start_lemwarm])
        .manage_lemlist(config_for(&server))
        .async_client()
        .await;

    let response = client.post("/api/mailboxes/mb1/start-lemwarm").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let payload: Value = response.into_json().await.expect("valid JSON payload");
    assert_eq!(payload["error"], "UpstreamError");
    assert_eq!(
        payload["message"],
        "Error starting lemwarm: HTTP 404 Not Found: no such mailbox"
    );
}
