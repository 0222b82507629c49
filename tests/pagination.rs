mod common;

use common::client_for;
use outstack_api::lemlist::{Listing, PageMode, collect};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn records(prefix: &str, count: usize) -> Vec<Value> {
    (0..count).map(|i| json!({"_id": format!("{prefix}{i}")})).collect()
}

#[tokio::test]
async fn short_bare_page_ends_the_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records("c", 40)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = collect(&client, &Listing::campaigns(&client, None)).await;

    assert!(collected.is_complete());
    assert_eq!(collected.pages, 1);
    assert_eq!(collected.records.len(), 40);
}

#[tokio::test]
async fn bare_pages_are_concatenated_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records("a", 100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records("b", 30)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = collect(&client, &Listing::campaigns(&client, Some("running"))).await;

    assert_eq!(collected.pages, 2);
    assert_eq!(collected.records.len(), 130);
    assert_eq!(collected.records[0], json!({"_id": "a0"}));
    assert_eq!(collected.records[100], json!({"_id": "b0"}));
}

#[tokio::test]
async fn envelope_total_pages_bounds_the_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "campaigns": records("c", 100),
            "pagination": {"totalPages": 2}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = collect(&client, &Listing::campaigns(&client, None)).await;

    assert!(collected.is_complete());
    assert_eq!(collected.records.len(), 200);
}

#[tokio::test]
async fn failed_page_keeps_earlier_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records("c", 100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = collect(&client, &Listing::campaigns(&client, None)).await;

    assert_eq!(collected.records.len(), 100);
    assert!(collected.failure.is_some_and(|err| err.is_retryable()));
}

#[tokio::test]
async fn unrecognized_shape_stops_without_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "odd"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let collected = collect(&client, &Listing::campaigns(&client, None)).await;

    assert!(collected.is_complete());
    assert!(collected.records.is_empty());
}

#[tokio::test]
async fn activity_feed_respects_page_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/activities"))
        .and(query_param("campaignId", "c1"))
        .and(query_param("type", "emailsSent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records("act", 100)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let listing = Listing::activities(&client, "c1", "Alpha", "emailsSent", 2);
    let collected = collect(&client, &listing).await;

    assert_eq!(collected.pages, 2);
    assert_eq!(collected.records.len(), 200);
}

#[tokio::test]
async fn leads_export_is_fetched_in_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/campaigns/c1/export/leads"))
        .and(query_param("state", "all"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "leads": [],
            "data": records("lead", 150)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let listing = Listing::leads_export(&client, "c1", "Alpha");
    assert_eq!(listing.mode, PageMode::Single);

    let collected = collect(&client, &listing).await;
    assert_eq!(collected.records.len(), 150);
}
