//! Contact form and newsletter sign-up.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use noor_integration_tests::{MockServices, TestApp};

async fn accept_slack(mocks: &MockServices) {
    Mock::given(method("POST"))
        .and(path("/services/T000/B000"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mocks.slack)
        .await;
}

/// Slack posts happen on a background task.
async fn wait_for_slack(mocks: &MockServices, count: usize) -> Vec<wiremock::Request> {
    for _ in 0..50 {
        let received = mocks.slack.received_requests().await.unwrap_or_default();
        if received.len() >= count {
            return received;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    mocks.slack.received_requests().await.unwrap_or_default()
}

#[tokio::test]
async fn test_contact_form_posts_to_slack() {
    let mocks = MockServices::start().await;
    accept_slack(&mocks).await;
    let mut app = TestApp::new(&mocks);

    let response = app
        .post(
            "/api/contact",
            json!({
                "name": "Reem",
                "email": "reem@example.com",
                "subject": "Custom length",
                "message": "Can the Noor Classic be made 150cm long?"
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["success"], true);

    let received = wait_for_slack(&mocks, 1).await;
    let body = received
        .first()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .unwrap_or_default();
    assert!(body.contains("reem@example.com"));
    assert!(body.contains("150cm"));
}

#[tokio::test]
async fn test_contact_form_validation() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    let bad_email = app
        .post(
            "/api/contact",
            json!({ "name": "Reem", "email": "reem@", "message": "Hello" }),
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);

    let blank = app
        .post(
            "/api/contact",
            json!({ "name": "  ", "email": "reem@example.com", "message": "Hello" }),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscribe_rejects_bad_email_before_calling_out() {
    let mocks = MockServices::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mocks.mailing_list)
        .await;
    let mut app = TestApp::new(&mocks);

    let missing = app.post("/api/subscribe", json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let invalid = app
        .post("/api/subscribe", json!({ "email": "not-an-email" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscribe_retries_without_group() {
    let mocks = MockServices::start().await;
    accept_slack(&mocks).await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .and(body_json(json!({ "email": "salma@example.com", "groups": ["148532"] })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The selected groups.0 is invalid.",
            "errors": { "groups.0": ["The selected groups.0 is invalid."] }
        })))
        .expect(1)
        .mount(&mocks.mailing_list)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .and(body_json(json!({ "email": "salma@example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "31897397363737859", "email": "salma@example.com" }
        })))
        .expect(1)
        .mount(&mocks.mailing_list)
        .await;

    let mut app = TestApp::new(&mocks);
    let response = app
        .post("/api/subscribe", json!({ "email": "salma@example.com" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["success"], true);
    assert_eq!(response.json["mailingList"]["subscribed"], true);
}

#[tokio::test]
async fn test_subscribe_reports_mailing_list_failure() {
    let mocks = MockServices::start().await;
    accept_slack(&mocks).await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mocks.mailing_list)
        .await;

    let mut app = TestApp::new(&mocks);
    let response = app
        .post("/api/subscribe", json!({ "email": "salma@example.com" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json["mailingList"]["subscribed"], false);
    assert!(response.json["mailingList"]["error"].is_string());

    // The team still hears about the sign-up
    let received = wait_for_slack(&mocks, 1).await;
    assert!(
        received
            .iter()
            .any(|r| String::from_utf8_lossy(&r.body).contains("not subscribed"))
    );
}

#[tokio::test]
async fn test_form_routes_are_rate_limited() {
    let mocks = MockServices::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("email"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": {} })))
        .mount(&mocks.mailing_list)
        .await;
    let mut app = TestApp::new(&mocks);
    app.set_client_ip("94.200.17.4");

    let mut statuses = Vec::new();
    for _ in 0..8 {
        let response = app
            .post("/api/subscribe", json!({ "email": "amal@example.com" }))
            .await;
        statuses.push(response.status);
    }
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}
