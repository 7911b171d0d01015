//! Geolocation-driven locale suggestions.

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use noor_integration_tests::{DEFAULT_CLIENT_IP, MockServices, TestApp};

fn geo_path() -> String {
    format!("/{DEFAULT_CLIENT_IP}/json/")
}

#[tokio::test]
async fn test_geo_failure_falls_back_to_defaults() {
    let mocks = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path(geo_path()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mocks.geo)
        .await;

    let mut app = TestApp::new(&mocks);
    let first = app.get("/api/locale").await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.json["detected"]["currency"], "AED");
    assert_eq!(first.json["detected"]["language"], "en");
    assert_eq!(first.json["suggestion"]["showPopup"], false);

    // The failed detection is cached; no second lookup
    let second = app.get("/api/locale").await;
    assert_eq!(second.json["detected"]["currency"], "AED");
}

#[tokio::test]
async fn test_saudi_visitor_offered_riyal_and_arabic() {
    let mocks = MockServices::start().await;
    Mock::given(method("GET"))
        .and(path(geo_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": DEFAULT_CLIENT_IP,
            "city": "Riyadh",
            "country_code": "SA",
            "country_name": "Saudi Arabia"
        })))
        .mount(&mocks.geo)
        .await;

    let mut app = TestApp::new(&mocks);
    let locale = app.get("/api/locale").await;
    assert_eq!(locale.json["detected"]["countryCode"], "SA");
    assert_eq!(locale.json["suggestion"]["currency"], "SAR");
    assert_eq!(locale.json["suggestion"]["language"], "ar");
    assert_eq!(locale.json["suggestion"]["showPopup"], true);

    // Detected currency becomes the display currency until the visitor picks one
    assert_eq!(app.get("/api/currency").await.json["selected"], "SAR");

    let dismissed = app
        .post("/api/locale/dismiss", json!({ "currency": "USD" }))
        .await;
    assert_eq!(dismissed.status, StatusCode::NO_CONTENT);

    let after = app.get("/api/locale").await;
    assert_eq!(after.json["suggestion"]["showPopup"], false);
    assert_eq!(after.json["suggestion"]["currency"], "USD");
}

#[tokio::test]
async fn test_private_address_skips_lookup() {
    let mocks = MockServices::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mocks.geo)
        .await;

    let mut app = TestApp::new(&mocks);
    app.set_client_ip("10.0.0.12");
    let locale = app.get("/api/locale").await;
    assert_eq!(locale.status, StatusCode::OK);
    assert!(locale.json["detected"]["countryCode"].is_null());
}

#[tokio::test]
async fn test_cookie_consent_round_trip() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    assert!(app.get("/api/consent").await.json["consent"].is_null());

    let saved = app
        .post("/api/consent", json!({ "consent": "accepted" }))
        .await;
    assert_eq!(saved.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/api/consent").await.json["consent"], "accepted");
}
