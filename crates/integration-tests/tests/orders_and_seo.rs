//! Order store endpoints and crawler documents.

use axum::http::StatusCode;
use serde_json::json;

use noor_integration_tests::{MockServices, TestApp};
use noor_storefront::config::LaunchMode;

fn new_order() -> serde_json::Value {
    json!({
        "customer": { "name": "Fatima Khan", "email": "fatima@example.com" },
        "items": [{
            "productId": "rimal-kaftan",
            "name": "Rimal Kaftan",
            "unitPrice": "690",
            "image": "/images/products/rimal-kaftan.jpg",
            "size": "S/M",
            "color": "Sage",
            "quantity": 1
        }]
    })
}

#[tokio::test]
async fn test_order_lifecycle() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    let created = app.post("/api/orders", new_order()).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json["order"]["id"]
        .as_str()
        .map(String::from)
        .expect("order id");
    assert_eq!(created.json["order"]["status"], "pending");
    assert_eq!(created.json["order"]["total"], "690");

    let found = app.get(&format!("/api/orders?id={id}")).await;
    assert_eq!(found.json["order"]["id"], id.as_str());

    let processing = app
        .patch("/api/orders", json!({ "id": id, "status": "processing" }))
        .await;
    assert_eq!(processing.status, StatusCode::OK);
    assert_eq!(processing.json["order"]["status"], "processing");

    // No going back to pending
    let backwards = app
        .patch("/api/orders", json!({ "id": id, "status": "pending" }))
        .await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);

    let by_status = app.get("/api/orders?status=processing").await;
    assert_eq!(by_status.json["orders"].as_array().map(Vec::len), Some(1));
    let none_pending = app.get("/api/orders?status=pending").await;
    assert_eq!(none_pending.json["orders"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_order_errors() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    assert_eq!(
        app.get("/api/orders?id=ORD-1").await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/orders?status=lost").await.status,
        StatusCode::BAD_REQUEST
    );

    let mut empty = new_order();
    empty["items"] = json!([]);
    assert_eq!(
        app.post("/api/orders", empty).await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_prelaunch_documents() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    let robots = app.get("/robots.txt").await;
    assert_eq!(robots.status, StatusCode::OK);
    assert!(robots.text.contains("Disallow: /\n"));
    assert!(robots.text.contains("Sitemap: https://noorabaya.test/sitemap.xml"));

    let sitemap = app.get("/sitemap.xml").await;
    assert!(
        sitemap
            .content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/xml"))
    );
    assert_eq!(sitemap.text.matches("<url>").count(), 1);
}

#[tokio::test]
async fn test_live_sitemap_lists_products() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::with_mode(&mocks, LaunchMode::Live);

    let sitemap = app.get("/sitemap.xml").await;
    assert!(sitemap.text.contains("https://noorabaya.test/products/qamar-embroidered"));
    assert!(sitemap.text.contains("https://noorabaya.test/collections/open-front"));

    let robots = app.get("/robots.txt").await;
    assert!(robots.text.contains("Disallow: /api/"));
}

#[tokio::test]
async fn test_health() {
    let mocks = MockServices::start().await;
    let mut app = TestApp::new(&mocks);

    let health = app.get("/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.text, "ok");
}
