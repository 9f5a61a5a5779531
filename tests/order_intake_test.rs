//! Order placement: concurrent price resolution, whole-order rejection on
//! any bad line, and lifecycle transitions.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;

async fn seed_food(app: &TestApp, name: &str, price: f64) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/catalog/foods",
            Some(app.manager_token.as_str()),
            Some(json!({ "name": name, "price": price })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().expect("food id").to_string()
}

#[tokio::test]
async fn order_total_sums_every_resolved_line() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let kitfo = seed_food(&app, "Kitfo", 15.00).await;
    let tibs = seed_food(&app, "Tibs", 11.25).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token.as_str()),
            Some(json!({
                "table_number": 2,
                "foods": [
                    { "item_id": kitfo, "quantity": 1.0 },
                    { "item_id": tibs, "quantity": 2.0 },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total_amount"], json!("37.50"));
    assert_eq!(body["data"]["status"], json!("pending"));
    let items = body["data"]["items"].as_array().expect("order items");
    assert_eq!(items.len(), 2);

    // Reading the order back keeps the two-decimal rendering; SQLite would
    // otherwise strip the trailing zero.
    let id = body["data"]["id"].as_str().expect("order id").to_string();
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"], json!("37.50"));
    let line_totals: Vec<&str> = body["data"]["items"]
        .as_array()
        .expect("order items")
        .iter()
        .map(|i| i["total_price"].as_str().expect("line total"))
        .collect();
    assert!(line_totals.contains(&"15.00"));
    assert!(line_totals.contains(&"22.50"));
}

#[tokio::test]
async fn unknown_item_rejects_the_whole_order() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let kitfo = seed_food(&app, "Kitfo", 15.00).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token.as_str()),
            Some(json!({
                "table_number": 2,
                "foods": [
                    { "item_id": kitfo, "quantity": 1.0 },
                    { "item_id": Uuid::new_v4(), "quantity": 1.0 },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing was persisted
    let (status, list) = app
        .request(
            Method::GET,
            "/api/v1/orders",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["data"]["total"], json!(0));
}

#[tokio::test]
async fn unavailable_item_rejects_the_whole_order() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let kitfo = seed_food(&app, "Kitfo", 15.00).await;

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/v1/catalog/foods/{kitfo}"),
            Some(token.as_str()),
            Some(json!({ "available": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token.as_str()),
            Some(json!({
                "table_number": 2,
                "foods": [{ "item_id": kitfo, "quantity": 1.0 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_order_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(app.manager_token.as_str()),
            Some(json!({ "table_number": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancel_and_delete_round_out_the_lifecycle() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let kitfo = seed_food(&app, "Kitfo", 15.00).await;

    let (_, created) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token.as_str()),
            Some(json!({
                "table_number": 2,
                "foods": [{ "item_id": kitfo, "quantity": 1.0 }],
            })),
        )
        .await;
    let id = created["data"]["id"].as_str().expect("order id").to_string();

    let (status, cancelled) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{id}/cancel"),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["data"]["status"], json!("cancelled"));

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/orders/{id}"),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
