//! End-to-end report generation over the HTTP surface: seed catalog items,
//! place orders, record attendance, then ask for the daily report.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn daily_report_reflects_seeded_orders_and_attendance() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let token = token.as_str();

    // Catalog
    let (status, food) = app
        .request(
            Method::POST,
            "/api/v1/catalog/foods",
            Some(token),
            Some(json!({ "name": "Injera Platter", "price": 12.50 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let food_id = food["data"]["id"].as_str().expect("food id").to_string();

    let (status, drink) = app
        .request(
            Method::POST,
            "/api/v1/catalog/drinks",
            Some(token),
            Some(json!({ "name": "Buna", "price": 3.00 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let drink_id = drink["data"]["id"].as_str().expect("drink id").to_string();

    // Attendance
    let (status, _) = app
        .request(Method::POST, "/api/v1/attendance/checkin", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // Two orders: 2 platters + 1 buna = 28.00, and 1 buna = 3.00
    let (status, first) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token),
            Some(json!({
                "table_number": 4,
                "foods": [{ "item_id": food_id, "quantity": 2.0 }],
                "drinks": [{ "item_id": drink_id, "quantity": 1.0 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["data"]["total_amount"], json!("28.00"));
    let first_id = first["data"]["id"].as_str().expect("order id").to_string();

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/orders",
            Some(token),
            Some(json!({
                "table_number": 5,
                "drinks": [{ "item_id": drink_id, "quantity": 1.0 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Complete the first order so the completion rate lands at 50%
    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{first_id}/status"),
            Some(token),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, report) = app
        .request(Method::GET, "/api/v1/reports/daily", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let orders = &report["data"]["order_metrics"];
    assert_eq!(orders["total_orders"], json!(2));
    assert_eq!(orders["total_revenue"], json!(31.0));
    assert_eq!(orders["order_completion_rate"], json!(50.0));
    assert_eq!(orders["orders_by_status"]["completed"], json!(1));
    assert_eq!(orders["orders_by_status"]["pending"], json!(1));

    // The drink sold two units, the food two units of a single order
    let drinks = report["data"]["item_metrics"]["best_selling_drinks"]
        .as_array()
        .expect("drink ranking");
    assert_eq!(drinks[0]["item_id"].as_str(), Some(drink_id.as_str()));
    assert_eq!(drinks[0]["total_quantity"], json!(2.0));
    let foods = report["data"]["item_metrics"]["best_selling_foods"]
        .as_array()
        .expect("food ranking");
    assert_eq!(foods[0]["item_id"].as_str(), Some(food_id.as_str()));
    assert_eq!(foods[0]["total_quantity"], json!(2.0));

    // Manager checked in but never out: closed reports drop the open session
    let attendance = &report["data"]["attendance_metrics"];
    assert_eq!(attendance["total_checkins"], json!(1));
    assert_eq!(attendance["total_checkouts"], json!(0));
    let employees = report["data"]["employee_metrics"]
        .as_array()
        .expect("employee metrics");
    assert_eq!(employees[0]["orders_processed"], json!(2));
    assert_eq!(employees[0]["total_work_secs"], json!(0));
}

#[tokio::test]
async fn unknown_period_is_rejected() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/reports/quarterly",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("quarterly"));

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/reports/quarterly/export",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Rejection happens before any fetch or write: nothing is created under
    // the configured report directory.
    assert!(!std::path::Path::new(&app.state.config.report_dir).exists());
}

#[tokio::test]
async fn reports_are_manager_only() {
    let app = TestApp::new().await;
    let (_, employee_token) = app.seed_employee("waiter@example.com").await;
    let (status, _) = app
        .request(
            Method::GET,
            "/api/v1/reports/daily",
            Some(employee_token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
