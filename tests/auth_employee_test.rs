//! Login, token gating, and employee account management.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn login_issues_a_usable_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "manager@example.com",
                "password": "manager-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("manager"));
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let (status, _) = app
        .request(Method::GET, "/api/v1/employees", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({
                "email": "manager@example.com",
                "password": "not-the-password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(Method::GET, "/api/v1/employees", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn employee_role_cannot_manage_accounts() {
    let app = TestApp::new().await;
    let (employee_id, token) = app.seed_employee("waiter@example.com").await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/employees", Some(token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // but may read their own record
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/employees/{employee_id}"),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], json!("waiter@example.com"));
    assert!(body["data"].get("password_hash").is_none());

    // and not the manager's
    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/v1/employees/{}", app.manager_id),
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::new().await;
    let token = app.manager_token.clone();
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/employees",
            Some(token.as_str()),
            Some(json!({
                "name": "Duplicate Manager",
                "email": "manager@example.com",
                "password": "another-password",
                "role": "employee",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn attendance_round_trip_counts_working_time() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_employee("waiter@example.com").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/attendance/checkin",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/attendance/checkout",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/attendance/status",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["kind"], json!("out"));

    // checkin and checkout land within the same second most of the time,
    // so only assert the field is present and non-negative
    let (status, body) = app
        .request(
            Method::GET,
            "/api/v1/attendance/working-time",
            Some(token.as_str()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["total_secs"].as_i64().expect("total secs") >= 0);
}
