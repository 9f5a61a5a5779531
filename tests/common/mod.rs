use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use mesob_api::{
    auth::Role,
    config::AppConfig,
    db,
    services::employees::CreateEmployeeRequest,
    AppState,
};

/// Test harness backed by a SQLite database in a temp directory. The
/// directory also receives exported reports, and is removed on drop.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub manager_token: String,
    pub manager_id: Uuid,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let db_path = dir.path().join("mesob_test.db");
        let report_dir = dir.path().join("reports");

        let mut cfg = test_config();
        cfg.database_url = format!("sqlite://{}?mode=rwc", db_path.display());
        cfg.report_dir = report_dir.display().to_string();

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = mesob_api::app(state.clone());

        let manager = state
            .services
            .employees
            .create_employee(CreateEmployeeRequest {
                name: "Test Manager".to_string(),
                email: "manager@example.com".to_string(),
                phone_number: None,
                password: "manager-password".to_string(),
                role: Role::Manager,
            })
            .await
            .expect("failed to seed manager");
        let manager_token = state
            .auth
            .issue_token(manager.id, Role::Manager)
            .expect("failed to issue manager token");

        Self {
            router,
            state,
            manager_token,
            manager_id: manager.id,
            _dir: dir,
        }
    }

    /// Registers an employee-role account and returns its id and token.
    pub async fn seed_employee(&self, email: &str) -> (Uuid, String) {
        let employee = self
            .state
            .services
            .employees
            .create_employee(CreateEmployeeRequest {
                name: "Test Employee".to_string(),
                email: email.to_string(),
                phone_number: None,
                password: "employee-password".to_string(),
                role: Role::Employee,
            })
            .await
            .expect("failed to seed employee");
        let token = self
            .state
            .auth
            .issue_token(employee.id, Role::Employee)
            .expect("failed to issue employee token");
        (employee.id, token)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        json_body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match json_body {
            Some(value) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response was not JSON")
        };
        (status, value)
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        environment: "test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        auto_migrate: false,
        log_level: "warn".to_string(),
        log_json: false,
        jwt_secret: "test_secret_key_for_testing_purposes_only_32chars".to_string(),
        jwt_expiration_secs: 3600,
        report_dir: "reports".to_string(),
        enable_report_scheduler: false,
    }
}
