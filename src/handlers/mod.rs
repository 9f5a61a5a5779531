pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod employees;
pub mod health;
pub mod orders;
pub mod reports;

use std::sync::Arc;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::{
    attendance::AttendanceService, catalog::CatalogService, employees::EmployeeService,
    orders::OrderService, reports::ReportService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub employees: Arc<EmployeeService>,
    pub catalog: Arc<CatalogService>,
    pub orders: Arc<OrderService>,
    pub attendance: Arc<AttendanceService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>, config: &AppConfig) -> Self {
        let catalog = Arc::new(CatalogService::new(Arc::clone(&db)));
        Self {
            employees: Arc::new(EmployeeService::new(Arc::clone(&db), auth)),
            orders: Arc::new(OrderService::new(Arc::clone(&db), Arc::clone(&catalog))),
            attendance: Arc::new(AttendanceService::new(Arc::clone(&db))),
            reports: Arc::new(ReportService::new(
                Arc::clone(&db),
                config.report_dir.clone(),
            )),
            catalog,
        }
    }
}
