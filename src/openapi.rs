use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mesob API",
        version = env!("CARGO_PKG_VERSION"),
        description = r#"
Restaurant operations API: employee accounts, attendance tracking, the
food and drink catalog, order intake, and periodic analytics reports.

All endpoints except `/auth/login` and the health probes require a JWT
bearer token:

```
Authorization: Bearer <token>
```
        "#,
    ),
    modifiers(&BearerAuth),
    paths(
        crate::handlers::auth::login,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,
        crate::handlers::catalog::create_food,
        crate::handlers::catalog::list_foods,
        crate::handlers::catalog::get_food,
        crate::handlers::catalog::update_food,
        crate::handlers::catalog::delete_food,
        crate::handlers::catalog::create_drink,
        crate::handlers::catalog::list_drinks,
        crate::handlers::catalog::get_drink,
        crate::handlers::catalog::update_drink,
        crate::handlers::catalog::delete_drink,
        crate::handlers::orders::create_order,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::list_own_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::delete_order,
        crate::handlers::attendance::check_in,
        crate::handlers::attendance::check_out,
        crate::handlers::attendance::own_status,
        crate::handlers::attendance::own_working_time,
        crate::handlers::attendance::history,
        crate::handlers::reports::get_report,
        crate::handlers::reports::export_report,
    ),
    tags(
        (name = "Auth", description = "Token issuance"),
        (name = "Employees", description = "Employee accounts"),
        (name = "Catalog", description = "Food and drink catalog"),
        (name = "Orders", description = "Order intake and lifecycle"),
        (name = "Attendance", description = "Check-in and check-out tracking"),
        (name = "Reports", description = "Periodic analytics reports"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
