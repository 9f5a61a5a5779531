//! Employee accounts: CRUD and credential checks.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{parse_role, AuthService, Role},
    db::DbPool,
    entities::employee,
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub employee_id: Uuid,
    pub role: Role,
}

#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DbPool>,
    auth: Arc<AuthService>,
}

impl EmployeeService {
    pub fn new(db: Arc<DbPool>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<employee::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = employee::Entity::find()
            .filter(employee::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "employee with email {} already exists",
                request.email
            )));
        }

        let model = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            password_hash: Set(self.auth.hash_password(&request.password)?),
            role: Set(request.role.to_string()),
            status: Set("active".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model.insert(&*self.db).await?;
        info!(employee_id = %created.id, "employee created");
        Ok(created)
    }

    pub async fn get_employee(&self, id: Uuid) -> Result<employee::Model, ServiceError> {
        employee::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("employee {} not found", id)))
    }

    pub async fn list_employees(&self) -> Result<Vec<employee::Model>, ServiceError> {
        Ok(employee::Entity::find().all(&*self.db).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_employee(
        &self,
        id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<employee::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let existing = self.get_employee(id).await?;
        let mut model: employee::ActiveModel = existing.into();
        if let Some(name) = request.name {
            model.name = Set(name);
        }
        if let Some(phone) = request.phone_number {
            model.phone_number = Set(Some(phone));
        }
        if let Some(role) = request.role {
            model.role = Set(role.to_string());
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Some(Utc::now()));
        Ok(model.update(&*self.db).await?)
    }

    pub async fn delete_employee(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = employee::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("employee {} not found", id)));
        }
        Ok(())
    }

    /// Verifies credentials and issues a bearer token. The stored role is
    /// parsed into the closed enum; an unparseable role is a server error,
    /// never a silent grant.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let employee = employee::Entity::find()
            .filter(employee::Column::Email.eq(request.email.clone()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid credentials".to_string()))?;

        if !self
            .auth
            .verify_password(&request.password, &employee.password_hash)?
        {
            return Err(ServiceError::Unauthorized("invalid credentials".to_string()));
        }

        let role = parse_role(&employee.role)?;
        let token = self.auth.issue_token(employee.id, role)?;
        Ok(LoginResponse {
            token,
            employee_id: employee.id,
            role,
        })
    }
}
