//! Food and drink catalog: CRUD plus the price lookups order intake fans
//! out to.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{drink, food},
    errors::ServiceError,
};

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be non-negative"))]
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must be non-negative"))]
    pub price: Option<f64>,
    pub available: Option<bool>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    fn decimal_price(price: f64) -> Result<Decimal, ServiceError> {
        let mut value = Decimal::try_from(price)
            .map_err(|_| ServiceError::InvalidInput(format!("invalid price: {}", price)))?
            .round_dp(2);
        // normalize the scale so money always reads with two decimals
        value.rescale(2);
        Ok(value)
    }

    // -- foods ---------------------------------------------------------

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_food(&self, request: CreateItemRequest) -> Result<food::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let model = food::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(Self::decimal_price(request.price)?),
            available: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn get_food(&self, id: Uuid) -> Result<food::Model, ServiceError> {
        food::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("food {} not found", id)))
    }

    pub async fn list_foods(&self) -> Result<Vec<food::Model>, ServiceError> {
        Ok(food::Entity::find().all(&*self.db).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_food(
        &self,
        id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<food::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let existing = self.get_food(id).await?;
        let mut model: food::ActiveModel = existing.into();
        if let Some(name) = request.name {
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(price) = request.price {
            model.price = Set(Self::decimal_price(price)?);
        }
        if let Some(available) = request.available {
            model.available = Set(available);
        }
        model.updated_at = Set(Some(Utc::now()));
        Ok(model.update(&*self.db).await?)
    }

    pub async fn delete_food(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = food::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("food {} not found", id)));
        }
        Ok(())
    }

    /// Unit price used by order intake. Unknown or unavailable items are
    /// NotFound so a bad order line aborts order creation.
    pub async fn food_price(&self, id: Uuid) -> Result<(String, Decimal), ServiceError> {
        let item = self.get_food(id).await?;
        if !item.available {
            return Err(ServiceError::NotFound(format!("food {} not available", id)));
        }
        Ok((item.name, item.price))
    }

    // -- drinks --------------------------------------------------------

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_drink(
        &self,
        request: CreateItemRequest,
    ) -> Result<drink::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let model = drink::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(Self::decimal_price(request.price)?),
            available: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Ok(model.insert(&*self.db).await?)
    }

    pub async fn get_drink(&self, id: Uuid) -> Result<drink::Model, ServiceError> {
        drink::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("drink {} not found", id)))
    }

    pub async fn list_drinks(&self) -> Result<Vec<drink::Model>, ServiceError> {
        Ok(drink::Entity::find().all(&*self.db).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn update_drink(
        &self,
        id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<drink::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let existing = self.get_drink(id).await?;
        let mut model: drink::ActiveModel = existing.into();
        if let Some(name) = request.name {
            model.name = Set(name);
        }
        if let Some(description) = request.description {
            model.description = Set(Some(description));
        }
        if let Some(price) = request.price {
            model.price = Set(Self::decimal_price(price)?);
        }
        if let Some(available) = request.available {
            model.available = Set(available);
        }
        model.updated_at = Set(Some(Utc::now()));
        Ok(model.update(&*self.db).await?)
    }

    pub async fn delete_drink(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = drink::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("drink {} not found", id)));
        }
        Ok(())
    }

    pub async fn drink_price(&self, id: Uuid) -> Result<(String, Decimal), ServiceError> {
        let item = self.get_drink(id).await?;
        if !item.available {
            return Err(ServiceError::NotFound(format!(
                "drink {} not available",
                id
            )));
        }
        Ok((item.name, item.price))
    }
}
