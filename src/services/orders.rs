//! Order intake and lifecycle.
//!
//! Order creation resolves every line's price concurrently: one task per
//! line, a single mutex around the running total, and a bounded channel
//! (sized to the fan-out) collecting lookup errors. Errors are drained after
//! the join; any failed lookup aborts the order and nothing is persisted.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    analytics::ItemClass,
    db::DbPool,
    entities::{order, order_item},
    errors::ServiceError,
    services::catalog::CatalogService,
};

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderLineRequest {
    pub item_id: Uuid,
    pub quantity: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    #[validate(range(min = 0, message = "Table number must be non-negative"))]
    pub table_number: i32,
    #[serde(default)]
    pub foods: Vec<OrderLineRequest>,
    #[serde(default)]
    pub drinks: Vec<OrderLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub table_number: i32,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<order_item::Model>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<order::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// SQLite strips trailing zeros from stored decimals, so rows read back
/// after insert can carry totals like `37.5`. Rescale money columns on the
/// way out so amounts always serialize with two decimals, matching
/// `CatalogService::decimal_price`.
fn normalize_order(mut row: order::Model) -> order::Model {
    row.total_amount.rescale(2);
    row
}

fn normalize_item(mut row: order_item::Model) -> order_item::Model {
    row.unit_price.rescale(2);
    row.total_price.rescale(2);
    row
}

/// A line whose price has been resolved against the catalog.
struct ResolvedLine {
    item_id: Uuid,
    class: ItemClass,
    name: String,
    quantity: Decimal,
    unit_price: Decimal,
    total_price: Decimal,
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    catalog: Arc<CatalogService>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, catalog: Arc<CatalogService>) -> Self {
        Self { db, catalog }
    }

    #[instrument(skip(self, request), fields(employee_id = %employee_id))]
    pub async fn create_order(
        &self,
        employee_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let fan_out = request.foods.len() + request.drinks.len();
        if fan_out == 0 {
            return Err(ServiceError::InvalidInput(
                "order must contain at least one item".to_string(),
            ));
        }

        let total = Arc::new(Mutex::new(Decimal::ZERO));
        let (err_tx, mut err_rx) = mpsc::channel::<ServiceError>(fan_out);

        let mut handles = Vec::with_capacity(fan_out);
        let lines = request
            .foods
            .into_iter()
            .map(|l| (ItemClass::Food, l))
            .chain(request.drinks.into_iter().map(|l| (ItemClass::Drink, l)));
        for (class, line) in lines {
            let catalog = Arc::clone(&self.catalog);
            let total = Arc::clone(&total);
            let err_tx = err_tx.clone();
            handles.push(tokio::spawn(async move {
                let quantity = match Decimal::try_from(line.quantity) {
                    Ok(q) if q > Decimal::ZERO => q,
                    _ => {
                        let _ = err_tx
                            .send(ServiceError::InvalidInput(format!(
                                "invalid quantity for item {}",
                                line.item_id
                            )))
                            .await;
                        return None;
                    }
                };
                let lookup = match class {
                    ItemClass::Food => catalog.food_price(line.item_id).await,
                    ItemClass::Drink => catalog.drink_price(line.item_id).await,
                };
                match lookup {
                    Ok((name, unit_price)) => {
                        let line_total = unit_price * quantity;
                        let mut running = total.lock().await;
                        *running += line_total;
                        Some(ResolvedLine {
                            item_id: line.item_id,
                            class,
                            name,
                            quantity,
                            unit_price,
                            total_price: line_total,
                        })
                    }
                    Err(e) => {
                        let _ = err_tx.send(e).await;
                        None
                    }
                }
            }));
        }
        drop(err_tx);

        let joined = join_all(handles).await;

        // Drain collected lookup errors after the join; one failed line
        // aborts the whole order.
        if let Some(first_err) = err_rx.recv().await {
            error!(error = %first_err, "order line price resolution failed");
            return Err(ServiceError::NotFound("item not found".to_string()));
        }

        let mut resolved = Vec::with_capacity(fan_out);
        for outcome in joined {
            match outcome {
                Ok(Some(line)) => resolved.push(line),
                Ok(None) => {
                    // error already surfaced through the channel
                    return Err(ServiceError::NotFound("item not found".to_string()));
                }
                Err(e) => return Err(ServiceError::InternalError(e.to_string())),
            }
        }

        let total_amount = *total.lock().await;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let txn = self.db.begin().await?;
        let order_model = order::ActiveModel {
            id: Set(order_id),
            employee_id: Set(employee_id),
            table_number: Set(request.table_number),
            status: Set("pending".to_string()),
            total_amount: Set(total_amount),
            created_at: Set(now),
            updated_at: Set(None),
        };
        let order_row = normalize_order(order_model.insert(&txn).await?);

        let mut items = Vec::with_capacity(resolved.len());
        for line in resolved {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                item_id: Set(line.item_id),
                item_class: Set(line.class.to_string()),
                item_name: Set(line.name),
                quantity: Set(line.quantity),
                unit_price: Set(line.unit_price),
                total_price: Set(line.total_price),
                created_at: Set(now),
            };
            items.push(normalize_item(item.insert(&txn).await?));
        }
        txn.commit().await?;

        info!(order_id = %order_id, total = %total_amount, "order created");
        Ok(OrderResponse {
            id: order_row.id,
            employee_id: order_row.employee_id,
            table_number: order_row.table_number,
            status: order_row.status,
            total_amount: order_row.total_amount,
            created_at: order_row.created_at,
            items,
        })
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let row = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))?;
        let row = normalize_order(row);
        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(normalize_item)
            .collect();
        Ok(OrderResponse {
            id: row.id,
            employee_id: row.employee_id,
            table_number: row.table_number,
            status: row.status,
            total_amount: row.total_amount,
            created_at: row.created_at,
            items,
        })
    }

    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let per_page = per_page.clamp(1, 100);
        let paginator = order::Entity::find()
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(normalize_order)
            .collect();
        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }

    pub async fn list_orders_for_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<order::Model>, ServiceError> {
        Ok(order::Entity::find()
            .filter(order::Column::EmployeeId.eq(employee_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(normalize_order)
            .collect())
    }

    #[instrument(skip(self, request))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<order::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        let row = order::Entity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", order_id)))?;
        let mut model: order::ActiveModel = row.into();
        model.status = Set(request.status);
        model.updated_at = Set(Some(Utc::now()));
        Ok(normalize_order(model.update(&*self.db).await?))
    }

    pub async fn cancel_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        self.update_order_status(
            order_id,
            UpdateOrderStatusRequest {
                status: "cancelled".to_string(),
            },
        )
        .await
    }

    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(order_id))
            .exec(&txn)
            .await?;
        let result = order::Entity::delete_by_id(order_id).exec(&txn).await?;
        txn.commit().await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "order {} not found",
                order_id
            )));
        }
        Ok(())
    }
}
