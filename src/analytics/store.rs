//! Read-only, time-windowed access to the order and attendance logs.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    db::DbPool,
    entities::{attendance_event, order, order_item},
    errors::ServiceError,
};

use super::{AttendanceKind, AttendanceRecord, ItemClass, OrderLine, OrderRecord};

/// Windowed reader over the two event collections. All windows are half-open
/// `[start, end)`, so adjacent report windows never double-count an event on
/// the boundary.
#[derive(Clone)]
pub struct EventStore {
    db: Arc<DbPool>,
}

impl EventStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Fetches orders created in `[start, end)` with their lines. An empty
    /// window returns an empty slice, not an error.
    #[instrument(skip(self))]
    pub async fn fetch_orders(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<OrderRecord>, ServiceError> {
        let rows = order::Entity::find()
            .filter(order::Column::CreatedAt.gte(start))
            .filter(order::Column::CreatedAt.lt(end))
            .order_by_asc(order::Column::CreatedAt)
            .find_with_related(order_item::Entity)
            .all(&*self.db)
            .await
            .map_err(|e| ServiceError::DataUnavailable(format!("order query failed: {}", e)))?;

        let mut records = Vec::with_capacity(rows.len());
        for (order_row, item_rows) in rows {
            records.push(order_record(order_row, item_rows)?);
        }
        Ok(records)
    }

    /// Fetches attendance events recorded in `[start, end)`.
    #[instrument(skip(self))]
    pub async fn fetch_attendance(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, ServiceError> {
        let rows = attendance_event::Entity::find()
            .filter(attendance_event::Column::RecordedAt.gte(start))
            .filter(attendance_event::Column::RecordedAt.lt(end))
            .order_by_asc(attendance_event::Column::RecordedAt)
            .all(&*self.db)
            .await
            .map_err(|e| {
                ServiceError::DataUnavailable(format!("attendance query failed: {}", e))
            })?;

        rows.into_iter().map(attendance_record).collect()
    }
}

fn order_record(
    row: order::Model,
    items: Vec<order_item::Model>,
) -> Result<OrderRecord, ServiceError> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        lines.push(OrderLine {
            item_id: item.item_id,
            class: ItemClass::from_str(&item.item_class).map_err(|_| {
                ServiceError::DataUnavailable(format!(
                    "order {} has unknown item class {:?}",
                    row.id, item.item_class
                ))
            })?,
            quantity: item.quantity.to_f64().unwrap_or(0.0),
        });
    }
    Ok(OrderRecord {
        id: row.id,
        employee_id: row.employee_id,
        lines,
        total: row.total_amount.to_f64().unwrap_or(0.0),
        status: row.status,
        created_at: row.created_at,
    })
}

fn attendance_record(row: attendance_event::Model) -> Result<AttendanceRecord, ServiceError> {
    Ok(AttendanceRecord {
        employee_id: row.employee_id,
        recorded_at: row.recorded_at,
        kind: AttendanceKind::from_str(&row.kind).map_err(|_| {
            ServiceError::DataUnavailable(format!(
                "attendance event {} has unknown kind {:?}",
                row.id, row.kind
            ))
        })?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn maps_rows_into_records() {
        let order_id = Uuid::new_v4();
        let employee_id = Uuid::new_v4();
        let item_id = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        let record = order_record(
            order::Model {
                id: order_id,
                employee_id,
                table_number: 4,
                status: "pending".to_string(),
                total_amount: dec!(42.50),
                created_at: created,
                updated_at: None,
            },
            vec![order_item::Model {
                id: Uuid::new_v4(),
                order_id,
                item_id,
                item_class: "food".to_string(),
                item_name: "tibs".to_string(),
                quantity: dec!(2),
                unit_price: dec!(21.25),
                total_price: dec!(42.50),
                created_at: created,
            }],
        )
        .unwrap();

        assert_eq!(record.total, 42.5);
        assert_eq!(record.lines.len(), 1);
        assert_eq!(record.lines[0].class, ItemClass::Food);
        assert_eq!(record.lines[0].quantity, 2.0);
    }

    #[test]
    fn unknown_item_class_is_rejected() {
        let order_id = Uuid::new_v4();
        let created = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        let result = order_record(
            order::Model {
                id: order_id,
                employee_id: Uuid::new_v4(),
                table_number: 1,
                status: "pending".to_string(),
                total_amount: dec!(1),
                created_at: created,
                updated_at: None,
            },
            vec![order_item::Model {
                id: Uuid::new_v4(),
                order_id,
                item_id: Uuid::new_v4(),
                item_class: "dessert".to_string(),
                item_name: "baklava".to_string(),
                quantity: dec!(1),
                unit_price: dec!(1),
                total_price: dec!(1),
                created_at: created,
            }],
        );
        assert!(matches!(result, Err(ServiceError::DataUnavailable(_))));
    }
}
