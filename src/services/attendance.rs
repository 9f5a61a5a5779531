//! Check-in/check-out intake and live attendance queries.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    analytics::{
        sessions::{accumulate_work_durations, TrailingSessionPolicy},
        AttendanceKind, AttendanceRecord,
    },
    db::DbPool,
    entities::attendance_event,
    errors::ServiceError,
};

#[derive(Clone)]
pub struct AttendanceService {
    db: Arc<DbPool>,
}

impl AttendanceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn record(
        &self,
        employee_id: Uuid,
        kind: AttendanceKind,
    ) -> Result<attendance_event::Model, ServiceError> {
        let model = attendance_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee_id),
            recorded_at: Set(Utc::now()),
            kind: Set(kind.to_string()),
        };
        Ok(model.insert(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn check_in(&self, employee_id: Uuid) -> Result<attendance_event::Model, ServiceError> {
        self.record(employee_id, AttendanceKind::CheckIn).await
    }

    #[instrument(skip(self))]
    pub async fn check_out(
        &self,
        employee_id: Uuid,
    ) -> Result<attendance_event::Model, ServiceError> {
        self.record(employee_id, AttendanceKind::CheckOut).await
    }

    /// Latest attendance event for the employee, if any.
    pub async fn status(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<attendance_event::Model>, ServiceError> {
        Ok(attendance_event::Entity::find()
            .filter(attendance_event::Column::EmployeeId.eq(employee_id))
            .order_by_desc(attendance_event::Column::RecordedAt)
            .one(&*self.db)
            .await?)
    }

    pub async fn history(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<attendance_event::Model>, ServiceError> {
        Ok(attendance_event::Entity::find()
            .filter(attendance_event::Column::EmployeeId.eq(employee_id))
            .order_by_asc(attendance_event::Column::RecordedAt)
            .all(&*self.db)
            .await?)
    }

    /// Work time accumulated in the last 24 hours. This is the live view:
    /// an ongoing shift counts up to `now`, unlike closed reports which drop
    /// trailing open sessions.
    #[instrument(skip(self))]
    pub async fn todays_working_time(
        &self,
        employee_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Duration, ServiceError> {
        let start = now - Duration::days(1);
        let rows = attendance_event::Entity::find()
            .filter(attendance_event::Column::EmployeeId.eq(employee_id))
            .filter(attendance_event::Column::RecordedAt.gte(start))
            .filter(attendance_event::Column::RecordedAt.lt(now))
            .order_by_asc(attendance_event::Column::RecordedAt)
            .all(&*self.db)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(AttendanceRecord {
                employee_id: row.employee_id,
                recorded_at: row.recorded_at,
                kind: AttendanceKind::from_str(&row.kind).map_err(|_| {
                    ServiceError::InternalError(format!(
                        "attendance event {} has unknown kind {:?}",
                        row.id, row.kind
                    ))
                })?,
            });
        }

        let durations =
            accumulate_work_durations(&records, TrailingSessionPolicy::CountOngoing, now);
        Ok(durations
            .get(&employee_id)
            .copied()
            .unwrap_or_else(Duration::zero))
    }
}
