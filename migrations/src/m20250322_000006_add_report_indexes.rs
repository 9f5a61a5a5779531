use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Report generation scans orders and attendance by time window; both
// collections need a time index once the log grows past a few weeks.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_employee_id")
                    .table(Orders::Table)
                    .col(Orders::EmployeeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_events_recorded_at")
                    .table(AttendanceEvents::Table)
                    .col(AttendanceEvents::RecordedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_events_employee_id")
                    .table(AttendanceEvents::Table)
                    .col(AttendanceEvents::EmployeeId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_orders_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_employee_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_attendance_events_recorded_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_attendance_events_employee_id")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Orders {
    Table,
    CreatedAt,
    EmployeeId,
}

#[derive(Iden)]
enum AttendanceEvents {
    Table,
    RecordedAt,
    EmployeeId,
}
