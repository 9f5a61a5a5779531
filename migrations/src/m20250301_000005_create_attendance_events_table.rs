use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only check-in/check-out log; rows are never updated.
        manager
            .create_table(
                Table::create()
                    .table(AttendanceEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceEvents::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::EmployeeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AttendanceEvents::RecordedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AttendanceEvents::Kind).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceEvents::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AttendanceEvents {
    Table,
    Id,
    EmployeeId,
    RecordedAt,
    Kind,
}
