use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Foods and drinks share the same shape but stay separate tables:
        // order lines reference them by class + id.
        manager
            .create_table(
                Table::create()
                    .table(Foods::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Foods::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Foods::Name).string().not_null())
                    .col(ColumnDef::new(Foods::Description).text().null())
                    .col(
                        ColumnDef::new(Foods::Price)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Foods::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Foods::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Foods::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Drinks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Drinks::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Drinks::Name).string().not_null())
                    .col(ColumnDef::new(Drinks::Description).text().null())
                    .col(
                        ColumnDef::new(Drinks::Price)
                            .decimal()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Drinks::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Drinks::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Drinks::UpdatedAt).timestamp().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Drinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Foods::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Foods {
    Table,
    Id,
    Name,
    Description,
    Price,
    Available,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Drinks {
    Table,
    Id,
    Name,
    Description,
    Price,
    Available,
    CreatedAt,
    UpdatedAt,
}
