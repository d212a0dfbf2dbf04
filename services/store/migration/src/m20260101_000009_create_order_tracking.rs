use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderTracking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderTracking::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OrderTracking::OrderId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OrderTracking::Status).string_len(16).not_null())
                    .col(ColumnDef::new(OrderTracking::Description).text().not_null())
                    .col(
                        ColumnDef::new(OrderTracking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OrderTracking::Table, OrderTracking::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OrderTracking::Table)
                    .col(OrderTracking::OrderId)
                    .col(OrderTracking::CreatedAt)
                    .name("idx_order_tracking_order_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderTracking::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OrderTracking {
    Table,
    Id,
    OrderId,
    Status,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
}
