use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::ContactNumber)
                            .string_len(15)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CompanyName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::BranchName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::GstNumber).string_len(15))
                    .col(
                        ColumnDef::new(Users::ShippingAddress)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::ContactPersonName).string_len(100))
                    .col(ColumnDef::new(Users::Email).string_len(100).unique_key())
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(16)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(Users::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::Otp).integer())
                    .col(ColumnDef::new(Users::OtpExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    ContactNumber,
    PasswordHash,
    CompanyName,
    BranchName,
    GstNumber,
    ShippingAddress,
    ContactPersonName,
    Email,
    Status,
    Enabled,
    Otp,
    OtpExpiresAt,
    CreatedAt,
    UpdatedAt,
}
