use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPhoneNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPhoneNumbers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserPhoneNumbers::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserPhoneNumbers::PhoneNumber)
                            .string_len(15)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPhoneNumbers::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserPhoneNumbers::Table, UserPhoneNumbers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserPhoneNumbers::Table)
                    .col(UserPhoneNumbers::UserId)
                    .name("idx_user_phone_numbers_user_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPhoneNumbers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserPhoneNumbers {
    Table,
    Id,
    UserId,
    PhoneNumber,
    Position,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
