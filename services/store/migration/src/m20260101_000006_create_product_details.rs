use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductColors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductColors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductColors::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductColors::Color).string().not_null())
                    .col(
                        ColumnDef::new(ProductColors::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProductColors::Table, ProductColors::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductSizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductSizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductSizes::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductSizes::SizeValue).double())
                    .col(ColumnDef::new(ProductSizes::Weight).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProductSizes::Table, ProductSizes::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductImages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProductImages::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProductImages::ImagePath).string().not_null())
                    .col(
                        ColumnDef::new(ProductImages::ImageOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ProductImages::IsPrimary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ProductImages::AltText).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProductImages::Table, ProductImages::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (table, name) in [
            (ProductColors::Table.to_string(), "idx_product_colors_product_id"),
            (ProductSizes::Table.to_string(), "idx_product_sizes_product_id"),
            (ProductImages::Table.to_string(), "idx_product_images_product_id"),
        ] {
            manager
                .create_index(
                    Index::create()
                        .table(Alias::new(table))
                        .col(Alias::new("product_id"))
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProductImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductSizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductColors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProductColors {
    Table,
    Id,
    ProductId,
    Color,
    Position,
}

#[derive(Iden)]
enum ProductSizes {
    Table,
    Id,
    ProductId,
    SizeValue,
    Weight,
}

#[derive(Iden)]
enum ProductImages {
    Table,
    Id,
    ProductId,
    ImagePath,
    ImageOrder,
    IsPrimary,
    AltText,
}

#[derive(Iden)]
enum Products {
    Table,
    Id,
}
