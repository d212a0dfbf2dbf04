use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users;
mod m20260101_000002_create_roles;
mod m20260101_000003_create_user_phone_numbers;
mod m20260101_000004_create_categories;
mod m20260101_000005_create_products;
mod m20260101_000006_create_product_details;
mod m20260101_000007_create_orders;
mod m20260101_000008_create_order_items;
mod m20260101_000009_create_order_tracking;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users::Migration),
            Box::new(m20260101_000002_create_roles::Migration),
            Box::new(m20260101_000003_create_user_phone_numbers::Migration),
            Box::new(m20260101_000004_create_categories::Migration),
            Box::new(m20260101_000005_create_products::Migration),
            Box::new(m20260101_000006_create_product_details::Migration),
            Box::new(m20260101_000007_create_orders::Migration),
            Box::new(m20260101_000008_create_order_items::Migration),
            Box::new(m20260101_000009_create_order_tracking::Migration),
        ]
    }
}
