//! sea-orm entities for the store database.

pub mod categories;
pub mod order_items;
pub mod order_tracking;
pub mod orders;
pub mod product_colors;
pub mod product_images;
pub mod product_sizes;
pub mod products;
pub mod roles;
pub mod user_phone_numbers;
pub mod user_roles;
pub mod users;
