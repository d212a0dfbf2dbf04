use chrono::{DateTime, Utc};
use uuid::Uuid;

use akeshya_domain::order::OrderStatus;
use akeshya_domain::user::{Role, UserStatus};

// ── Users ────────────────────────────────────────────────────────────────────

/// Customer or admin account with its roles and extra phone numbers loaded.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub contact_number: String,
    pub password_hash: String,
    pub company_name: String,
    pub branch_name: String,
    pub gst_number: Option<String>,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub email: Option<String>,
    pub additional_phone_numbers: Vec<String>,
    pub roles: Vec<Role>,
    pub status: UserStatus,
    pub enabled: bool,
    pub otp: Option<i32>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryDraft {
    pub name: String,
    pub description: Option<String>,
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSize {
    pub id: i64,
    pub size_value: Option<f64>,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub id: i64,
    pub image_path: String,
    pub image_order: i32,
    pub is_primary: bool,
    pub alt_text: Option<String>,
}

/// Product with its category and owned collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub status: String,
    pub is_published: bool,
    pub colors: Vec<String>,
    pub sizes: Vec<ProductSize>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.iter().find(|i| i.is_primary)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProductSize {
    pub size_value: Option<f64>,
    pub weight: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProductImage {
    pub image_path: String,
    pub image_order: i32,
    pub is_primary: bool,
    pub alt_text: Option<String>,
}

/// Complete product state written on create and update. Collections replace
/// whatever the product held before.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub category_id: i64,
    pub status: String,
    pub is_published: bool,
    pub colors: Vec<String>,
    pub sizes: Vec<NewProductSize>,
    pub images: Vec<NewProductImage>,
}

/// Row selection for product listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    Published,
    CategoryName(String),
    PublishedInCategory(i64),
    NameContains(String),
}

/// File received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub item_total: f64,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTracking {
    pub id: i64,
    pub status: OrderStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Order with items and tracking history (oldest first).
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub order_number: String,
    pub user_id: Uuid,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub contact_number: String,
    pub special_instructions: Option<String>,
    pub items: Vec<OrderItem>,
    pub tracking: Vec<OrderTracking>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub item_total: f64,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

/// Order as assembled before persistence. Written together with its items and
/// the initial tracking row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: Uuid,
    pub total_amount: f64,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub contact_number: String,
    pub special_instructions: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub initial_tracking: String,
}

/// Order count and amount sum for one status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusTotal {
    pub status: OrderStatus,
    pub count: u64,
    pub amount: f64,
}

/// Quantity ordered by one user within one category. `category_id` is `None`
/// for lines whose product has since been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryQuantity {
    pub category_id: Option<i64>,
    pub quantity: i64,
}
