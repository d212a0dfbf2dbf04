#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use akeshya_domain::order::OrderStatus;
use akeshya_domain::user::UserStatus;

use crate::domain::types::{
    Category, CategoryDraft, CategoryQuantity, NewOrder, NewProductImage, Order, OrderTracking,
    Product, ProductDraft, ProductFilter, StatusTotal, UploadedFile, User,
};
use crate::error::StoreError;

/// Repository for user accounts, their roles and phone numbers.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_contact_number(&self, number: &str) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;

    /// Insert the user with roles and phone numbers in one transaction.
    async fn create(&self, user: &User) -> Result<(), StoreError>;

    /// Write profile fields and replace the extra phone numbers.
    async fn update_profile(&self, user: &User) -> Result<(), StoreError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: UserStatus,
        enabled: bool,
    ) -> Result<(), StoreError>;

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    async fn has_orders(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Repository for catalog categories.
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, StoreError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError>;
    async fn create(&self, draft: &CategoryDraft) -> Result<Category, StoreError>;
    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category, StoreError>;
    async fn set_status(&self, id: i64, status: bool) -> Result<Category, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    async fn has_products(&self, id: i64) -> Result<bool, StoreError>;
}

/// Repository for products and their colors, sizes and images.
pub trait ProductRepository: Send + Sync {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;
    async fn create(&self, draft: &ProductDraft) -> Result<Product, StoreError>;
    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    async fn set_published(&self, id: i64, published: bool) -> Result<Product, StoreError>;
    async fn add_images(
        &self,
        id: i64,
        images: &[NewProductImage],
    ) -> Result<Product, StoreError>;

    /// Delete an image of a product, promoting the first remaining image when the
    /// deleted one was primary. Returns the stored path, or `None` if the image
    /// does not belong to the product.
    async fn remove_image(
        &self,
        product_id: i64,
        image_id: i64,
    ) -> Result<Option<String>, StoreError>;

    /// Distinct names of categories that have at least one product.
    async fn category_names(&self) -> Result<Vec<String>, StoreError>;
}

/// Repository for orders, items and tracking history.
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, StoreError>;
    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, StoreError>;

    /// Orders of one user, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    /// Tracking rows of one order, oldest first.
    async fn tracking(&self, order_id: i64) -> Result<Vec<OrderTracking>, StoreError>;

    /// Insert order, items and the initial `PENDING` tracking row in one transaction.
    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError>;

    /// Set the status and append one tracking row in one transaction.
    async fn append_status(
        &self,
        id: i64,
        status: OrderStatus,
        description: &str,
    ) -> Result<Order, StoreError>;

    /// Count and amount per status, optionally restricted to one user.
    async fn status_totals(&self, user_id: Option<Uuid>) -> Result<Vec<StatusTotal>, StoreError>;

    /// Ordered quantity per category for one user, across all orders.
    async fn ordered_quantities(&self, user_id: Uuid)
    -> Result<Vec<CategoryQuantity>, StoreError>;
}

/// Storage for uploaded product images.
pub trait ImageStore: Send + Sync {
    /// Validate and persist `file`, returning its public path.
    async fn store(&self, file: &UploadedFile) -> Result<String, StoreError>;

    /// Remove a previously stored file. Missing files are ignored.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
}

/// Outbound HTML email.
pub trait EmailSender: Send + Sync {
    /// Send one message and return a human-readable delivery report. Failures are
    /// reported in the returned text, never as an error.
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> String;
}
