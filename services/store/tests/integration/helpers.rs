use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::order::OrderStatus;
use akeshya_domain::user::{Role, UserStatus};
use akeshya_store::domain::repository::{
    CategoryRepository, EmailSender, ImageStore, OrderRepository, ProductRepository,
    UserRepository,
};
use akeshya_store::domain::types::{
    Category, CategoryDraft, CategoryQuantity, NewOrder, NewProductImage, Order, OrderItem,
    OrderTracking, Product, ProductDraft, ProductFilter, ProductImage, ProductSize, StatusTotal,
    UploadedFile, User,
};
use akeshya_store::error::StoreError;
use akeshya_store::infra::password::hash_password;

pub const TEST_JWT_SECRET: &str = "store-test-secret";

fn next(counter: &AtomicI64) -> i64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn customer(contact_number: &str, email: Option<&str>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        contact_number: contact_number.to_owned(),
        password_hash: hash_password("secret1").unwrap(),
        company_name: "Sri Gems".to_owned(),
        branch_name: "Abids".to_owned(),
        gst_number: None,
        shipping_address: "12 Jewellers Lane, Hyderabad".to_owned(),
        contact_person_name: Some("Ravi".to_owned()),
        email: email.map(str::to_owned),
        additional_phone_numbers: vec![],
        roles: vec![Role::User],
        status: UserStatus::Approved,
        enabled: true,
        otp: None,
        otp_expires_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn admin_user() -> User {
    User {
        roles: vec![Role::Admin, Role::User],
        company_name: "Akeshiya".to_owned(),
        ..customer("9999999999", Some("admin@akeshya.com"))
    }
}

pub fn identity_of(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        roles: user.roles.clone(),
    }
}

pub fn admin_identity() -> Identity {
    Identity {
        user_id: Uuid::now_v7(),
        roles: vec![Role::Admin, Role::User],
    }
}

pub fn image_upload(name: &str) -> UploadedFile {
    UploadedFile {
        file_name: Some(name.to_owned()),
        content_type: Some("image/jpeg".to_owned()),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

// ── InMemoryUsers ────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryUsers {
    pub users: Arc<Mutex<Vec<User>>>,
    /// Users treated as owning at least one order.
    pub with_orders: Arc<Mutex<HashSet<Uuid>>>,
}

impl InMemoryUsers {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            with_orders: Arc::default(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }

    pub fn mark_has_orders(&self, id: Uuid) {
        self.with_orders.lock().unwrap().insert(id);
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut User)) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::UserNotFound)?;
        f(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_contact_number(&self, number: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.contact_number == number)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), StoreError> {
        let updated = user.clone();
        self.modify(user.id, move |u| *u = updated)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: UserStatus,
        enabled: bool,
    ) -> Result<(), StoreError> {
        self.modify(id, |u| {
            u.status = status;
            u.enabled = enabled;
        })
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.modify(id, |u| {
            u.otp = otp;
            u.otp_expires_at = expires_at;
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn has_orders(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.with_orders.lock().unwrap().contains(&id))
    }
}

// ── InMemoryCatalog ──────────────────────────────────────────────────────────

/// Categories and products sharing one store, so products see category changes
/// and category deletes see products.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    pub categories: Arc<Mutex<Vec<Category>>>,
    pub products: Arc<Mutex<Vec<Product>>>,
    ids: Arc<AtomicI64>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, name: &str) -> Category {
        let now = Utc::now();
        let category = Category {
            id: next(&self.ids),
            name: name.to_owned(),
            description: None,
            status: true,
            created_at: now,
            updated_at: now,
        };
        self.categories.lock().unwrap().push(category.clone());
        category
    }

    pub fn add_product(&self, name: &str, category: &Category, published: bool) -> Product {
        let now = Utc::now();
        let product = Product {
            id: next(&self.ids),
            name: name.to_owned(),
            category: category.clone(),
            status: "Full".to_owned(),
            is_published: published,
            colors: vec![],
            sizes: vec![],
            images: vec![],
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(product.clone());
        product
    }

    fn category(&self, id: i64) -> Result<Category, StoreError> {
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(StoreError::CategoryNotFound)
    }

    fn images_from(&self, images: &[NewProductImage]) -> Vec<ProductImage> {
        images
            .iter()
            .map(|i| ProductImage {
                id: next(&self.ids),
                image_path: i.image_path.clone(),
                image_order: i.image_order,
                is_primary: i.is_primary,
                alt_text: i.alt_text.clone(),
            })
            .collect()
    }

    fn product_from(&self, id: i64, draft: &ProductDraft) -> Result<Product, StoreError> {
        let now = Utc::now();
        Ok(Product {
            id,
            name: draft.name.clone(),
            category: self.category(draft.category_id)?,
            status: draft.status.clone(),
            is_published: draft.is_published,
            colors: draft.colors.clone(),
            sizes: draft
                .sizes
                .iter()
                .map(|s| ProductSize {
                    id: next(&self.ids),
                    size_value: s.size_value,
                    weight: s.weight.clone(),
                })
                .collect(),
            images: self.images_from(&draft.images),
            created_at: now,
            updated_at: now,
        })
    }

    fn modify(&self, id: i64, f: impl FnOnce(&mut Product)) -> Result<Product, StoreError> {
        let mut products = self.products.lock().unwrap();
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProductNotFound(id))?;
        f(product);
        Ok(product.clone())
    }
}

impl CategoryRepository for InMemoryCatalog {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, StoreError> {
        Ok(self.category(id).ok())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let category = self.add_category(&draft.name);
        let mut categories = self.categories.lock().unwrap();
        let stored = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(StoreError::CategoryNotFound)?;
        stored.description = draft.description.clone();
        stored.status = draft.status;
        Ok(stored.clone())
    }

    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let mut categories = self.categories.lock().unwrap();
        let stored = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::CategoryNotFound)?;
        stored.name = draft.name.clone();
        stored.description = draft.description.clone();
        stored.status = draft.status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_status(&self, id: i64, status: bool) -> Result<Category, StoreError> {
        let mut categories = self.categories.lock().unwrap();
        let stored = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::CategoryNotFound)?;
        stored.status = status;
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.categories.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn has_products(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.category.id == id))
    }
}

impl ProductRepository for InMemoryCatalog {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| match &filter {
                ProductFilter::All => true,
                ProductFilter::Published => p.is_published,
                ProductFilter::CategoryName(name) => &p.category.name == name,
                ProductFilter::PublishedInCategory(id) => p.is_published && p.category.id == *id,
                ProductFilter::NameContains(term) => {
                    p.name.to_lowercase().contains(&term.to_lowercase())
                }
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        let product = self.product_from(next(&self.ids), draft)?;
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, StoreError> {
        let replacement = self.product_from(id, draft)?;
        self.modify(id, |p| {
            let created_at = p.created_at;
            *p = Product {
                created_at,
                ..replacement
            };
        })
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<Product, StoreError> {
        self.modify(id, |p| p.is_published = published)
    }

    async fn add_images(
        &self,
        id: i64,
        images: &[NewProductImage],
    ) -> Result<Product, StoreError> {
        let added = self.images_from(images);
        self.modify(id, |p| p.images.extend(added))
    }

    async fn remove_image(
        &self,
        product_id: i64,
        image_id: i64,
    ) -> Result<Option<String>, StoreError> {
        let mut removed = None;
        self.modify(product_id, |p| {
            let Some(pos) = p.images.iter().position(|i| i.id == image_id) else {
                return;
            };
            let image = p.images.remove(pos);
            if image.is_primary {
                if let Some(first) = p.images.iter_mut().min_by_key(|i| i.image_order) {
                    first.is_primary = true;
                }
            }
            removed = Some(image.image_path);
        })?;
        Ok(removed)
    }

    async fn category_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.category.name.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        names.sort();
        Ok(names)
    }
}

// ── InMemoryOrders ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryOrders {
    pub orders: Arc<Mutex<Vec<Order>>>,
    /// Category of each product, used for per-category quantities.
    pub product_categories: Arc<Mutex<HashMap<i64, i64>>>,
    /// Order numbers passed to `create`, in call order.
    pub attempted_numbers: Arc<Mutex<Vec<String>>>,
    /// Number of upcoming inserts that collide on the order number.
    pub collisions: Arc<AtomicU32>,
    ids: Arc<AtomicI64>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product_categories(pairs: &[(i64, i64)]) -> Self {
        let orders = Self::default();
        orders
            .product_categories
            .lock()
            .unwrap()
            .extend(pairs.iter().copied());
        orders
    }

    fn tracking_row(&self, status: OrderStatus, description: &str) -> OrderTracking {
        OrderTracking {
            id: next(&self.ids),
            status,
            description: description.to_owned(),
            created_at: Utc::now(),
        }
    }
}

impl OrderRepository for InMemoryOrders {
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn tracking(&self, order_id: i64) -> Result<Vec<OrderTracking>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.tracking.clone())
            .unwrap_or_default())
    }

    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError> {
        self.attempted_numbers
            .lock()
            .unwrap()
            .push(order.order_number.clone());
        let forced = self
            .collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Err(StoreError::OrderNumberTaken(order.order_number.clone()));
        }

        let now = Utc::now();
        let created = Order {
            id: next(&self.ids),
            order_number: order.order_number.clone(),
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: OrderStatus::Pending,
            shipping_address: order.shipping_address.clone(),
            contact_person_name: order.contact_person_name.clone(),
            contact_number: order.contact_number.clone(),
            special_instructions: order.special_instructions.clone(),
            items: order
                .items
                .iter()
                .map(|i| OrderItem {
                    id: next(&self.ids),
                    product_id: Some(i.product_id),
                    product_name: i.product_name.clone(),
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                    item_total: i.item_total,
                    selected_size: i.selected_size.clone(),
                    selected_color: i.selected_color.clone(),
                })
                .collect(),
            tracking: vec![self.tracking_row(OrderStatus::Pending, &order.initial_tracking)],
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn append_status(
        &self,
        id: i64,
        status: OrderStatus,
        description: &str,
    ) -> Result<Order, StoreError> {
        let row = self.tracking_row(status, description);
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        order.tracking.push(row);
        Ok(order.clone())
    }

    async fn status_totals(&self, user_id: Option<Uuid>) -> Result<Vec<StatusTotal>, StoreError> {
        let mut totals: HashMap<OrderStatus, StatusTotal> = HashMap::new();
        for order in self.orders.lock().unwrap().iter() {
            if user_id.is_some_and(|u| u != order.user_id) {
                continue;
            }
            let entry = totals.entry(order.status).or_insert(StatusTotal {
                status: order.status,
                count: 0,
                amount: 0.0,
            });
            entry.count += 1;
            entry.amount += order.total_amount;
        }
        Ok(totals.into_values().collect())
    }

    async fn ordered_quantities(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CategoryQuantity>, StoreError> {
        let categories = self.product_categories.lock().unwrap();
        let mut sums: HashMap<Option<i64>, i64> = HashMap::new();
        for order in self.orders.lock().unwrap().iter() {
            if order.user_id != user_id {
                continue;
            }
            for item in &order.items {
                let category = item.product_id.and_then(|p| categories.get(&p).copied());
                *sums.entry(category).or_default() += i64::from(item.quantity);
            }
        }
        Ok(sums
            .into_iter()
            .map(|(category_id, quantity)| CategoryQuantity {
                category_id,
                quantity,
            })
            .collect())
    }
}

// ── MemoryImageStore ─────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryImageStore {
    pub stored: Arc<Mutex<Vec<String>>>,
    pub removed: Arc<Mutex<Vec<String>>>,
}

impl ImageStore for MemoryImageStore {
    async fn store(&self, file: &UploadedFile) -> Result<String, StoreError> {
        let mut stored = self.stored.lock().unwrap();
        let name = file.file_name.as_deref().unwrap_or("image.jpg");
        let path = format!("/uploads/{}-{name}", stored.len());
        stored.push(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.removed.lock().unwrap().push(path.to_owned());
        Ok(())
    }
}

// ── RecordingMailer ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl EmailSender for RecordingMailer {
    async fn send_html(&self, to: &str, _subject: &str, html: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_owned(), html.to_owned()));
        format!("HTML mail sent successfully to {to}")
    }
}
