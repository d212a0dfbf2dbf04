use std::collections::HashMap;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, FromQueryResult, IntoActiveModel as _, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, Statement, TransactionError, TransactionTrait,
    sea_query::{Expr, Func},
};
use uuid::Uuid;

use akeshya_domain::order::OrderStatus;
use akeshya_domain::user::{Role, UserStatus};
use akeshya_store_schema::{
    categories, order_items, order_tracking, orders, product_colors, product_images,
    product_sizes, products, roles, user_phone_numbers, user_roles, users,
};

use crate::domain::repository::{
    CategoryRepository, OrderRepository, ProductRepository, UserRepository,
};
use crate::domain::types::{
    Category, CategoryDraft, CategoryQuantity, NewOrder, NewProductImage, Order, OrderItem,
    OrderTracking, Product, ProductDraft, ProductFilter, ProductImage, ProductSize, StatusTotal,
    User,
};
use crate::error::StoreError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl DbUserRepository {
    async fn first(&self, model: Option<users::Model>) -> Result<Option<User>, StoreError> {
        let Some(model) = model else {
            return Ok(None);
        };
        Ok(load_users(&self.db, vec![model]).await?.pop())
    }
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        self.first(model).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        self.first(model).await
    }

    async fn find_by_contact_number(&self, number: &str) -> Result<Option<User>, StoreError> {
        let model = users::Entity::find()
            .filter(users::Column::ContactNumber.eq(number))
            .one(&self.db)
            .await
            .context("find user by contact number")?;
        self.first(model).await
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(load_users(&self.db, models).await?)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = users::Entity::find()
            .count(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }

    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        contact_number: Set(user.contact_number.clone()),
                        password_hash: Set(user.password_hash.clone()),
                        company_name: Set(user.company_name.clone()),
                        branch_name: Set(user.branch_name.clone()),
                        gst_number: Set(user.gst_number.clone()),
                        shipping_address: Set(user.shipping_address.clone()),
                        contact_person_name: Set(user.contact_person_name.clone()),
                        email: Set(user.email.clone()),
                        status: Set(user.status.as_str().to_owned()),
                        enabled: Set(user.enabled),
                        otp: Set(user.otp),
                        otp_expires_at: Set(user.otp_expires_at),
                        created_at: Set(user.created_at),
                        updated_at: Set(user.updated_at),
                    }
                    .insert(txn)
                    .await?;

                    let names: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
                    let found = roles::Entity::find()
                        .filter(roles::Column::Name.is_in(names.clone()))
                        .all(txn)
                        .await?;
                    if found.len() != names.len() {
                        return Err(DbErr::Custom(format!(
                            "roles not seeded: expected {names:?}, found {}",
                            found.len()
                        )));
                    }
                    user_roles::Entity::insert_many(found.into_iter().map(|role| {
                        user_roles::ActiveModel {
                            user_id: Set(user.id),
                            role_id: Set(role.id),
                        }
                    }))
                    .exec_without_returning(txn)
                    .await?;

                    insert_phone_numbers(txn, user.id, &user.additional_phone_numbers).await
                })
            })
            .await
            .context("create user")?;
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let user = user.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user.id),
                        company_name: Set(user.company_name.clone()),
                        branch_name: Set(user.branch_name.clone()),
                        gst_number: Set(user.gst_number.clone()),
                        shipping_address: Set(user.shipping_address.clone()),
                        contact_person_name: Set(user.contact_person_name.clone()),
                        email: Set(user.email.clone()),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;

                    user_phone_numbers::Entity::delete_many()
                        .filter(user_phone_numbers::Column::UserId.eq(user.id))
                        .exec(txn)
                        .await?;
                    insert_phone_numbers(txn, user.id, &user.additional_phone_numbers).await
                })
            })
            .await
            .context("update user profile")?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: UserStatus,
        enabled: bool,
    ) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            enabled: Set(enabled),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user status")?;
        Ok(())
    }

    async fn set_otp(
        &self,
        id: Uuid,
        otp: Option<i32>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        users::ActiveModel {
            id: Set(id),
            otp: Set(otp),
            otp_expires_at: Set(expires_at),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set user otp")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }

    async fn has_orders(&self, id: Uuid) -> Result<bool, StoreError> {
        let count = orders::Entity::find()
            .filter(orders::Column::UserId.eq(id))
            .count(&self.db)
            .await
            .context("count user orders")?;
        Ok(count > 0)
    }
}

async fn insert_phone_numbers<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    numbers: &[String],
) -> Result<(), DbErr> {
    if numbers.is_empty() {
        return Ok(());
    }
    user_phone_numbers::Entity::insert_many(numbers.iter().enumerate().map(|(i, number)| {
        user_phone_numbers::ActiveModel {
            user_id: Set(user_id),
            phone_number: Set(number.clone()),
            position: Set(i as i32),
            ..Default::default()
        }
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Attach roles and phone numbers to user rows with one query per collection.
async fn load_users<C: ConnectionTrait>(
    db: &C,
    models: Vec<users::Model>,
) -> anyhow::Result<Vec<User>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

    let role_rows = user_roles::Entity::find()
        .filter(user_roles::Column::UserId.is_in(ids.clone()))
        .find_also_related(roles::Entity)
        .all(db)
        .await
        .context("load user roles")?;
    let mut roles_by_user: HashMap<Uuid, Vec<Role>> = HashMap::new();
    for (link, role) in role_rows {
        if let Some(role) = role.and_then(|r| Role::from_name(&r.name)) {
            roles_by_user.entry(link.user_id).or_default().push(role);
        }
    }

    let phone_rows = user_phone_numbers::Entity::find()
        .filter(user_phone_numbers::Column::UserId.is_in(ids))
        .order_by_asc(user_phone_numbers::Column::Position)
        .all(db)
        .await
        .context("load user phone numbers")?;
    let mut phones_by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in phone_rows {
        phones_by_user
            .entry(row.user_id)
            .or_default()
            .push(row.phone_number);
    }

    models
        .into_iter()
        .map(|model| {
            let mut roles = roles_by_user.remove(&model.id).unwrap_or_default();
            roles.sort();
            let phones = phones_by_user.remove(&model.id).unwrap_or_default();
            user_from_model(model, roles, phones)
        })
        .collect()
}

fn user_from_model(
    model: users::Model,
    roles: Vec<Role>,
    phones: Vec<String>,
) -> anyhow::Result<User> {
    let status = model
        .status
        .parse::<UserStatus>()
        .with_context(|| format!("user {} has invalid status", model.id))?;
    Ok(User {
        id: model.id,
        contact_number: model.contact_number,
        password_hash: model.password_hash,
        company_name: model.company_name,
        branch_name: model.branch_name,
        gst_number: model.gst_number,
        shipping_address: model.shipping_address,
        contact_person_name: model.contact_person_name,
        email: model.email,
        additional_phone_numbers: phones,
        roles,
        status,
        enabled: model.enabled,
        otp: model.otp,
        otp_expires_at: model.otp_expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Category repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCategoryRepository {
    pub db: DatabaseConnection,
}

impl CategoryRepository for DbCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.db)
            .await
            .context("list categories")?;
        Ok(models.into_iter().map(category_from_model).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, StoreError> {
        let model = categories::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find category by id")?;
        Ok(model.map(category_from_model))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, StoreError> {
        let model = categories::Entity::find()
            .filter(categories::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find category by name")?;
        Ok(model.map(category_from_model))
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let now = Utc::now();
        let model = categories::ActiveModel {
            name: Set(draft.name.clone()),
            description: Set(draft.description.clone()),
            status: Set(draft.status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .context("create category")?;
        Ok(category_from_model(model))
    }

    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let model = categories::ActiveModel {
            id: Set(id),
            name: Set(draft.name.clone()),
            description: Set(draft.description.clone()),
            status: Set(draft.status),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update category")?;
        Ok(category_from_model(model))
    }

    async fn set_status(&self, id: i64, status: bool) -> Result<Category, StoreError> {
        let model = categories::ActiveModel {
            id: Set(id),
            status: Set(status),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update category status")?;
        Ok(category_from_model(model))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        categories::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete category")?;
        Ok(())
    }

    async fn has_products(&self, id: i64) -> Result<bool, StoreError> {
        let count = products::Entity::find()
            .filter(products::Column::CategoryId.eq(id))
            .count(&self.db)
            .await
            .context("count category products")?;
        Ok(count > 0)
    }
}

fn category_from_model(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Product repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbProductRepository {
    pub db: DatabaseConnection,
}

impl DbProductRepository {
    async fn load_one(&self, id: i64) -> Result<Product, StoreError> {
        self.find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))
    }
}

impl ProductRepository for DbProductRepository {
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let query = products::Entity::find();
        let query = match filter {
            ProductFilter::All => query,
            ProductFilter::Published => query.filter(products::Column::IsPublished.eq(true)),
            ProductFilter::CategoryName(name) => query
                .inner_join(categories::Entity)
                .filter(categories::Column::Name.eq(name)),
            ProductFilter::PublishedInCategory(category_id) => query
                .filter(products::Column::CategoryId.eq(category_id))
                .filter(products::Column::IsPublished.eq(true)),
            ProductFilter::NameContains(term) => {
                let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                query.filter(
                    Expr::expr(Func::lower(Expr::col((
                        products::Entity,
                        products::Column::Name,
                    ))))
                    .like(pattern),
                )
            }
        };
        let models = query
            .order_by_asc(products::Column::Id)
            .all(&self.db)
            .await
            .context("list products")?;
        Ok(load_products(&self.db, models).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let Some(model) = products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find product by id")?
        else {
            return Ok(None);
        };
        Ok(load_products(&self.db, vec![model]).await?.pop())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        let id = self
            .db
            .transaction::<_, i64, DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let product = products::ActiveModel {
                        name: Set(draft.name.clone()),
                        category_id: Set(draft.category_id),
                        status: Set(draft.status.clone()),
                        is_published: Set(draft.is_published),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    write_collections(txn, product.id, &draft).await?;
                    Ok(product.id)
                })
            })
            .await
            .context("create product")?;
        self.load_one(id).await
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    products::ActiveModel {
                        id: Set(id),
                        name: Set(draft.name.clone()),
                        category_id: Set(draft.category_id),
                        status: Set(draft.status.clone()),
                        is_published: Set(draft.is_published),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;

                    product_colors::Entity::delete_many()
                        .filter(product_colors::Column::ProductId.eq(id))
                        .exec(txn)
                        .await?;
                    product_sizes::Entity::delete_many()
                        .filter(product_sizes::Column::ProductId.eq(id))
                        .exec(txn)
                        .await?;
                    product_images::Entity::delete_many()
                        .filter(product_images::Column::ProductId.eq(id))
                        .exec(txn)
                        .await?;
                    write_collections(txn, id, &draft).await
                })
            })
            .await
            .context("update product")?;
        self.load_one(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        products::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete product")?;
        Ok(())
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<Product, StoreError> {
        products::ActiveModel {
            id: Set(id),
            is_published: Set(published),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update product publish flag")?;
        self.load_one(id).await
    }

    async fn add_images(
        &self,
        id: i64,
        images: &[NewProductImage],
    ) -> Result<Product, StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let images = images.to_vec();
                Box::pin(async move {
                    insert_images(txn, id, &images).await?;
                    products::ActiveModel {
                        id: Set(id),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("add product images")?;
        self.load_one(id).await
    }

    async fn remove_image(
        &self,
        product_id: i64,
        image_id: i64,
    ) -> Result<Option<String>, StoreError> {
        let removed = self
            .db
            .transaction::<_, Option<String>, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(image) = product_images::Entity::find_by_id(image_id)
                        .filter(product_images::Column::ProductId.eq(product_id))
                        .one(txn)
                        .await?
                    else {
                        return Ok(None);
                    };
                    product_images::Entity::delete_by_id(image.id)
                        .exec(txn)
                        .await?;

                    if image.is_primary {
                        let next = product_images::Entity::find()
                            .filter(product_images::Column::ProductId.eq(product_id))
                            .order_by_asc(product_images::Column::ImageOrder)
                            .order_by_asc(product_images::Column::Id)
                            .one(txn)
                            .await?;
                        if let Some(next) = next {
                            let mut next = next.into_active_model();
                            next.is_primary = Set(true);
                            next.update(txn).await?;
                        }
                    }
                    Ok(Some(image.image_path))
                })
            })
            .await
            .context("remove product image")?;
        Ok(removed)
    }

    async fn category_names(&self) -> Result<Vec<String>, StoreError> {
        let ids: Vec<i64> = products::Entity::find()
            .select_only()
            .column(products::Column::CategoryId)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .context("list product category ids")?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let names = categories::Entity::find()
            .filter(categories::Column::Id.is_in(ids))
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await
            .context("list product categories")?
            .into_iter()
            .map(|c| c.name)
            .collect();
        Ok(names)
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

async fn write_collections<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
    draft: &ProductDraft,
) -> Result<(), DbErr> {
    if !draft.colors.is_empty() {
        product_colors::Entity::insert_many(draft.colors.iter().enumerate().map(|(i, color)| {
            product_colors::ActiveModel {
                product_id: Set(product_id),
                color: Set(color.clone()),
                position: Set(i as i32),
                ..Default::default()
            }
        }))
        .exec_without_returning(db)
        .await?;
    }
    if !draft.sizes.is_empty() {
        product_sizes::Entity::insert_many(draft.sizes.iter().map(|size| {
            product_sizes::ActiveModel {
                product_id: Set(product_id),
                size_value: Set(size.size_value),
                weight: Set(size.weight.clone()),
                ..Default::default()
            }
        }))
        .exec_without_returning(db)
        .await?;
    }
    insert_images(db, product_id, &draft.images).await
}

async fn insert_images<C: ConnectionTrait>(
    db: &C,
    product_id: i64,
    images: &[NewProductImage],
) -> Result<(), DbErr> {
    if images.is_empty() {
        return Ok(());
    }
    product_images::Entity::insert_many(images.iter().map(|image| {
        product_images::ActiveModel {
            product_id: Set(product_id),
            image_path: Set(image.image_path.clone()),
            image_order: Set(image.image_order),
            is_primary: Set(image.is_primary),
            alt_text: Set(image.alt_text.clone()),
            ..Default::default()
        }
    }))
    .exec_without_returning(db)
    .await?;
    Ok(())
}

/// Attach category, colors, sizes and images to product rows.
async fn load_products<C: ConnectionTrait>(
    db: &C,
    models: Vec<products::Model>,
) -> anyhow::Result<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
    let category_ids: Vec<i64> = models.iter().map(|m| m.category_id).collect();

    let categories_by_id: HashMap<i64, Category> = categories::Entity::find()
        .filter(categories::Column::Id.is_in(category_ids))
        .all(db)
        .await
        .context("load product categories")?
        .into_iter()
        .map(|c| (c.id, category_from_model(c)))
        .collect();

    let mut colors: HashMap<i64, Vec<String>> = HashMap::new();
    for row in product_colors::Entity::find()
        .filter(product_colors::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_colors::Column::Position)
        .all(db)
        .await
        .context("load product colors")?
    {
        colors.entry(row.product_id).or_default().push(row.color);
    }

    let mut sizes: HashMap<i64, Vec<ProductSize>> = HashMap::new();
    for row in product_sizes::Entity::find()
        .filter(product_sizes::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(product_sizes::Column::Id)
        .all(db)
        .await
        .context("load product sizes")?
    {
        sizes.entry(row.product_id).or_default().push(ProductSize {
            id: row.id,
            size_value: row.size_value,
            weight: row.weight,
        });
    }

    let mut images: HashMap<i64, Vec<ProductImage>> = HashMap::new();
    for row in product_images::Entity::find()
        .filter(product_images::Column::ProductId.is_in(ids))
        .order_by_asc(product_images::Column::ImageOrder)
        .order_by_asc(product_images::Column::Id)
        .all(db)
        .await
        .context("load product images")?
    {
        images.entry(row.product_id).or_default().push(ProductImage {
            id: row.id,
            image_path: row.image_path,
            image_order: row.image_order,
            is_primary: row.is_primary,
            alt_text: row.alt_text,
        });
    }

    models
        .into_iter()
        .map(|model| {
            let category = categories_by_id
                .get(&model.category_id)
                .cloned()
                .with_context(|| format!("product {} references missing category", model.id))?;
            Ok(Product {
                id: model.id,
                name: model.name,
                category,
                status: model.status,
                is_published: model.is_published,
                colors: colors.remove(&model.id).unwrap_or_default(),
                sizes: sizes.remove(&model.id).unwrap_or_default(),
                images: images.remove(&model.id).unwrap_or_default(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl DbOrderRepository {
    async fn load_one(&self, id: i64) -> Result<Order, StoreError> {
        self.find_by_id(id).await?.ok_or(StoreError::OrderNotFound)
    }
}

impl OrderRepository for DbOrderRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let Some(model) = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?
        else {
            return Ok(None);
        };
        Ok(load_orders(&self.db, vec![model]).await?.pop())
    }

    async fn find_by_number(&self, order_number: &str) -> Result<Option<Order>, StoreError> {
        let Some(model) = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number))
            .one(&self.db)
            .await
            .context("find order by number")?
        else {
            return Ok(None);
        };
        Ok(load_orders(&self.db, vec![model]).await?.pop())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.db)
            .await
            .context("list user orders")?;
        Ok(load_orders(&self.db, models).await?)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let models = orders::Entity::find()
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
            .all(&self.db)
            .await
            .context("list orders")?;
        Ok(load_orders(&self.db, models).await?)
    }

    async fn tracking(&self, order_id: i64) -> Result<Vec<OrderTracking>, StoreError> {
        let rows = order_tracking::Entity::find()
            .filter(order_tracking::Column::OrderId.eq(order_id))
            .order_by_asc(order_tracking::Column::CreatedAt)
            .order_by_asc(order_tracking::Column::Id)
            .all(&self.db)
            .await
            .context("list order tracking")?;
        Ok(rows
            .into_iter()
            .map(tracking_from_model)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let id = self
            .db
            .transaction::<_, i64, DbErr>(|txn| {
                let order = order.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let row = orders::ActiveModel {
                        order_number: Set(order.order_number.clone()),
                        user_id: Set(order.user_id),
                        total_amount: Set(order.total_amount),
                        status: Set(OrderStatus::Pending.as_str().to_owned()),
                        shipping_address: Set(order.shipping_address.clone()),
                        contact_person_name: Set(order.contact_person_name.clone()),
                        contact_number: Set(order.contact_number.clone()),
                        special_instructions: Set(order.special_instructions.clone()),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    order_items::Entity::insert_many(order.items.iter().map(|item| {
                        order_items::ActiveModel {
                            order_id: Set(row.id),
                            product_id: Set(Some(item.product_id)),
                            product_name: Set(item.product_name.clone()),
                            quantity: Set(item.quantity),
                            unit_price: Set(item.unit_price),
                            item_total: Set(item.item_total),
                            selected_size: Set(item.selected_size.clone()),
                            selected_color: Set(item.selected_color.clone()),
                            ..Default::default()
                        }
                    }))
                    .exec_without_returning(txn)
                    .await?;

                    order_tracking::ActiveModel {
                        order_id: Set(row.id),
                        status: Set(OrderStatus::Pending.as_str().to_owned()),
                        description: Set(order.initial_tracking.clone()),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    Ok(row.id)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Transaction(err)
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
                {
                    StoreError::OrderNumberTaken(order.order_number.clone())
                }
                other => StoreError::Internal(anyhow::Error::new(other).context("create order")),
            })?;
        self.load_one(id).await
    }

    async fn append_status(
        &self,
        id: i64,
        status: OrderStatus,
        description: &str,
    ) -> Result<Order, StoreError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let description = description.to_owned();
                Box::pin(async move {
                    let now = Utc::now();
                    orders::ActiveModel {
                        id: Set(id),
                        status: Set(status.as_str().to_owned()),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    order_tracking::ActiveModel {
                        order_id: Set(id),
                        status: Set(status.as_str().to_owned()),
                        description: Set(description),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("append order status")?;
        self.load_one(id).await
    }

    async fn status_totals(&self, user_id: Option<Uuid>) -> Result<Vec<StatusTotal>, StoreError> {
        #[derive(Debug, FromQueryResult)]
        struct StatusRow {
            status: String,
            count: i64,
            amount: Option<f64>,
        }

        let mut query = orders::Entity::find()
            .select_only()
            .column(orders::Column::Status)
            .column_as(Expr::col(orders::Column::Id).count(), "count")
            .column_as(Expr::col(orders::Column::TotalAmount).sum(), "amount")
            .group_by(orders::Column::Status);
        if let Some(user_id) = user_id {
            query = query.filter(orders::Column::UserId.eq(user_id));
        }
        let rows = query
            .into_model::<StatusRow>()
            .all(&self.db)
            .await
            .context("aggregate orders by status")?;

        let totals = rows
            .into_iter()
            .map(|row| {
                let status = row
                    .status
                    .parse::<OrderStatus>()
                    .with_context(|| format!("invalid order status {}", row.status))?;
                Ok(StatusTotal {
                    status,
                    count: u64::try_from(row.count).unwrap_or_default(),
                    amount: row.amount.unwrap_or_default(),
                })
            })
            .collect::<anyhow::Result<_>>()?;
        Ok(totals)
    }

    async fn ordered_quantities(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CategoryQuantity>, StoreError> {
        #[derive(Debug, FromQueryResult)]
        struct QuantityRow {
            category_id: Option<i64>,
            quantity: i64,
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            SELECT p.category_id AS category_id, SUM(oi.quantity)::BIGINT AS quantity
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            LEFT JOIN products p ON p.id = oi.product_id
            WHERE o.user_id = $1
            GROUP BY p.category_id
            "#,
            [user_id.into()],
        );
        let rows = QuantityRow::find_by_statement(stmt)
            .all(&self.db)
            .await
            .context("aggregate ordered quantities")?;
        Ok(rows
            .into_iter()
            .map(|row| CategoryQuantity {
                category_id: row.category_id,
                quantity: row.quantity,
            })
            .collect())
    }
}

fn tracking_from_model(model: order_tracking::Model) -> anyhow::Result<OrderTracking> {
    let status = model
        .status
        .parse::<OrderStatus>()
        .with_context(|| format!("tracking row {} has invalid status", model.id))?;
    Ok(OrderTracking {
        id: model.id,
        status,
        description: model.description,
        created_at: model.created_at,
    })
}

/// Attach items and tracking history to order rows.
async fn load_orders<C: ConnectionTrait>(
    db: &C,
    models: Vec<orders::Model>,
) -> anyhow::Result<Vec<Order>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = models.iter().map(|m| m.id).collect();

    let mut items: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for row in order_items::Entity::find()
        .filter(order_items::Column::OrderId.is_in(ids.clone()))
        .order_by_asc(order_items::Column::Id)
        .all(db)
        .await
        .context("load order items")?
    {
        items.entry(row.order_id).or_default().push(OrderItem {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            item_total: row.item_total,
            selected_size: row.selected_size,
            selected_color: row.selected_color,
        });
    }

    let mut tracking: HashMap<i64, Vec<OrderTracking>> = HashMap::new();
    for row in order_tracking::Entity::find()
        .filter(order_tracking::Column::OrderId.is_in(ids))
        .order_by_asc(order_tracking::Column::CreatedAt)
        .order_by_asc(order_tracking::Column::Id)
        .all(db)
        .await
        .context("load order tracking")?
    {
        let order_id = row.order_id;
        tracking
            .entry(order_id)
            .or_default()
            .push(tracking_from_model(row)?);
    }

    models
        .into_iter()
        .map(|model| {
            let status = model
                .status
                .parse::<OrderStatus>()
                .with_context(|| format!("order {} has invalid status", model.id))?;
            Ok(Order {
                id: model.id,
                order_number: model.order_number,
                user_id: model.user_id,
                total_amount: model.total_amount,
                status,
                shipping_address: model.shipping_address,
                contact_person_name: model.contact_person_name,
                contact_number: model.contact_number,
                special_instructions: model.special_instructions,
                items: items.remove(&model.id).unwrap_or_default(),
                tracking: tracking.remove(&model.id).unwrap_or_default(),
                created_at: model.created_at,
                updated_at: model.updated_at,
            })
        })
        .collect()
}
