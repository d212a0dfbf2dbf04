use std::collections::BTreeMap;

use akeshya_auth_types::identity::Identity;

use crate::domain::repository::{CategoryRepository, ImageStore, ProductRepository};
use crate::domain::types::{
    Category, NewProductImage, NewProductSize, Product, ProductDraft, ProductFilter, UploadedFile,
};
use crate::error::StoreError;
use crate::usecase::require_admin;

/// Stock wording used when a product is created without a status.
pub const DEFAULT_PRODUCT_STATUS: &str = "Full";

pub const ADDED_IMAGE_ALT_TEXT: &str = "Product image";

pub struct ProductImageInput {
    pub image_path: String,
    pub image_order: Option<i32>,
    pub is_primary: Option<bool>,
    pub alt_text: Option<String>,
}

/// Create/update payload. On update, absent `category_id`, `status` and
/// `is_published` keep the stored values; collections are always replaced.
#[derive(Default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub is_published: Option<bool>,
    pub colors: Vec<String>,
    pub sizes: Vec<NewProductSize>,
    pub images: Vec<ProductImageInput>,
}

fn required_name(name: Option<&str>) -> Result<String, StoreError> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| StoreError::InvalidRequest("Product name is required".into()))
}

fn clean_colors(colors: Vec<String>) -> Vec<String> {
    colors
        .into_iter()
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty())
        .collect()
}

fn request_images(images: Vec<ProductImageInput>) -> Vec<NewProductImage> {
    images
        .into_iter()
        .map(|i| NewProductImage {
            image_path: i.image_path,
            image_order: i.image_order.unwrap_or(0),
            is_primary: i.is_primary.unwrap_or(false),
            alt_text: i.alt_text,
        })
        .collect()
}

/// Store uploads and describe them as images following `existing`. The first
/// upload becomes primary only when there are no other images. Files that fail
/// to store are skipped.
async fn store_uploads<S: ImageStore>(
    storage: &S,
    existing: usize,
    files: &[UploadedFile],
) -> Vec<NewProductImage> {
    let mut stored = Vec::with_capacity(files.len());
    for (idx, file) in files.iter().enumerate() {
        if file.bytes.is_empty() {
            continue;
        }
        match storage.store(file).await {
            Ok(path) => stored.push(NewProductImage {
                image_path: path,
                image_order: (existing + idx) as i32,
                is_primary: existing == 0 && idx == 0,
                alt_text: file.file_name.clone(),
            }),
            Err(e) => tracing::warn!(
                file = file.file_name.as_deref().unwrap_or("-"),
                error = %e,
                "image upload skipped"
            ),
        }
    }
    stored
}

async fn resolve_category<C: CategoryRepository>(
    categories: &C,
    id: i64,
) -> Result<Category, StoreError> {
    categories
        .find_by_id(id)
        .await?
        .ok_or_else(|| StoreError::InvalidRequest(format!("Category not found with id: {id}")))
}

// ── Reads ────────────────────────────────────────────────────────────────────

pub struct ListProductsUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListProductsUseCase<P> {
    pub async fn execute(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = self.products.list(filter.clone()).await?;
        tracing::debug!(?filter, count = products.len(), "products listed");
        Ok(products)
    }
}

pub struct GetProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> GetProductUseCase<P> {
    pub async fn execute(&self, id: i64) -> Result<Product, StoreError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))
    }
}

pub struct ListProductCategoryNamesUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ListProductCategoryNamesUseCase<P> {
    pub async fn execute(&self) -> Result<Vec<String>, StoreError> {
        self.products.category_names().await
    }
}

pub struct CategoryWithProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

pub struct CategoryProductsUseCase<P: ProductRepository, C: CategoryRepository> {
    pub products: P,
    pub categories: C,
}

impl<P: ProductRepository, C: CategoryRepository> CategoryProductsUseCase<P, C> {
    /// A category together with its published products.
    pub async fn execute(&self, category_id: i64) -> Result<CategoryWithProducts, StoreError> {
        if category_id <= 0 {
            return Err(StoreError::field(
                "categoryId",
                "Invalid category ID. Category ID must be a positive number.",
                Some(category_id.into()),
            ));
        }
        let category = self
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or(StoreError::CategoryNotFound)?;
        let products = self
            .products
            .list(ProductFilter::PublishedInCategory(category_id))
            .await?;
        Ok(CategoryWithProducts { category, products })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductStats {
    pub published_count: u64,
    pub unpublished_count: u64,
    pub total_count: u64,
    pub status_wise_count: BTreeMap<String, u64>,
}

pub fn product_stats(products: &[Product]) -> ProductStats {
    let mut stats = ProductStats::default();
    for product in products {
        stats.total_count += 1;
        if product.is_published {
            stats.published_count += 1;
        } else {
            stats.unpublished_count += 1;
        }
        *stats
            .status_wise_count
            .entry(product.status.clone())
            .or_default() += 1;
    }
    stats
}

pub struct ProductStatsUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> ProductStatsUseCase<P> {
    pub async fn execute(&self, identity: &Identity) -> Result<ProductStats, StoreError> {
        require_admin(identity)?;
        let products = self.products.list(ProductFilter::All).await?;
        Ok(product_stats(&products))
    }
}

// ── Writes (admin) ───────────────────────────────────────────────────────────

pub struct CreateProductUseCase<P, C, S>
where
    P: ProductRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    pub products: P,
    pub categories: C,
    pub storage: S,
}

impl<P, C, S> CreateProductUseCase<P, C, S>
where
    P: ProductRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    pub async fn execute(
        &self,
        identity: &Identity,
        input: ProductInput,
        files: Vec<UploadedFile>,
    ) -> Result<Product, StoreError> {
        require_admin(identity)?;
        let name = required_name(input.name.as_deref())?;
        let category_id = input
            .category_id
            .ok_or_else(|| StoreError::InvalidRequest("Category ID is required".into()))?;
        resolve_category(&self.categories, category_id).await?;

        let mut images = request_images(input.images);
        let uploaded = store_uploads(&self.storage, images.len(), &files).await;
        images.extend(uploaded);

        let draft = ProductDraft {
            name,
            category_id,
            status: input
                .status
                .unwrap_or_else(|| DEFAULT_PRODUCT_STATUS.to_owned()),
            is_published: input.is_published.unwrap_or(false),
            colors: clean_colors(input.colors),
            sizes: input.sizes,
            images,
        };
        let product = self.products.create(&draft).await?;
        tracing::info!(
            product_id = product.id,
            images = product.images.len(),
            "product created"
        );
        Ok(product)
    }
}

pub struct UpdateProductUseCase<P, C, S>
where
    P: ProductRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    pub products: P,
    pub categories: C,
    pub storage: S,
}

impl<P, C, S> UpdateProductUseCase<P, C, S>
where
    P: ProductRepository,
    C: CategoryRepository,
    S: ImageStore,
{
    pub async fn execute(
        &self,
        identity: &Identity,
        id: i64,
        input: ProductInput,
        files: Vec<UploadedFile>,
    ) -> Result<Product, StoreError> {
        require_admin(identity)?;
        let name = required_name(input.name.as_deref())?;
        let current = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        let category_id = match input.category_id {
            Some(category_id) => resolve_category(&self.categories, category_id).await?.id,
            None => current.category.id,
        };

        let mut images = request_images(input.images);
        let uploaded = store_uploads(&self.storage, images.len(), &files).await;
        images.extend(uploaded);

        let draft = ProductDraft {
            name,
            category_id,
            status: input.status.unwrap_or(current.status),
            is_published: input.is_published.unwrap_or(current.is_published),
            colors: clean_colors(input.colors),
            sizes: input.sizes,
            images,
        };
        let product = self.products.update(id, &draft).await?;
        tracing::info!(product_id = id, "product updated");
        Ok(product)
    }
}

pub struct DeleteProductUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> DeleteProductUseCase<P> {
    pub async fn execute(&self, identity: &Identity, id: i64) -> Result<(), StoreError> {
        require_admin(identity)?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        self.products.delete(id).await?;
        tracing::info!(product_id = id, "product deleted");
        Ok(())
    }
}

pub struct SetProductPublishedUseCase<P: ProductRepository> {
    pub products: P,
}

impl<P: ProductRepository> SetProductPublishedUseCase<P> {
    pub async fn execute(
        &self,
        identity: &Identity,
        id: i64,
        published: bool,
    ) -> Result<Product, StoreError> {
        require_admin(identity)?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        let product = self.products.set_published(id, published).await?;
        tracing::info!(product_id = id, published, "product publish flag changed");
        Ok(product)
    }
}

pub struct AddProductImagesUseCase<P: ProductRepository, S: ImageStore> {
    pub products: P,
    pub storage: S,
}

impl<P: ProductRepository, S: ImageStore> AddProductImagesUseCase<P, S> {
    /// Appended images are never primary.
    pub async fn execute(
        &self,
        identity: &Identity,
        id: i64,
        files: Vec<UploadedFile>,
    ) -> Result<Product, StoreError> {
        require_admin(identity)?;
        let product = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ProductNotFound(id))?;
        if files.is_empty() {
            return Err(StoreError::InvalidRequest("No images provided".into()));
        }

        let mut added = Vec::with_capacity(files.len());
        for file in files.iter().filter(|f| !f.bytes.is_empty()) {
            match self.storage.store(file).await {
                Ok(path) => {
                    let order = product.images.len() + added.len();
                    added.push(NewProductImage {
                        image_path: path,
                        image_order: order as i32,
                        is_primary: false,
                        alt_text: Some(ADDED_IMAGE_ALT_TEXT.to_owned()),
                    });
                }
                Err(e) => tracing::warn!(product_id = id, error = %e, "image upload skipped"),
            }
        }
        if added.is_empty() {
            return Ok(product);
        }
        let product = self.products.add_images(id, &added).await?;
        tracing::info!(product_id = id, added = added.len(), "product images added");
        Ok(product)
    }
}

pub struct RemoveProductImageUseCase<P: ProductRepository, S: ImageStore> {
    pub products: P,
    pub storage: S,
}

impl<P: ProductRepository, S: ImageStore> RemoveProductImageUseCase<P, S> {
    pub async fn execute(
        &self,
        identity: &Identity,
        product_id: i64,
        image_id: i64,
    ) -> Result<Product, StoreError> {
        require_admin(identity)?;
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))?;
        let path = self
            .products
            .remove_image(product_id, image_id)
            .await?
            .ok_or(StoreError::ImageNotFound)?;

        if let Err(e) = self.storage.remove(&path).await {
            tracing::warn!(%path, error = %e, "stored image file not deleted");
        }
        tracing::info!(product_id, image_id, "product image removed");
        self.products
            .find_by_id(product_id)
            .await?
            .ok_or(StoreError::ProductNotFound(product_id))
    }
}
