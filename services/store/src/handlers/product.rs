use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use akeshya_auth_types::identity::Identity;

use crate::domain::types::{NewProductSize, Product, ProductFilter, ProductImage, ProductSize};
use crate::error::StoreError;
use crate::handlers::category::CategoryResponse;
use crate::handlers::{MessageResponse, MultipartForm, read_multipart};
use crate::state::AppState;
use crate::usecase::product::{
    AddProductImagesUseCase, CategoryProductsUseCase, CategoryWithProducts, CreateProductUseCase,
    DeleteProductUseCase, GetProductUseCase, ListProductCategoryNamesUseCase, ListProductsUseCase,
    ProductImageInput, ProductInput, ProductStats, ProductStatsUseCase, RemoveProductImageUseCase,
    SetProductPublishedUseCase, UpdateProductUseCase,
};

const PRODUCT_PART: &str = "productRequest";
const IMAGE_PART: &str = "imageFiles";

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSizeRequest {
    pub size_value: Option<f64>,
    pub weight: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageRequest {
    pub image_path: String,
    pub image_order: Option<i32>,
    pub is_primary: Option<bool>,
    pub alt_text: Option<String>,
}

/// JSON carried in the `productRequest` multipart part.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub is_published: Option<bool>,
    pub colors: Vec<String>,
    pub sizes: Vec<ProductSizeRequest>,
    pub images: Vec<ProductImageRequest>,
}

impl From<ProductRequest> for ProductInput {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            category_id: req.category_id,
            status: req.status,
            is_published: req.is_published,
            colors: req.colors,
            sizes: req
                .sizes
                .into_iter()
                .map(|s| NewProductSize {
                    size_value: s.size_value,
                    weight: s.weight,
                })
                .collect(),
            images: req
                .images
                .into_iter()
                .map(|i| ProductImageInput {
                    image_path: i.image_path,
                    image_order: i.image_order,
                    is_primary: i.is_primary,
                    alt_text: i.alt_text,
                })
                .collect(),
        }
    }
}

/// Product payload and uploads from a `productRequest` + `imageFiles` form.
fn product_form(form: MultipartForm) -> Result<(ProductInput, MultipartForm), StoreError> {
    let json = form
        .json
        .as_deref()
        .ok_or_else(|| StoreError::InvalidRequest(format!("Part '{PRODUCT_PART}' is required")))?;
    let request: ProductRequest = serde_json::from_str(json)
        .map_err(|e| StoreError::InvalidRequest(format!("Invalid product data: {e}")))?;
    Ok((request.into(), form))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSizeResponse {
    pub id: i64,
    pub size_value: Option<f64>,
    pub weight: Option<String>,
}

impl From<ProductSize> for ProductSizeResponse {
    fn from(s: ProductSize) -> Self {
        Self {
            id: s.id,
            size_value: s.size_value,
            weight: s.weight,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageResponse {
    pub id: i64,
    pub image_path: String,
    pub image_order: i32,
    pub is_primary: bool,
    pub alt_text: Option<String>,
}

impl From<ProductImage> for ProductImageResponse {
    fn from(i: ProductImage) -> Self {
        Self {
            id: i.id,
            image_path: i.image_path,
            image_order: i.image_order,
            is_primary: i.is_primary,
            alt_text: i.alt_text,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub category: CategoryResponse,
    pub status: String,
    pub is_published: bool,
    pub colors: Vec<String>,
    pub sizes: Vec<ProductSizeResponse>,
    pub images: Vec<ProductImageResponse>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub created_date: DateTime<Utc>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub updated_date: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            category: p.category.into(),
            status: p.status,
            is_published: p.is_published,
            colors: p.colors,
            sizes: p.sizes.into_iter().map(Into::into).collect(),
            images: p.images.into_iter().map(Into::into).collect(),
            created_date: p.created_at,
            updated_date: p.updated_at,
        }
    }
}

fn product_list(products: Vec<Product>) -> Json<Vec<ProductResponse>> {
    Json(products.into_iter().map(Into::into).collect())
}

#[derive(Debug, Serialize)]
pub struct CategoryWithProductsResponse {
    pub category: CategoryResponse,
    pub products: Vec<ProductResponse>,
}

impl From<CategoryWithProducts> for CategoryWithProductsResponse {
    fn from(c: CategoryWithProducts) -> Self {
        Self {
            category: c.category.into(),
            products: c.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatsResponse {
    pub published_count: u64,
    pub unpublished_count: u64,
    pub total_count: u64,
    pub status_wise_count: BTreeMap<String, u64>,
}

impl From<ProductStats> for ProductStatsResponse {
    fn from(s: ProductStats) -> Self {
        Self {
            published_count: s.published_count,
            unpublished_count: s.unpublished_count,
            total_count: s.total_count,
            status_wise_count: s.status_wise_count,
        }
    }
}

// ── Public reads ─────────────────────────────────────────────────────────────

async fn list_with(
    state: &AppState,
    filter: ProductFilter,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    let uc = ListProductsUseCase {
        products: state.product_repo(),
    };
    Ok(product_list(uc.execute(filter).await?))
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    list_with(&state, ProductFilter::All).await
}

/// GET /api/products/published
pub async fn list_published_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    list_with(&state, ProductFilter::Published).await
}

/// GET /api/products/search?name=
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    let name = query.name.trim();
    if name.is_empty() {
        return Err(StoreError::field(
            "name",
            "Search term is required",
            Some(query.name.clone().into()),
        ));
    }
    list_with(&state, ProductFilter::NameContains(name.to_owned())).await
}

/// GET /api/products/category/{name}
pub async fn list_products_by_category_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ProductResponse>>, StoreError> {
    list_with(&state, ProductFilter::CategoryName(name)).await
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>, StoreError> {
    let uc = GetProductUseCase {
        products: state.product_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

/// GET /api/products/category/{categoryId}/products
pub async fn get_category_products(
    State(state): State<AppState>,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryWithProductsResponse>, StoreError> {
    let uc = CategoryProductsUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
    };
    Ok(Json(uc.execute(category_id).await?.into()))
}

/// GET /api/products/categories
pub async fn list_product_category_names(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, StoreError> {
    let uc = ListProductCategoryNamesUseCase {
        products: state.product_repo(),
    };
    Ok(Json(uc.execute().await?))
}

// ── Admin ────────────────────────────────────────────────────────────────────

/// GET /api/products/stats
pub async fn get_product_stats(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProductStatsResponse>, StoreError> {
    let uc = ProductStatsUseCase {
        products: state.product_repo(),
    };
    Ok(Json(uc.execute(&identity).await?.into()))
}

/// POST /api/products
pub async fn create_product(
    identity: Identity,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, StoreError> {
    let (input, form) = product_form(read_multipart(multipart, PRODUCT_PART, IMAGE_PART).await?)?;
    let uc = CreateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        storage: state.storage.clone(),
    };
    Ok(Json(uc.execute(&identity, input, form.files).await?.into()))
}

/// PUT /api/products/{id}
pub async fn update_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, StoreError> {
    let (input, form) = product_form(read_multipart(multipart, PRODUCT_PART, IMAGE_PART).await?)?;
    let uc = UpdateProductUseCase {
        products: state.product_repo(),
        categories: state.category_repo(),
        storage: state.storage.clone(),
    };
    Ok(Json(uc.execute(&identity, id, input, form.files).await?.into()))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, StoreError> {
    let uc = DeleteProductUseCase {
        products: state.product_repo(),
    };
    uc.execute(&identity, id).await?;
    Ok(MessageResponse::new("Product deleted successfully"))
}

/// PATCH /api/products/{id}/publish/{isPublished}
pub async fn set_product_published(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, published)): Path<(i64, bool)>,
) -> Result<Json<ProductResponse>, StoreError> {
    let uc = SetProductPublishedUseCase {
        products: state.product_repo(),
    };
    Ok(Json(uc.execute(&identity, id, published).await?.into()))
}

/// POST /api/products/{id}/images
pub async fn add_product_images(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<ProductResponse>, StoreError> {
    let form = read_multipart(multipart, PRODUCT_PART, IMAGE_PART).await?;
    let uc = AddProductImagesUseCase {
        products: state.product_repo(),
        storage: state.storage.clone(),
    };
    Ok(Json(uc.execute(&identity, id, form.files).await?.into()))
}

/// DELETE /api/products/{productId}/images/{imageId}
pub async fn remove_product_image(
    identity: Identity,
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(i64, i64)>,
) -> Result<Json<ProductResponse>, StoreError> {
    let uc = RemoveProductImageUseCase {
        products: state.product_repo(),
        storage: state.storage.clone(),
    };
    Ok(Json(uc.execute(&identity, product_id, image_id).await?.into()))
}
