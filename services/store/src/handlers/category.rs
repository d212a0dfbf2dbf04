use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use akeshya_auth_types::identity::Identity;

use crate::domain::types::{Category, CategoryDraft};
use crate::error::StoreError;
use crate::handlers::{MessageResponse, ValidJson, not_blank};
use crate::state::AppState;
use crate::usecase::category::{
    CreateCategoryUseCase, DeleteCategoryUseCase, GetCategoryUseCase, ListCategoriesUseCase,
    SetCategoryStatusUseCase, UpdateCategoryUseCase,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(
        custom(function = "not_blank", message = "Category name is required"),
        length(max = 100, message = "Category name must be less than 100 characters")
    )]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: bool,
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(req: CategoryRequest) -> Self {
        Self {
            name: req.name.trim().to_owned(),
            description: req.description,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: bool,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            status: c.status,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

// ── GET /api/categories ──────────────────────────────────────────────────────

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, StoreError> {
    let uc = ListCategoriesUseCase {
        categories: state.category_repo(),
    };
    let categories = uc.execute().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

// ── GET /api/categories/{id} ─────────────────────────────────────────────────

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CategoryResponse>, StoreError> {
    let uc = GetCategoryUseCase {
        categories: state.category_repo(),
    };
    Ok(Json(uc.execute(id).await?.into()))
}

// ── POST /api/categories ─────────────────────────────────────────────────────

pub async fn create_category(
    identity: Identity,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, StoreError> {
    let uc = CreateCategoryUseCase {
        categories: state.category_repo(),
    };
    Ok(Json(uc.execute(&identity, body.into()).await?.into()))
}

// ── PUT /api/categories/{id} ─────────────────────────────────────────────────

pub async fn update_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(body): ValidJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, StoreError> {
    let uc = UpdateCategoryUseCase {
        categories: state.category_repo(),
    };
    Ok(Json(uc.execute(&identity, id, body.into()).await?.into()))
}

// ── PATCH /api/categories/{id}/status ────────────────────────────────────────

pub async fn set_category_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<CategoryResponse>, StoreError> {
    let uc = SetCategoryStatusUseCase {
        categories: state.category_repo(),
    };
    Ok(Json(uc.execute(&identity, id, query.status).await?.into()))
}

// ── DELETE /api/categories/{id} ──────────────────────────────────────────────

pub async fn delete_category(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, StoreError> {
    let uc = DeleteCategoryUseCase {
        categories: state.category_repo(),
    };
    uc.execute(&identity, id).await?;
    Ok(MessageResponse::new("Category deleted successfully"))
}
