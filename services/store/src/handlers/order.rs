use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::order::OrderStatus;

use crate::domain::types::{Order, OrderItem, OrderTracking};
use crate::error::StoreError;
use crate::handlers::ValidJson;
use crate::state::AppState;
use crate::usecase::order::{
    CancelOrderUseCase, CreateOrderInput, CreateOrderUseCase, GetOrderTrackingUseCase,
    GetOrderUseCase, ListAllOrdersUseCase, ListUserOrdersUseCase, OrderLineInput, OrderLookup,
    UpdateOrderStatusInput, UpdateOrderStatusUseCase,
};
use crate::usecase::statistics::{
    GetOrderStatisticsUseCase, GetUserOrderStatisticsUseCase, OrderStatistics,
    UserOrderStatistics,
};

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "Unit price cannot be negative"))]
    pub unit_price: f64,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Order must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    #[serde(alias = "specialInstructions")]
    pub instruction: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderStatusUpdateRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub item_total: f64,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            item_total: item.item_total,
            selected_size: item.selected_size,
            selected_color: item.selected_color,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTrackingResponse {
    pub id: i64,
    pub status: OrderStatus,
    pub description: String,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl From<OrderTracking> for OrderTrackingResponse {
    fn from(row: OrderTracking) -> Self {
        Self {
            id: row.id,
            status: row.status,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub user_id: Uuid,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub contact_number: String,
    pub special_instructions: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub tracking: Vec<OrderTrackingResponse>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number,
            user_id: order.user_id,
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            contact_person_name: order.contact_person_name,
            contact_number: order.contact_number,
            special_instructions: order.special_instructions,
            items: order.items.into_iter().map(Into::into).collect(),
            tracking: order.tracking.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatisticsResponse {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub confirmed_orders: u64,
    pub processing_orders: u64,
    pub shipped_orders: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub refunded_orders: u64,
    pub total_revenue: f64,
    pub pending_revenue: f64,
    pub completed_revenue: f64,
}

impl From<OrderStatistics> for OrderStatisticsResponse {
    fn from(s: OrderStatistics) -> Self {
        Self {
            total_orders: s.total_orders,
            pending_orders: s.pending_orders,
            confirmed_orders: s.confirmed_orders,
            processing_orders: s.processing_orders,
            shipped_orders: s.shipped_orders,
            delivered_orders: s.delivered_orders,
            cancelled_orders: s.cancelled_orders,
            refunded_orders: s.refunded_orders,
            total_revenue: s.total_revenue,
            pending_revenue: s.pending_revenue,
            completed_revenue: s.completed_revenue,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrderStatisticsResponse {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub confirmed_orders: u64,
    pub processing_orders: u64,
    pub shipped_orders: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub total_spent: f64,
    pub total_products_ordered: i64,
    pub favorite_category: Option<i64>,
}

impl From<UserOrderStatistics> for UserOrderStatisticsResponse {
    fn from(s: UserOrderStatistics) -> Self {
        Self {
            total_orders: s.total_orders,
            pending_orders: s.pending_orders,
            confirmed_orders: s.confirmed_orders,
            processing_orders: s.processing_orders,
            shipped_orders: s.shipped_orders,
            delivered_orders: s.delivered_orders,
            cancelled_orders: s.cancelled_orders,
            total_spent: s.total_spent,
            total_products_ordered: s.total_products_ordered,
            favorite_category: s.favorite_category,
        }
    }
}

fn list(orders: Vec<Order>) -> Json<Vec<OrderResponse>> {
    Json(orders.into_iter().map(OrderResponse::from).collect())
}

// ── POST /api/orders ─────────────────────────────────────────────────────────

pub async fn create_order(
    identity: Identity,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), StoreError> {
    let uc = CreateOrderUseCase {
        orders: state.order_repo(),
        users: state.user_repo(),
        products: state.product_repo(),
    };
    let input = CreateOrderInput {
        user_id: body.user_id,
        items: body
            .items
            .into_iter()
            .map(|i| OrderLineInput {
                product_id: i.product_id,
                quantity: i.quantity,
                unit_price: i.unit_price,
                selected_size: i.selected_size,
                selected_color: i.selected_color,
            })
            .collect(),
        special_instructions: body.instruction,
    };
    let order = uc.execute(&identity, input).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

// ── GET /api/orders ──────────────────────────────────────────────────────────

pub async fn list_orders(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, StoreError> {
    let uc = ListAllOrdersUseCase {
        orders: state.order_repo(),
    };
    Ok(list(uc.execute(&identity).await?))
}

// ── GET /api/orders/{id} ─────────────────────────────────────────────────────

pub async fn get_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, StoreError> {
    let uc = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = uc.execute(&identity, OrderLookup::Id(id)).await?;
    Ok(Json(order.into()))
}

// ── GET /api/orders/number/{orderNumber} ─────────────────────────────────────

pub async fn get_order_by_number(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<OrderResponse>, StoreError> {
    let uc = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = uc
        .execute(&identity, OrderLookup::Number(order_number))
        .await?;
    Ok(Json(order.into()))
}

// ── GET /api/orders/user/{userId} ────────────────────────────────────────────

pub async fn list_user_orders(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<OrderResponse>>, StoreError> {
    let uc = ListUserOrdersUseCase {
        orders: state.order_repo(),
    };
    Ok(list(uc.execute(&identity, user_id).await?))
}

// ── PATCH /api/orders/{id}/status ────────────────────────────────────────────

pub async fn update_order_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(body): ValidJson<OrderStatusUpdateRequest>,
) -> Result<Json<OrderResponse>, StoreError> {
    let uc = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
    };
    let order = uc
        .execute(
            &identity,
            id,
            UpdateOrderStatusInput {
                status: body.status,
                note: body.notes,
            },
        )
        .await?;
    Ok(Json(order.into()))
}

// ── PATCH /api/orders/{id}/cancel?reason= ────────────────────────────────────

pub async fn cancel_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<OrderResponse>, StoreError> {
    let uc = CancelOrderUseCase {
        orders: state.order_repo(),
    };
    let order = uc.execute(&identity, id, query.reason).await?;
    Ok(Json(order.into()))
}

// ── GET /api/orders/{id}/tracking ────────────────────────────────────────────

pub async fn get_order_tracking(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderTrackingResponse>>, StoreError> {
    let uc = GetOrderTrackingUseCase {
        orders: state.order_repo(),
    };
    let rows = uc.execute(&identity, id).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// ── GET /api/orders/statistics ───────────────────────────────────────────────

pub async fn get_order_statistics(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<OrderStatisticsResponse>, StoreError> {
    let uc = GetOrderStatisticsUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(uc.execute(&identity).await?.into()))
}

// ── GET /api/orders/user/{userId}/statistics ─────────────────────────────────

pub async fn get_user_order_statistics(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserOrderStatisticsResponse>, StoreError> {
    let uc = GetUserOrderStatisticsUseCase {
        orders: state.order_repo(),
    };
    Ok(Json(uc.execute(&identity, user_id).await?.into()))
}
