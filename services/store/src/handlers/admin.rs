use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::user::UserStatus;

use crate::error::StoreError;
use crate::handlers::MessageResponse;
use crate::handlers::customer::UserResponse;
use crate::state::AppState;
use crate::usecase::account::{
    DeleteCustomerUseCase, GetCustomerUseCase, ListCustomersUseCase, StatusChange,
    UpdateCustomerStatusUseCase,
};

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<UserResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AdminCustomerResponse {
    pub customer: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub message: &'static str,
    pub customer_id: Uuid,
    pub previous_status: UserStatus,
    pub new_status: UserStatus,
    pub enabled: bool,
}

impl From<StatusChange> for StatusChangeResponse {
    fn from(change: StatusChange) -> Self {
        Self {
            message: "Customer status updated successfully",
            customer_id: change.customer_id,
            previous_status: change.previous_status,
            new_status: change.new_status,
            enabled: change.enabled,
        }
    }
}

// ── GET /api/admin/customers ─────────────────────────────────────────────────

pub async fn list_customers(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<CustomerListResponse>, StoreError> {
    let uc = ListCustomersUseCase {
        users: state.user_repo(),
    };
    let customers: Vec<UserResponse> = uc
        .execute(&identity)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(CustomerListResponse {
        total: customers.len(),
        customers,
    }))
}

// ── GET /api/admin/customers/{id} ────────────────────────────────────────────

pub async fn get_customer(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminCustomerResponse>, StoreError> {
    let uc = GetCustomerUseCase {
        users: state.user_repo(),
    };
    let customer = uc.execute(&identity, id).await?;
    Ok(Json(AdminCustomerResponse {
        customer: customer.into(),
    }))
}

// ── DELETE /api/admin/customers/{id} ─────────────────────────────────────────

pub async fn delete_customer(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, StoreError> {
    let uc = DeleteCustomerUseCase {
        users: state.user_repo(),
    };
    uc.execute(&identity, id).await?;
    Ok(MessageResponse::new("Customer deleted successfully"))
}

// ── PUT /api/admin/customers/{id}/status/{status} ────────────────────────────

pub async fn update_customer_status(
    identity: Identity,
    State(state): State<AppState>,
    Path((id, status)): Path<(Uuid, String)>,
) -> Result<Json<StatusChangeResponse>, StoreError> {
    let status: UserStatus = status
        .parse()
        .map_err(|e: akeshya_domain::user::UnknownUserStatus| {
            StoreError::InvalidRequest(e.to_string())
        })?;
    let uc = UpdateCustomerStatusUseCase {
        users: state.user_repo(),
    };
    let change = uc.execute(&identity, id, status).await?;
    Ok(Json(change.into()))
}
