use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use akeshya_auth_types::identity::Identity;
use akeshya_domain::user::{Role, UserStatus};

use crate::domain::types::User;
use crate::error::StoreError;
use crate::handlers::{MessageResponse, ValidJson};
use crate::state::AppState;
use crate::usecase::customer::{
    DeleteProfileUseCase, GetCustomerByIdUseCase, GetProfileUseCase, ListNonAdminUsersUseCase,
    UpdateProfileInput, UpdateProfileUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Contact and address details of an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub contact_number: String,
    pub company_name: String,
    pub branch_name: String,
    pub gst_number: Option<String>,
    pub shipping_address: String,
    pub contact_person_name: Option<String>,
    pub email: Option<String>,
    pub additional_phone_numbers: Vec<String>,
}

impl From<User> for CustomerResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            contact_number: user.contact_number,
            company_name: user.company_name,
            branch_name: user.branch_name,
            gst_number: user.gst_number,
            shipping_address: user.shipping_address,
            contact_person_name: user.contact_person_name,
            email: user.email,
            additional_phone_numbers: user.additional_phone_numbers,
        }
    }
}

/// Full account view including roles and approval state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub contact_number: String,
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
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub created_date: DateTime<Utc>,
    #[serde(serialize_with = "akeshya_core::serde::to_rfc3339_ms")]
    pub updated_date: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            contact_number: user.contact_number,
            company_name: user.company_name,
            branch_name: user.branch_name,
            gst_number: user.gst_number,
            shipping_address: user.shipping_address,
            contact_person_name: user.contact_person_name,
            email: user.email,
            additional_phone_numbers: user.additional_phone_numbers,
            roles: user.roles,
            status: user.status,
            enabled: user.enabled,
            created_date: user.created_at,
            updated_date: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerEnvelope {
    pub message: &'static str,
    pub customer: CustomerResponse,
}

// ── Request types ────────────────────────────────────────────────────────────

fn phone_entry_lengths(numbers: &[String]) -> Result<(), ValidationError> {
    if numbers.iter().all(|n| n.chars().count() <= 15) {
        Ok(())
    } else {
        Err(ValidationError::new("length")
            .with_message("Phone number must be less than 15 characters".into()))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 100, message = "Company name must be less than 100 characters"))]
    pub company_name: Option<String>,
    #[validate(length(max = 100, message = "Branch name must be less than 100 characters"))]
    pub branch_name: Option<String>,
    #[validate(
        email(message = "Email should be valid"),
        length(max = 100, message = "Email must be less than 100 characters")
    )]
    pub email: Option<String>,
    #[validate(length(max = 15, message = "GST number must be less than 15 characters"))]
    pub gst_number: Option<String>,
    #[validate(length(max = 500, message = "Shipping address must be less than 500 characters"))]
    pub shipping_address: Option<String>,
    #[validate(length(
        max = 100,
        message = "Contact person name must be less than 100 characters"
    ))]
    pub contact_person_name: Option<String>,
    #[validate(custom(function = "phone_entry_lengths"))]
    pub additional_phone_numbers: Option<Vec<String>>,
}

// ── GET /api/customer/profile ────────────────────────────────────────────────

pub async fn get_profile(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<CustomerResponse>, StoreError> {
    let uc = GetProfileUseCase {
        users: state.user_repo(),
    };
    Ok(Json(uc.execute(&identity).await?.into()))
}

// ── PUT /api/customer/profile ────────────────────────────────────────────────

pub async fn update_profile(
    identity: Identity,
    State(state): State<AppState>,
    ValidJson(body): ValidJson<UpdateCustomerRequest>,
) -> Result<Json<CustomerEnvelope>, StoreError> {
    let uc = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let user = uc
        .execute(
            &identity,
            UpdateProfileInput {
                company_name: body.company_name,
                branch_name: body.branch_name,
                email: body.email,
                gst_number: body.gst_number,
                shipping_address: body.shipping_address,
                contact_person_name: body.contact_person_name,
                additional_phone_numbers: body.additional_phone_numbers,
            },
        )
        .await?;
    Ok(Json(CustomerEnvelope {
        message: "Customer details updated successfully",
        customer: user.into(),
    }))
}

// ── DELETE /api/customer/profile ─────────────────────────────────────────────

pub async fn delete_profile(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, StoreError> {
    let uc = DeleteProfileUseCase {
        users: state.user_repo(),
    };
    uc.execute(&identity).await?;
    Ok(MessageResponse::new("Customer account deleted successfully"))
}

// ── GET /api/customer/all-users ──────────────────────────────────────────────

pub async fn list_non_admin_users(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, StoreError> {
    let uc = ListNonAdminUsersUseCase {
        users: state.user_repo(),
    };
    let users = uc.execute(&identity).await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

// ── GET /api/customer/{id} ───────────────────────────────────────────────────

pub async fn get_customer(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerEnvelope>, StoreError> {
    let uc = GetCustomerByIdUseCase {
        users: state.user_repo(),
    };
    let user = uc.execute(&identity, id).await?;
    Ok(Json(CustomerEnvelope {
        message: "Customer details retrieved successfully",
        customer: user.into(),
    }))
}
