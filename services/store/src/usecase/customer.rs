use chrono::Utc;
use uuid::Uuid;

use akeshya_auth_types::identity::Identity;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::StoreError;

async fn load_self<U: UserRepository>(users: &U, identity: &Identity) -> Result<User, StoreError> {
    users
        .find_by_id(identity.user_id)
        .await?
        .ok_or(StoreError::CustomerNotFound)
}

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, identity: &Identity) -> Result<User, StoreError> {
        load_self(&self.users, identity).await
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

/// Profile changes. `None` leaves a field as it is; blank strings are ignored
/// for the required fields.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub company_name: Option<String>,
    pub branch_name: Option<String>,
    pub email: Option<String>,
    pub gst_number: Option<String>,
    pub shipping_address: Option<String>,
    pub contact_person_name: Option<String>,
    pub additional_phone_numbers: Option<Vec<String>>,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(
        &self,
        identity: &Identity,
        input: UpdateProfileInput,
    ) -> Result<User, StoreError> {
        let mut user = load_self(&self.users, identity).await?;

        if let Some(email) = filled(input.email) {
            if user.email.as_deref() != Some(email.as_str()) {
                let owner = self.users.find_by_email(&email).await?;
                if owner.is_some_and(|o| o.id != user.id) {
                    return Err(StoreError::EmailTakenByOther);
                }
            }
            user.email = Some(email);
        }
        if let Some(company_name) = filled(input.company_name) {
            user.company_name = company_name;
        }
        if let Some(branch_name) = filled(input.branch_name) {
            user.branch_name = branch_name;
        }
        if let Some(shipping_address) = filled(input.shipping_address) {
            user.shipping_address = shipping_address;
        }
        if let Some(gst_number) = input.gst_number {
            user.gst_number = Some(gst_number.trim().to_ascii_uppercase()).filter(|g| !g.is_empty());
        }
        if let Some(contact_person_name) = input.contact_person_name {
            user.contact_person_name = Some(contact_person_name).filter(|n| !n.trim().is_empty());
        }
        if let Some(numbers) = input.additional_phone_numbers {
            user.additional_phone_numbers = numbers;
        }
        user.updated_at = Utc::now();

        self.users.update_profile(&user).await?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}

// ── DeleteProfile ────────────────────────────────────────────────────────────

pub struct DeleteProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteProfileUseCase<U> {
    pub async fn execute(&self, identity: &Identity) -> Result<(), StoreError> {
        let user = load_self(&self.users, identity).await?;
        if self.users.has_orders(user.id).await? {
            return Err(StoreError::CustomerHasOrders);
        }
        self.users.delete(user.id).await?;
        tracing::info!(user_id = %user.id, "account deleted by owner");
        Ok(())
    }
}

// ── ListNonAdminUsers ────────────────────────────────────────────────────────

pub struct ListNonAdminUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListNonAdminUsersUseCase<U> {
    pub async fn execute(&self, _identity: &Identity) -> Result<Vec<User>, StoreError> {
        let users = self.users.list().await?;
        Ok(users.into_iter().filter(|u| !u.is_admin()).collect())
    }
}

// ── GetCustomerById ──────────────────────────────────────────────────────────

pub struct GetCustomerByIdUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetCustomerByIdUseCase<U> {
    /// Admin accounts are never returned here.
    pub async fn execute(&self, _identity: &Identity, id: Uuid) -> Result<User, StoreError> {
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CustomerNotFound)?;
        if user.is_admin() {
            return Err(StoreError::AdminProfileHidden);
        }
        Ok(user)
    }
}
