use uuid::Uuid;

use akeshya_auth_types::identity::Identity;
use akeshya_domain::user::UserStatus;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::StoreError;
use crate::usecase::require_admin;

// ── ListCustomers ────────────────────────────────────────────────────────────

pub struct ListCustomersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListCustomersUseCase<U> {
    pub async fn execute(&self, identity: &Identity) -> Result<Vec<User>, StoreError> {
        require_admin(identity)?;
        self.users.list().await
    }
}

// ── GetCustomer ──────────────────────────────────────────────────────────────

pub struct GetCustomerUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetCustomerUseCase<U> {
    pub async fn execute(&self, identity: &Identity, id: Uuid) -> Result<User, StoreError> {
        require_admin(identity)?;
        self.users
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CustomerNotFound)
    }
}

// ── DeleteCustomer ───────────────────────────────────────────────────────────

pub struct DeleteCustomerUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteCustomerUseCase<U> {
    /// Customers with orders are kept; their orders reference them.
    pub async fn execute(&self, identity: &Identity, id: Uuid) -> Result<(), StoreError> {
        require_admin(identity)?;
        if identity.user_id == id {
            return Err(StoreError::SelfDeletionNotAllowed);
        }
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CustomerNotFound)?;
        if self.users.has_orders(user.id).await? {
            return Err(StoreError::CustomerHasOrders);
        }
        self.users.delete(user.id).await?;
        tracing::info!(customer_id = %id, admin_id = %identity.user_id, "customer deleted");
        Ok(())
    }
}

// ── UpdateCustomerStatus ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub customer_id: Uuid,
    pub previous_status: UserStatus,
    pub new_status: UserStatus,
    pub enabled: bool,
}

pub struct UpdateCustomerStatusUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateCustomerStatusUseCase<U> {
    /// Approval enables the account and rejection disables it. Moving back to
    /// `PENDING` leaves `enabled` unchanged.
    pub async fn execute(
        &self,
        identity: &Identity,
        id: Uuid,
        status: UserStatus,
    ) -> Result<StatusChange, StoreError> {
        require_admin(identity)?;
        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CustomerNotFound)?;
        if user.status == status {
            return Err(StoreError::CustomerStatusUnchanged(status));
        }

        let enabled = status.forced_enabled().unwrap_or(user.enabled);
        self.users.update_status(user.id, status, enabled).await?;
        tracing::info!(
            customer_id = %id,
            from = %user.status,
            to = %status,
            enabled,
            "customer status changed"
        );
        Ok(StatusChange {
            customer_id: user.id,
            previous_status: user.status,
            new_status: status,
            enabled,
        })
    }
}
