pub mod account;
pub mod auth;
pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod statistics;

use akeshya_auth_types::identity::Identity;

use crate::error::StoreError;

/// Reject callers without `ROLE_ADMIN`.
pub(crate) fn require_admin(identity: &Identity) -> Result<(), StoreError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(StoreError::Forbidden)
    }
}
