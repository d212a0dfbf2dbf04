//! Bearer-token identity extractor.

use axum::extract::FromRequestParts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::request::Parts;
use uuid::Uuid;

use akeshya_core::error::{ErrorCategory, ErrorPayload};
use akeshya_domain::user::Role;

use crate::token::validate_access_token;

/// Message returned for every rejected or missing token.
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid credentials or authentication token";

/// Gives the extractor access to the HMAC secret held in application state.
pub trait TokenSecret {
    fn token_secret(&self) -> &str;
}

/// Caller identity decoded from `Authorization: Bearer <jwt>`.
///
/// Passed explicitly into every operation that needs to know who is acting.
/// Returns 401 if the header is absent or the token does not validate.
/// Role checks (403) happen in the use cases after extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// The caller is `owner` or an admin.
    pub fn can_act_for(&self, owner: Uuid) -> bool {
        self.user_id == owner || self.is_admin()
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: TokenSecret + Send + Sync,
{
    type Rejection = ErrorPayload;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = match parts.headers.typed_get::<Authorization<Bearer>>() {
            Some(header) => validate_access_token(header.token(), state.token_secret())
                .map(|info| Identity {
                    user_id: info.user_id,
                    roles: info.roles,
                })
                .map_err(|e| {
                    tracing::debug!(error = %e, "bearer token rejected");
                }),
            None => Err(()),
        };

        async move {
            result.map_err(|()| ErrorPayload::new(ErrorCategory::Authentication, UNAUTHENTICATED_MESSAGE))
        }
    }
}
