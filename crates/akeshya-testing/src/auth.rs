//! Mock auth helpers for integration tests.
//!
//! `MockAuth` signs a real access token with the test secret so requests pass the
//! `Identity` extractor without going through sign-in.

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use akeshya_auth_types::token::issue_access_token;
use akeshya_domain::user::Role;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl MockAuth {
    pub fn new(user_id: Uuid, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn customer() -> Self {
        Self::new(Uuid::new_v4(), vec![Role::User])
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), vec![Role::Admin, Role::User])
    }

    /// Signed bearer token for this identity.
    pub fn token(&self, secret: &str) -> String {
        issue_access_token(self.user_id, &self.roles, secret, 3600)
            .expect("sign test token")
            .0
    }

    /// `Authorization: Bearer <token>` header value.
    pub fn bearer(&self, secret: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token(secret)))
            .expect("token is a valid header value")
    }

    pub fn headers(&self, secret: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, self.bearer(secret));
        map
    }
}
