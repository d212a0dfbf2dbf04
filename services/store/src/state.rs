use sea_orm::DatabaseConnection;

use akeshya_auth_types::identity::TokenSecret;
use akeshya_core::health::ReadinessProbe;

use crate::infra::db::{
    DbCategoryRepository, DbOrderRepository, DbProductRepository, DbUserRepository,
};
use crate::infra::email::Mailer;
use crate::infra::storage::LocalFileStorage;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub storage: LocalFileStorage,
    pub mailer: Mailer,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn category_repo(&self) -> DbCategoryRepository {
        DbCategoryRepository {
            db: self.db.clone(),
        }
    }

    pub fn product_repo(&self) -> DbProductRepository {
        DbProductRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }
}

impl TokenSecret for AppState {
    fn token_secret(&self) -> &str {
        &self.jwt_secret
    }
}

impl ReadinessProbe for AppState {
    async fn ready(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "database ping failed");
                false
            }
        }
    }
}
