use akeshya_auth_types::identity::Identity;

use crate::domain::repository::CategoryRepository;
use crate::domain::types::{Category, CategoryDraft};
use crate::error::StoreError;
use crate::usecase::require_admin;

pub struct ListCategoriesUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> ListCategoriesUseCase<C> {
    pub async fn execute(&self) -> Result<Vec<Category>, StoreError> {
        self.categories.list().await
    }
}

pub struct GetCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> GetCategoryUseCase<C> {
    pub async fn execute(&self, id: i64) -> Result<Category, StoreError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CategoryNotFound)
    }
}

// ── Writes (admin) ───────────────────────────────────────────────────────────

pub struct CreateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> CreateCategoryUseCase<C> {
    pub async fn execute(
        &self,
        identity: &Identity,
        draft: CategoryDraft,
    ) -> Result<Category, StoreError> {
        require_admin(identity)?;
        if self.categories.find_by_name(&draft.name).await?.is_some() {
            return Err(StoreError::CategoryExists);
        }
        let category = self.categories.create(&draft).await?;
        tracing::info!(category_id = category.id, name = %category.name, "category created");
        Ok(category)
    }
}

pub struct UpdateCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> UpdateCategoryUseCase<C> {
    pub async fn execute(
        &self,
        identity: &Identity,
        id: i64,
        draft: CategoryDraft,
    ) -> Result<Category, StoreError> {
        require_admin(identity)?;
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CategoryNotFound)?;
        // renaming onto another category's name
        if let Some(other) = self.categories.find_by_name(&draft.name).await? {
            if other.id != id {
                return Err(StoreError::CategoryExists);
            }
        }
        let category = self.categories.update(id, &draft).await?;
        tracing::info!(category_id = id, "category updated");
        Ok(category)
    }
}

pub struct SetCategoryStatusUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> SetCategoryStatusUseCase<C> {
    pub async fn execute(
        &self,
        identity: &Identity,
        id: i64,
        status: bool,
    ) -> Result<Category, StoreError> {
        require_admin(identity)?;
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CategoryNotFound)?;
        let category = self.categories.set_status(id, status).await?;
        tracing::info!(category_id = id, status, "category status changed");
        Ok(category)
    }
}

pub struct DeleteCategoryUseCase<C: CategoryRepository> {
    pub categories: C,
}

impl<C: CategoryRepository> DeleteCategoryUseCase<C> {
    pub async fn execute(&self, identity: &Identity, id: i64) -> Result<(), StoreError> {
        require_admin(identity)?;
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(StoreError::CategoryNotFound)?;
        if self.categories.has_products(id).await? {
            return Err(StoreError::CategoryInUse);
        }
        self.categories.delete(id).await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }
}
