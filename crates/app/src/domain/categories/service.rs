//! Categories service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::{
    clock::Clock,
    database::Db,
    domain::{
        categories::{
            data::{CategoryUpdate, NewCategory},
            errors::CategoriesServiceError,
            records::{CategoryRecord, CategoryUuid, CategoryWithProducts},
            repository::PgCategoriesRepository,
        },
        repository::Repository,
    },
};

#[derive(Debug, Clone)]
pub struct PgCategoriesService {
    db: Db,
    clock: Arc<dyn Clock>,
    repository: PgCategoriesRepository,
}

impl PgCategoriesService {
    #[must_use]
    pub fn new(db: Db, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            repository: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl CategoriesService for PgCategoriesService {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let categories = self.repository.get_all(&mut tx).await?;

        tx.commit().await?;

        Ok(categories)
    }

    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let category = self.repository.get_by_id(&mut tx, category).await?;

        tx.commit().await?;

        Ok(category)
    }

    async fn get_category_with_products(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryWithProducts, CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let category = self
            .repository
            .get_category_with_products(&mut tx, category)
            .await?;

        tx.commit().await?;

        Ok(category)
    }

    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let created = self
            .repository
            .add(&mut tx, category, self.clock.now())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update(&mut tx, category, update, self.clock.now())
            .await?;

        let Some(updated) = updated else {
            return Err(if self.repository.exists(&mut tx, category).await? {
                CategoriesServiceError::Conflict
            } else {
                CategoriesServiceError::NotFound
            });
        };

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_category(
        &self,
        category: CategoryUuid,
        version: i64,
    ) -> Result<(), CategoriesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.delete(&mut tx, category, version).await?;

        if rows_affected == 0 {
            return Err(if self.repository.exists(&mut tx, category).await? {
                CategoriesServiceError::Conflict
            } else {
                CategoriesServiceError::NotFound
            });
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CategoriesService: Send + Sync {
    /// Retrieves all categories.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError>;

    /// Retrieve a single category.
    async fn get_category(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Retrieve a category along with the products that reference it.
    async fn get_category_with_products(
        &self,
        category: CategoryUuid,
    ) -> Result<CategoryWithProducts, CategoriesServiceError>;

    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Updates a category, provided `update.version` is still current.
    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Deletes a category that no product references.
    async fn delete_category(
        &self,
        category: CategoryUuid,
        version: i64,
    ) -> Result<(), CategoriesServiceError>;
}
