//! Products service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    clock::Clock,
    database::Db,
    domain::{
        categories::repository::PgCategoriesRepository,
        products::{
            data::{NewProduct, ProductFilter, ProductUpdate},
            errors::ProductsServiceError,
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        repository::Repository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    clock: Arc<dyn Clock>,
    repository: PgProductsRepository,
    categories: PgCategoriesRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            repository: PgProductsRepository::new(),
            categories: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let products = self.repository.list_products(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let product = self.repository.get_by_id(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        if !self
            .categories
            .category_exists(&mut tx, product.category_uuid)
            .await?
        {
            debug!(category = %product.category_uuid, "rejected product for unknown category");

            return Err(ProductsServiceError::InvalidReference);
        }

        let created = self
            .repository
            .add(&mut tx, product, self.clock.now())
            .await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let updated = self
            .repository
            .update(&mut tx, product, update, self.clock.now())
            .await?;

        let Some(updated) = updated else {
            return Err(if self.repository.exists(&mut tx, product).await? {
                ProductsServiceError::Conflict
            } else {
                ProductsServiceError::NotFound
            });
        };

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        product: ProductUuid,
        version: i64,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.delete(&mut tx, product, version).await?;

        if rows_affected == 0 {
            return Err(if self.repository.exists(&mut tx, product).await? {
                ProductsServiceError::Conflict
            } else {
                ProductsServiceError::NotFound
            });
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves one page of products matching the filter.
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product in an existing category.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Updates a product, provided `update.version` is still current.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Deletes a product, provided `version` is still current.
    async fn delete_product(
        &self,
        product: ProductUuid,
        version: i64,
    ) -> Result<(), ProductsServiceError>;
}
