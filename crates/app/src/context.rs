//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    categories::{CategoriesService, PgCategoriesService},
    clock::{Clock, SystemClock},
    database::{self, Db},
    imports::{ImportConfig, ImportsService, PgImportsService},
    products::{PgProductsService, ProductsService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrations(#[source] MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub categories: Arc<dyn CategoriesService>,
    pub imports: Arc<dyn ImportsService>,
}

impl AppContext {
    /// Build application context from a database URL, applying pending migrations.
    ///
    /// Imports in flight are cancelled when `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or migrating fails.
    pub async fn from_database_url(
        url: &str,
        import_config: ImportConfig,
        shutdown: CancellationToken,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        database::migrate(&pool)
            .await
            .map_err(AppInitError::Migrations)?;

        Ok(Self::from_db(
            Db::new(pool),
            Arc::new(SystemClock),
            import_config,
            shutdown,
        ))
    }

    #[must_use]
    pub fn from_db(
        db: Db,
        clock: Arc<dyn Clock>,
        import_config: ImportConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            products: Arc::new(PgProductsService::new(db.clone(), clock.clone())),
            categories: Arc::new(PgCategoriesService::new(db.clone(), clock.clone())),
            imports: Arc::new(PgImportsService::new(db, clock, import_config, shutdown)),
        }
    }
}
