//! Imports service.

use std::{io::Read, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tokio_util::sync::CancellationToken;

use crate::{
    clock::Clock,
    database::Db,
    domain::imports::{
        errors::ImportError,
        pipeline::{ImportConfig, ImportSummary, ProductImportPipeline},
    },
};

/// Byte stream holding one import file.
pub type ImportSource = Box<dyn Read + Send>;

#[derive(Debug, Clone)]
pub struct PgImportsService {
    pipeline: ProductImportPipeline,
    shutdown: CancellationToken,
}

impl PgImportsService {
    /// Runs started through this service are cancelled once `shutdown` fires.
    #[must_use]
    pub fn new(
        db: Db,
        clock: Arc<dyn Clock>,
        config: ImportConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pipeline: ProductImportPipeline::new(db, clock, config),
            shutdown,
        }
    }
}

#[async_trait]
impl ImportsService for PgImportsService {
    async fn import_products(&self, source: ImportSource) -> Result<ImportSummary, ImportError> {
        self.pipeline
            .run(source, &self.shutdown.child_token())
            .await
    }
}

#[automock]
#[async_trait]
pub trait ImportsService: Send + Sync {
    /// Validates and upserts every product in `source`, or rejects the whole file.
    async fn import_products(&self, source: ImportSource) -> Result<ImportSummary, ImportError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{all_products, csv_source, import_row},
    };

    use super::*;

    #[tokio::test]
    async fn import_products_merges_valid_file() -> TestResult {
        let ctx = TestContext::new().await;
        let category = ctx.category.uuid.to_string();

        let summary = ctx
            .imports
            .import_products(Box::new(csv_source(&[import_row(
                "", "Lamp", "1.00", "1", &category,
            )])))
            .await?;

        assert!(!summary.is_rejected());
        assert_eq!(summary.merged.inserted, 1);
        assert_eq!(all_products(&ctx).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn import_products_after_shutdown_is_cancelled() -> TestResult {
        let ctx = TestContext::new().await;
        let category = ctx.category.uuid.to_string();
        let shutdown = CancellationToken::new();

        let service = PgImportsService::new(
            ctx.app_db(),
            ctx.clock.clone(),
            ImportConfig::default(),
            shutdown.clone(),
        );

        shutdown.cancel();

        let result = service
            .import_products(Box::new(csv_source(&[import_row(
                "", "Lamp", "1.00", "1", &category,
            )])))
            .await;

        assert!(
            matches!(result, Err(ImportError::Cancelled)),
            "expected Cancelled, got {result:?}"
        );
        assert!(all_products(&ctx).await?.is_empty());

        Ok(())
    }
}
