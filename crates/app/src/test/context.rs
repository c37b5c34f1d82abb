//! Test context for service-level integration tests.

use std::sync::Arc;

use jiff::Timestamp;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::{
    clock::{Clock, FixedClock},
    database::Db,
    domain::{
        categories::{
            CategoriesService, PgCategoriesService,
            data::NewCategory,
            records::{CategoryRecord, CategoryUuid},
        },
        imports::{ImportConfig, PgImportsService, ProductImportPipeline},
        products::PgProductsService,
    },
};

use super::db::TestDb;

/// Instant every write in a test context is stamped with.
const TEST_NOW_SECONDS: i64 = 1_718_800_000;

pub struct TestContext {
    pub db: TestDb,
    pub now: Timestamp,
    pub clock: Arc<dyn Clock>,
    pub products: PgProductsService,
    pub categories: PgCategoriesService,
    pub imports: PgImportsService,

    /// Category created for every context so products have something to reference.
    pub category: CategoryRecord,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let now = Timestamp::from_second(TEST_NOW_SECONDS).expect("valid test instant");
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));

        let categories = PgCategoriesService::new(db.clone(), clock.clone());

        let category = categories
            .create_category(NewCategory {
                uuid: CategoryUuid::new(),
                name: "Lighting".to_string(),
                description: None,
            })
            .await
            .expect("Failed to create default test category");

        Self {
            products: PgProductsService::new(db.clone(), clock.clone()),
            imports: PgImportsService::new(
                db,
                clock.clone(),
                ImportConfig::default(),
                CancellationToken::new(),
            ),
            categories,
            category,
            clock,
            now,
            db: test_db,
        }
    }

    pub fn app_db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }

    pub fn pipeline(&self, config: ImportConfig) -> ProductImportPipeline {
        ProductImportPipeline::new(self.app_db(), self.clock.clone(), config)
    }

    /// Pipeline running against a caller-supplied pool.
    pub fn pipeline_on(&self, pool: PgPool, config: ImportConfig) -> ProductImportPipeline {
        ProductImportPipeline::new(Db::new(pool), self.clock.clone(), config)
    }

    /// Pipeline whose clock reads `now`.
    pub fn pipeline_at(&self, now: Timestamp, config: ImportConfig) -> ProductImportPipeline {
        ProductImportPipeline::new(self.app_db(), Arc::new(FixedClock(now)), config)
    }
}
