//! Repository capabilities shared by the catalog aggregates.

use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::{Postgres, Transaction};

/// Keyed CRUD over one aggregate table.
///
/// Writes carry the caller's expected `version`; `update` yields `None` and `delete` affects
/// zero rows when the row is missing or the version is stale.
#[async_trait]
pub(crate) trait Repository: Send + Sync {
    type Uuid: Copy + Send + 'static;
    type Record: Send;
    type New: Send + 'static;
    type Update: Send + 'static;

    async fn get_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: Self::Uuid,
    ) -> Result<Self::Record, sqlx::Error>;

    async fn get_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<Self::Record>, sqlx::Error>;

    async fn add(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: Self::New,
        now: Timestamp,
    ) -> Result<Self::Record, sqlx::Error>;

    async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: Self::Uuid,
        update: Self::Update,
        now: Timestamp,
    ) -> Result<Option<Self::Record>, sqlx::Error>;

    async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: Self::Uuid,
        version: i64,
    ) -> Result<u64, sqlx::Error>;

    async fn exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: Self::Uuid,
    ) -> Result<bool, sqlx::Error>;
}
