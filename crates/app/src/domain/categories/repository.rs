//! Categories Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    categories::{
        data::{CategoryUpdate, NewCategory},
        records::{CategoryRecord, CategoryUuid, CategoryWithProducts},
    },
    products::records::ProductRecord,
    repository::Repository,
};

const GET_ALL_CATEGORIES_SQL: &str = include_str!("sql/get_all_categories.sql");
const GET_CATEGORY_SQL: &str = include_str!("sql/get_category.sql");
const CREATE_CATEGORY_SQL: &str = include_str!("sql/create_category.sql");
const UPDATE_CATEGORY_SQL: &str = include_str!("sql/update_category.sql");
const DELETE_CATEGORY_SQL: &str = include_str!("sql/delete_category.sql");
const CATEGORY_EXISTS_SQL: &str = include_str!("sql/category_exists.sql");
const LIST_CATEGORY_PRODUCTS_SQL: &str = include_str!("sql/list_category_products.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCategoriesRepository;

impl PgCategoriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn category_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<bool, sqlx::Error> {
        self.exists(tx, category).await
    }

    pub(crate) async fn get_category_with_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<CategoryWithProducts, sqlx::Error> {
        let category_record = self.get_by_id(tx, category).await?;

        let products = query_as::<Postgres, ProductRecord>(LIST_CATEGORY_PRODUCTS_SQL)
            .bind(category.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(CategoryWithProducts {
            category: category_record,
            products,
        })
    }
}

#[async_trait]
impl Repository for PgCategoriesRepository {
    type Uuid = CategoryUuid;
    type Record = CategoryRecord;
    type New = NewCategory;
    type Update = CategoryUpdate;

    async fn get_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_CATEGORY_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    async fn get_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(GET_ALL_CATEGORIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    async fn add(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: NewCategory,
        now: Timestamp,
    ) -> Result<CategoryRecord, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(CREATE_CATEGORY_SQL)
            .bind(category.uuid.into_uuid())
            .bind(category.name)
            .bind(category.description)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        update: CategoryUpdate,
        now: Timestamp,
    ) -> Result<Option<CategoryRecord>, sqlx::Error> {
        query_as::<Postgres, CategoryRecord>(UPDATE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .bind(update.name)
            .bind(update.description)
            .bind(SqlxTimestamp::from(now))
            .bind(update.version)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
        version: i64,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CATEGORY_SQL)
            .bind(category.into_uuid())
            .bind(version)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        category: CategoryUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(CATEGORY_EXISTS_SQL)
            .bind(category.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for CategoryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: CategoryUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row
                .try_get::<Option<SqlxTimestamp>, _>("updated_at")?
                .map(SqlxTimestamp::to_jiff),
            version: row.try_get("version")?,
        })
    }
}
