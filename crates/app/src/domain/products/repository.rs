//! Products Repository

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::domain::{
    categories::records::CategoryUuid,
    products::{
        data::{NewProduct, ProductFilter, ProductUpdate},
        records::{ProductRecord, ProductUuid},
    },
    repository::Repository,
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_ALL_PRODUCTS_SQL: &str = include_str!("sql/get_all_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const PRODUCT_EXISTS_SQL: &str = include_str!("sql/product_exists.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(filter.name.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.category.map(CategoryUuid::into_uuid))
            .bind(filter.limit())
            .bind(filter.offset())
            .fetch_all(&mut **tx)
            .await
    }
}

#[async_trait]
impl Repository for PgProductsRepository {
    type Uuid = ProductUuid;
    type Record = ProductRecord;
    type New = NewProduct;
    type Update = ProductUpdate;

    async fn get_by_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    async fn get_all(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_ALL_PRODUCTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    async fn add(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: NewProduct,
        now: Timestamp,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .bind(product.inventory_level)
            .bind(product.category_uuid.into_uuid())
            .bind(product.image_url)
            .bind(SqlxTimestamp::from(now))
            .fetch_one(&mut **tx)
            .await
    }

    async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: ProductUpdate,
        now: Timestamp,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.name)
            .bind(update.description)
            .bind(update.price)
            .bind(update.inventory_level)
            .bind(update.category_uuid.into_uuid())
            .bind(update.image_url)
            .bind(SqlxTimestamp::from(now))
            .bind(update.version)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        version: i64,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(version)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(PRODUCT_EXISTS_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            inventory_level: row.try_get("inventory_level")?,
            category_uuid: CategoryUuid::from_uuid(row.try_get("category_uuid")?),
            image_url: row.try_get("image_url")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row
                .try_get::<Option<SqlxTimestamp>, _>("updated_at")?
                .map(SqlxTimestamp::to_jiff),
            version: row.try_get("version")?,
        })
    }
}
