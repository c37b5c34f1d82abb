//! Test Helpers

use std::io::Cursor;

use rust_decimal::Decimal;

use crate::{
    domain::{
        categories::records::CategoryUuid,
        products::{
            data::NewProduct,
            records::{ProductRecord, ProductUuid},
            repository::PgProductsRepository,
        },
        repository::Repository,
    },
    test::TestContext,
};

pub(crate) const IMPORT_HEADER: &str =
    "Id,Name,Description,Price,InventoryLevel,CategoryId,ImageUrl,CreatedAt,UpdatedAt";

pub(crate) fn new_product(
    uuid: ProductUuid,
    category: CategoryUuid,
    name: &str,
    price: Decimal,
) -> NewProduct {
    NewProduct {
        uuid,
        name: name.to_string(),
        description: None,
        price,
        inventory_level: 1,
        category_uuid: category,
        image_url: None,
    }
}

/// One import line with empty description, image and timestamps.
pub(crate) fn import_row(
    id: &str,
    name: &str,
    price: &str,
    inventory_level: &str,
    category: &str,
) -> String {
    format!("{id},{name},,{price},{inventory_level},{category},,,")
}

/// An in-memory import file with the standard header.
pub(crate) fn csv_source(rows: &[String]) -> Cursor<Vec<u8>> {
    let mut file = String::from(IMPORT_HEADER);

    for row in rows {
        file.push('\n');
        file.push_str(row);
    }

    file.push('\n');

    Cursor::new(file.into_bytes())
}

/// Every product in the store, read through the repository.
pub(crate) async fn all_products(ctx: &TestContext) -> Result<Vec<ProductRecord>, sqlx::Error> {
    let mut tx = ctx.db.pool().begin().await?;

    let products = PgProductsRepository::new().get_all(&mut tx).await?;

    tx.commit().await?;

    Ok(products)
}
