//! Product Records

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{domain::categories::records::CategoryUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: Option<String>,

    /// Unit price, stored with two fraction digits.
    pub price: Decimal,

    pub inventory_level: i32,
    pub category_uuid: CategoryUuid,
    pub image_url: Option<String>,
    pub created_at: Timestamp,

    /// Unset until the first update.
    pub updated_at: Option<Timestamp>,

    /// Optimistic-concurrency token, bumped on every write.
    pub version: i64,
}
