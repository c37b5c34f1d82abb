//! Category Records

use jiff::Timestamp;

use crate::{domain::products::records::ProductRecord, uuids::TypedUuid};

/// Category UUID
pub type CategoryUuid = TypedUuid<CategoryRecord>;

/// Category Record
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub uuid: CategoryUuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub version: i64,
}

/// A category together with every product that references it.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithProducts {
    pub category: CategoryRecord,
    pub products: Vec<ProductRecord>,
}
