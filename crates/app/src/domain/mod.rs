//! Catalog Domain Concerns

pub mod categories;
pub mod imports;
pub mod products;
pub(crate) mod repository;
