//! Product Imports
//!
//! Bulk upsert of a delimited product file: parse, validate every row, stage the accepted
//! rows in a connection-scoped temporary table and merge them into `products` in one
//! statement.

pub mod errors;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod records;
pub mod service;
pub(crate) mod staging;
pub mod validator;

pub use errors::ImportError;
pub use pipeline::{ImportConfig, ImportState, ImportSummary, ProductImportPipeline};
pub use service::*;
