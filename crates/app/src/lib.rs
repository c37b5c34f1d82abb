//! Product catalog domain, persistence and bulk import pipeline.

pub mod clock;
pub mod context;
pub mod database;
pub mod domain;

pub use domain::{categories, imports, products};

#[cfg(test)]
mod test;

mod uuids;
