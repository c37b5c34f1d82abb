//! Import Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::domain::{categories::records::CategoryUuid, products::records::ProductUuid};

/// Label used for rows without a usable name.
pub const UNNAMED_LABEL: &str = "Unnamed";

/// One parsed row of an import file.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateProduct {
    /// Absent identities are assigned on insert.
    pub uuid: Option<ProductUuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub inventory_level: i32,

    /// Nil when the cell was empty.
    pub category_uuid: CategoryUuid,
    pub image_url: Option<String>,
    pub created_at: Option<Timestamp>,
}

/// Every problem found in one row, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub label: String,
    pub violations: SmallVec<[String; 4]>,
}

impl Rejection {
    pub(crate) fn new(name: Option<&str>, violations: SmallVec<[String; 4]>) -> Self {
        let label = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_LABEL)
            .to_string();

        Self { label, violations }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Product '{}': {}", self.label, self.violations.join(", "))
    }
}

/// Verdict for a single input row.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(CandidateProduct),
    Rejected(Rejection),
}
