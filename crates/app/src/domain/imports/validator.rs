//! Import validation rules.

use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::domain::imports::{
    parser::{ParseError, ParsedRow},
    records::{CandidateProduct, Rejection, ValidationOutcome},
};

pub const NAME_REQUIRED: &str = "Product name is required.";
pub const PRICE_NEGATIVE: &str = "Price must be non-negative.";
pub const INVENTORY_NEGATIVE: &str = "Inventory level must be non-negative.";
pub const CATEGORY_INVALID: &str = "CategoryId is invalid.";

/// Apply every rule to one candidate, collecting all violations.
pub fn validate(candidate: CandidateProduct) -> ValidationOutcome {
    let mut violations: SmallVec<[String; 4]> = SmallVec::new();

    if candidate.name.trim().is_empty() {
        violations.push(NAME_REQUIRED.to_string());
    }

    if candidate.price < Decimal::ZERO {
        violations.push(PRICE_NEGATIVE.to_string());
    }

    if candidate.inventory_level < 0 {
        violations.push(INVENTORY_NEGATIVE.to_string());
    }

    if candidate.category_uuid.is_nil() {
        violations.push(CATEGORY_INVALID.to_string());
    }

    if violations.is_empty() {
        ValidationOutcome::Accepted(candidate)
    } else {
        ValidationOutcome::Rejected(Rejection::new(Some(&candidate.name), violations))
    }
}

/// Outcomes for a whole file, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    outcomes: Vec<ValidationOutcome>,
}

impl ValidationReport {
    /// Validate every parsed row, stopping only if the source fails.
    ///
    /// # Errors
    ///
    /// Returns the first read failure reported by `rows`.
    pub fn from_rows<I>(rows: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = Result<ParsedRow, ParseError>>,
    {
        let outcomes = rows
            .into_iter()
            .map(|row| {
                row.map(|row| match row {
                    ParsedRow::Candidate(candidate) => validate(candidate),
                    ParsedRow::Malformed(rejection) => ValidationOutcome::Rejected(rejection),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { outcomes })
    }

    pub fn outcomes(&self) -> &[ValidationOutcome] {
        &self.outcomes
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ValidationOutcome::Rejected(_)))
            .count()
    }

    /// Split into the accepted records and one formatted error per rejected row.
    pub fn into_parts(self) -> (Vec<CandidateProduct>, Vec<String>) {
        let mut accepted = Vec::with_capacity(self.outcomes.len());
        let mut errors = Vec::new();

        for outcome in self.outcomes {
            match outcome {
                ValidationOutcome::Accepted(candidate) => accepted.push(candidate),
                ValidationOutcome::Rejected(rejection) => errors.push(rejection.to_string()),
            }
        }

        (accepted, errors)
    }
}
